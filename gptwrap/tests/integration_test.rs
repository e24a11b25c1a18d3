//! Integration tests for gptwrap.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

use assert_fs::prelude::*;
use gptwrap::prelude::*;
use gptwrap::registry;
use std::sync::Arc;

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
struct ObjectRecognition {
    name: String,
    material: Option<String>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn answer(name: &str) -> String {
    serde_json::json!({ "name": name, "material": null }).to_string()
}

#[test]
fn test_resolve_mini_model() {
    let descriptor = registry::resolve("gpt-4o-mini").unwrap();
    assert_eq!(descriptor.name, "gpt-4o-mini");
    assert_eq!(descriptor.rates, ModelRates::new(0.15, 0.6));
}

#[test]
fn test_resolve_unknown_model() {
    let err = registry::resolve("claude-3-opus").unwrap_err();
    assert!(matches!(err, Error::ModelNotFound { ref requested } if requested == "claude-3-opus"));
    assert_eq!(err.to_string(), "Model claude-3-opus not found");
}

#[test]
fn test_million_tokens_cost() {
    let descriptor = ModelDescriptor::new("gpt-4o", "GPT-4o", ModelRates::new(2.5, 10.0));
    let ledger = CostLedger::from_usage(descriptor, &Usage::new(1_000_000, 1_000_000));
    assert_eq!(ledger.cost(), 12.5);
}

#[test]
fn test_empty_content_part() {
    let err = ContentPart::new(None, None).unwrap_err();
    assert!(matches!(err, Error::EmptyContent));
}

#[tokio::test]
async fn test_sequential_asks_sum_usage() -> anyhow::Result<()> {
    init_tracing();

    let first = Usage::new(120, 30);
    let second = Usage::new(80, 45);
    let wrapper = GptWrapper::with_provider(
        "gpt-4o",
        MockProvider::new()
            .with_json(answer("kettle"), first)
            .with_json(answer("mug"), second),
    )?;

    let a: ObjectRecognition = wrapper.ask("first object?").await?;
    let b: ObjectRecognition = wrapper.ask("second object?").await?;
    assert_eq!(a.name, "kettle");
    assert_eq!(b.name, "mug");

    let ledger = wrapper.total_cost();
    assert_eq!(ledger.prompt_tokens(), 200);
    assert_eq!(ledger.completion_tokens(), 75);
    assert_eq!(ledger.requests(), 2);

    let mut expected = CostLedger::new(wrapper.descriptor().clone());
    expected.record_all([&first, &second]);
    assert_eq!(ledger, expected);
    Ok(())
}

#[tokio::test]
async fn test_image_file_prompt() -> anyhow::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let image = temp.child("kettle.png");
    image.write_binary(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])?;

    let wrapper = GptWrapper::with_provider(
        "gemini-2.5-flash-preview-04-17",
        MockProvider::new().with_json(answer("kettle"), Usage::new(300, 10)),
    )?;
    assert_eq!(wrapper.descriptor().name, "gemini-2.5-flash");

    let prompt = Prompt::new()
        .system("You identify household objects.")
        .image(image.path())
        .text("What is this?");
    let parsed: ObjectRecognition = wrapper.ask(prompt).await?;
    assert_eq!(parsed.name, "kettle");
    assert!(parsed.material.is_none());

    let requests = wrapper.provider().requests();
    let body = serde_json::to_value(&requests[0])?;
    assert_eq!(body["model"], "gemini-2.5-flash-preview-04-17");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"][0]["text"], "You identify household objects.");

    let user = &body["messages"][1]["content"];
    assert_eq!(user[0]["type"], "image_url");
    assert!(
        user[0]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(user[1]["type"], "text");
    assert_eq!(user[1]["text"], "What is this?");
    let format = &body["response_format"]["json_schema"];
    assert_eq!(format["name"], "ObjectRecognition");
    assert_eq!(format["strict"], true);
    assert_eq!(format["schema"]["additionalProperties"], false);
    let required = format["schema"]["required"].as_array().unwrap();
    assert_eq!(required.len(), 2);
    assert!(required.contains(&serde_json::json!("material")));

    temp.close()?;
    Ok(())
}

#[tokio::test]
async fn test_errors_pass_through_without_recording() {
    let wrapper = GptWrapper::with_provider(
        "gpt-4o-mini",
        MockProvider::new()
            .with_error(LlmError::auth("openai", "Incorrect API key provided"))
            .with_response(ChatResponse::default()),
    )
    .unwrap();

    let err = wrapper.ask::<ObjectRecognition>("hi").await.unwrap_err();
    assert!(matches!(err, Error::Llm(LlmError::Auth { .. })));

    let err = wrapper.ask::<ObjectRecognition>("hi").await.unwrap_err();
    assert!(matches!(err, Error::Llm(LlmError::ResponseFormat { .. })));

    let ledger = wrapper.total_cost();
    assert_eq!(ledger.requests(), 0);
    assert_eq!(ledger.cost(), 0.0);
}

#[tokio::test]
async fn test_concurrent_asks_share_ledger() {
    let provider = MockProvider::new();
    for _ in 0..8 {
        provider.push(Ok(ChatResponse::from_text(answer("cup")).with_usage(Usage::new(10, 1))));
    }
    let wrapper = Arc::new(GptWrapper::with_provider("gpt-4o", provider).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let wrapper = Arc::clone(&wrapper);
            tokio::spawn(async move { wrapper.ask::<ObjectRecognition>(format!("object {i}")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let ledger = wrapper.total_cost();
    assert_eq!(ledger.usage(), Usage::new(80, 8));
    assert_eq!(ledger.requests(), 8);
}

#[test]
fn test_ledger_display_and_reset() {
    let wrapper = GptWrapper::with_provider("gpt-4o", MockProvider::new()).unwrap();
    wrapper.add_cost(&[Usage::new(1_000_000, 1_000_000)]);

    let shown: serde_json::Value = serde_json::from_str(&wrapper.total_cost().to_string()).unwrap();
    assert_eq!(shown["model"], "gpt-4o");
    assert_eq!(shown["prompt_tokens"], 1_000_000);
    assert_eq!(shown["cost"], 12.5);

    wrapper.reset_cost();
    assert_eq!(wrapper.total_cost().usage(), Usage::default());
}

#[test]
fn test_custom_descriptor() {
    let mut registry = ModelRegistry::builtin();
    registry.register(ModelDescriptor::new(
        "local-vision",
        "Local Vision",
        ModelRates::new(0.0, 0.0),
    ));
    let descriptor = registry.resolve("local-vision-7b").unwrap();

    let wrapper = GptWrapper::with_descriptor("local-vision-7b", descriptor, MockProvider::new());
    wrapper.add_cost(&[Usage::new(5_000, 100)]);
    assert_eq!(wrapper.total_cost().cost(), 0.0);
    assert_eq!(wrapper.total_cost().prompt_tokens(), 5_000);
}
