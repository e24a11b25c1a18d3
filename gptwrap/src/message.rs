//! Prompt messages in the chat completion wire format.
//!
//! A [`Conversation`] is the ordered message buffer of one request. Each
//! [`Message`] carries a role and a list of [`ContentPart`]s; when a turn has
//! both an image and text, the image part comes first.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::multimodal::ImageSource;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User turn.
    User,
    /// Assistant (model) turn.
    Assistant,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Image reference inside an `image_url` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Data URL or remote URL.
    pub url: String,
}

/// One unit of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An image, already resolved to a URL.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Build a part from optional text and image.
    ///
    /// Text takes precedence when both are given. Empty text and empty image
    /// sources count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContent`] when neither is given, or an I/O error
    /// if the image file cannot be read.
    pub fn new(text: Option<&str>, image: Option<&ImageSource>) -> Result<Self> {
        match (text.filter(|t| !t.is_empty()), image.filter(|i| !i.is_empty())) {
            (Some(text), _) => Ok(Self::text(text)),
            (None, Some(image)) => Self::image(image),
            (None, None) => Err(Error::EmptyContent),
        }
    }

    /// A text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// An image part, resolving the source to a URL.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file source cannot be read.
    pub fn image(source: &ImageSource) -> Result<Self> {
        Ok(Self::ImageUrl {
            image_url: ImageUrl {
                url: source.to_url()?,
            },
        })
    }

    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }

    /// Check if this is an image part.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::ImageUrl { .. })
    }
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the sender.
    pub role: Role,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl Message {
    /// Create a message from parts.
    #[must_use]
    pub const fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// A system message with a single text part.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::text(text)])
    }

    /// A user message with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    /// Build a message from an optional image and optional text.
    ///
    /// The image part precedes the text part. With neither, the message has
    /// no content.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the image file cannot be read.
    pub fn from_parts(role: Role, image: Option<&ImageSource>, text: Option<&str>) -> Result<Self> {
        let mut content = Vec::with_capacity(2);
        if let Some(image) = image.filter(|i| !i.is_empty()) {
            content.push(ContentPart::new(None, Some(image))?);
        }
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            content.push(ContentPart::new(Some(text), None)?);
        }
        Ok(Self::new(role, content))
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ordered message buffer for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a buffer, seeded with a system message if one is given.
    #[must_use]
    pub fn new(system_message: Option<&str>) -> Self {
        let mut conversation = Self::default();
        conversation.reset(system_message);
        conversation
    }

    /// Clear the buffer, then seed it with a system message if one is given.
    pub fn reset(&mut self, system_message: Option<&str>) -> &mut Self {
        self.messages.clear();
        if let Some(system) = system_message.filter(|s| !s.is_empty()) {
            self.messages.push(Message::system(system));
        }
        self
    }

    /// Append one turn built from an optional image and optional text.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the image file cannot be read; the buffer is
    /// unchanged in that case.
    pub fn add_message(
        &mut self,
        role: Role,
        image: Option<&ImageSource>,
        text: Option<&str>,
    ) -> Result<&mut Self> {
        let message = Message::from_parts(role, image, text)?;
        self.messages.push(message);
        Ok(self)
    }

    /// Append a prebuilt message.
    pub fn push(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    /// Messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the buffer, returning its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
