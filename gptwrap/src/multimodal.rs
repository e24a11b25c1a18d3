//! Image inputs for vision-capable chat models.
//!
//! An [`ImageSource`] says explicitly where an image comes from. It is
//! resolved into the URL string the chat API expects: a base64 data URL for
//! local files and encoded payloads, or the remote URL itself.
//!
//! ```rust,ignore
//! use gptwrap::multimodal::ImageSource;
//!
//! let image = ImageSource::file("examples/kettle.png");
//! let url = image.to_url()?; // "data:image/png;base64,iVBORw0..."
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format (default when nothing else can be detected).
    #[default]
    Jpeg,
    /// GIF format.
    Gif,
    /// WebP format.
    Webp,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect format from magic bytes (file signature).
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x47, 0x49, 0x46, 0x38, ..] => Some(Self::Gif),
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect the format of a file from its extension, then its contents.
    #[must_use]
    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .or_else(|| Self::from_magic_bytes(bytes))
            .unwrap_or_default()
    }
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageSource {
    /// A local file, read and base64 encoded when the message is built.
    FilePath {
        /// Path to the image file.
        path: PathBuf,
    },
    /// An already base64-encoded payload.
    Encoded {
        /// Base64 data, or a complete `data:` URL.
        data: String,
        /// Format used for the data URL's MIME type.
        #[serde(default)]
        format: ImageFormat,
    },
    /// A remote image URL passed through to the model.
    Url {
        /// The `http(s)` URL.
        url: String,
    },
}

impl ImageSource {
    /// Image read from a local file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::FilePath { path: path.into() }
    }

    /// Image given as base64 data.
    #[must_use]
    pub fn encoded(data: impl Into<String>, format: ImageFormat) -> Self {
        Self::Encoded {
            data: data.into(),
            format,
        }
    }

    /// Image at a remote URL.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    /// Encode raw image bytes, detecting the format from their signature.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let format = ImageFormat::from_magic_bytes(bytes).unwrap_or_default();
        Self::encoded(BASE64.encode(bytes), format)
    }

    /// Check if the source names no image: an empty path, payload or URL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::FilePath { path } => path.as_os_str().is_empty(),
            Self::Encoded { data, .. } => data.is_empty(),
            Self::Url { url } => url.is_empty(),
        }
    }

    /// Resolve into the URL sent as `image_url.url`.
    ///
    /// Files are read fully on every call; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file source cannot be read.
    pub fn to_url(&self) -> Result<String> {
        match self {
            Self::FilePath { path } => {
                let bytes = std::fs::read(path)?;
                let format = ImageFormat::detect(path, &bytes);
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoded image file");
                Ok(data_url(format, &BASE64.encode(&bytes)))
            }
            Self::Encoded { data, .. } if data.starts_with("data:") => Ok(data.clone()),
            Self::Encoded { data, format } => Ok(data_url(*format, data)),
            Self::Url { url } => Ok(url.clone()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::file(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::file(path)
    }
}

fn data_url(format: ImageFormat, base64: &str) -> String {
    format!("data:{};base64,{base64}", format.mime_type())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    mod image_format {
        use super::*;

        #[test]
        fn from_extension_is_case_insensitive() {
            assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
            assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
            assert_eq!(ImageFormat::from_extension("bmp"), None);
        }

        #[test]
        fn from_magic_bytes() {
            assert_eq!(ImageFormat::from_magic_bytes(&PNG_HEADER), Some(ImageFormat::Png));
            assert_eq!(
                ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
                Some(ImageFormat::Jpeg)
            );
            assert_eq!(
                ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
                Some(ImageFormat::Webp)
            );
            assert_eq!(ImageFormat::from_magic_bytes(b"ab"), None);
        }

        #[test]
        fn detect_defaults_to_jpeg() {
            let format = ImageFormat::detect(Path::new("photo"), b"not an image");
            assert_eq!(format, ImageFormat::Jpeg);
        }

        #[test]
        fn detect_prefers_extension() {
            let format = ImageFormat::detect(Path::new("a.gif"), &PNG_HEADER);
            assert_eq!(format, ImageFormat::Gif);
        }
    }

    mod image_source {
        use super::*;

        #[test]
        fn file_is_read_and_encoded() {
            let dir = assert_fs::TempDir::new().unwrap();
            let file = dir.child("kettle.png");
            file.write_binary(&PNG_HEADER).unwrap();

            let url = ImageSource::file(file.path()).to_url().unwrap();
            assert_eq!(url, format!("data:image/png;base64,{}", BASE64.encode(PNG_HEADER)));
        }

        #[test]
        fn file_without_extension_uses_magic_bytes() {
            let dir = assert_fs::TempDir::new().unwrap();
            let file = dir.child("capture");
            file.write_binary(&PNG_HEADER).unwrap();

            let url = ImageSource::file(file.path()).to_url().unwrap();
            assert!(url.starts_with("data:image/png;base64,"));
        }

        #[test]
        fn arbitrary_bytes_still_encode() {
            let dir = assert_fs::TempDir::new().unwrap();
            let file = dir.child("notes.bin");
            file.write_str("hello").unwrap();

            let url = ImageSource::file(file.path()).to_url().unwrap();
            assert_eq!(url, "data:image/jpeg;base64,aGVsbG8=");
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = ImageSource::file("/definitely/not/here.png")
                .to_url()
                .unwrap_err();
            assert!(matches!(err, crate::Error::Io(_)));
        }

        #[test]
        fn encoded_payload_is_not_reencoded() {
            let url = ImageSource::encoded("aGVsbG8=", ImageFormat::Jpeg)
                .to_url()
                .unwrap();
            assert_eq!(url, "data:image/jpeg;base64,aGVsbG8=");
        }

        #[test]
        fn encoded_data_url_used_as_is() {
            let data = "data:image/webp;base64,UklGRg==";
            let url = ImageSource::encoded(data, ImageFormat::Png).to_url().unwrap();
            assert_eq!(url, data);
        }

        #[test]
        fn remote_url_passes_through() {
            let url = ImageSource::url("https://example.com/cat.jpg")
                .to_url()
                .unwrap();
            assert_eq!(url, "https://example.com/cat.jpg");
        }

        #[test]
        fn from_bytes_detects_format() {
            let source = ImageSource::from_bytes(&PNG_HEADER);
            assert!(matches!(
                source,
                ImageSource::Encoded { format: ImageFormat::Png, .. }
            ));
        }

        #[test]
        fn empty_sources() {
            assert!(ImageSource::encoded("", ImageFormat::Jpeg).is_empty());
            assert!(ImageSource::url("").is_empty());
            assert!(ImageSource::file("").is_empty());
            assert!(!ImageSource::encoded("aGVsbG8=", ImageFormat::Jpeg).is_empty());
        }

        #[test]
        fn serde_tagged() {
            let json = serde_json::to_value(ImageSource::file("a.png")).unwrap();
            assert_eq!(json["source"], "file_path");
            assert_eq!(json["path"], "a.png");
        }
    }
}
