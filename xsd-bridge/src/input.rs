//! XML payloads accepted by the bridge.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::io::AsyncRead;

use crate::error::{SUPPORTED_INPUT_SHAPES, ValidatorError};

/// The XML document to validate.
///
/// Exactly one of four shapes. `File` is read by the validator itself; every
/// other variant is written to the validator's stdin.
pub enum XmlInput {
    /// Inline document text.
    Text(String),
    /// Raw document bytes.
    Bytes(Vec<u8>),
    /// A byte stream piped into the validator as it is read.
    Stream(Box<dyn AsyncRead + Send + Unpin>),
    /// A document on disk, passed to the validator as `-file=<path>`.
    File(PathBuf),
}

/// How the validator receives its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode<'a> {
    /// Document is written to stdin (`-stdin`).
    Stdin,
    /// Document is read from disk by the validator (`-file=<path>`).
    File(&'a Path),
}

impl XmlInput {
    /// Wrap any async reader as streamed input.
    #[must_use]
    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::Stream(Box::new(reader))
    }

    /// How this input is delivered to the validator.
    #[must_use]
    pub fn mode(&self) -> InputMode<'_> {
        match self {
            Self::File(path) => InputMode::File(path),
            Self::Text(_) | Self::Bytes(_) | Self::Stream(_) => InputMode::Stdin,
        }
    }

    /// Short name of the variant, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::File(_) => "file",
        }
    }
}

impl fmt::Debug for XmlInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl From<&str> for XmlInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for XmlInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for XmlInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<PathBuf> for XmlInput {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Dynamic boundary for loosely typed callers (JSON request bodies).
///
/// - `"<a/>"` becomes `Text`
/// - `[60, 97, 47, 62]` becomes `Bytes` (every element must be 0..=255)
/// - `{ "file": "/tmp/doc.xml" }` becomes `File`
///
/// Anything else is rejected with [`ValidatorError::UnsupportedInput`].
impl TryFrom<Value> for XmlInput {
    type Error = ValidatorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Self::Bytes)
                .ok_or_else(unsupported),
            Value::Object(map) => map
                .get("file")
                .and_then(Value::as_str)
                .filter(|path| !path.is_empty())
                .map(|path| Self::File(PathBuf::from(path)))
                .ok_or_else(unsupported),
            Value::Null | Value::Bool(_) | Value::Number(_) => Err(unsupported()),
        }
    }
}

fn unsupported() -> ValidatorError {
    ValidatorError::UnsupportedInput(SUPPORTED_INPUT_SHAPES.to_owned())
}
