//! Error types for the validation bridge.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::outcome::ValidationOutcome;

/// Accepted shapes for dynamically typed input, used in `UnsupportedInput` messages.
pub const SUPPORTED_INPUT_SHAPES: &str = "expected string | bytes | stream | { file: path }";

/// Errors returned by [`crate::SchemaValidator::validate`].
///
/// A run produces exactly one of: an `Ok(ValidationOutcome)` or one of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// The input did not match any supported shape. Raised before any
    /// process is launched.
    #[error("unsupported <xml> parameter: {0}")]
    UnsupportedInput(String),

    /// The validator exited with a non-zero code.
    ///
    /// The message is the status token followed by every diagnostic; the
    /// structured form is available through [`ValidatorError::outcome`].
    #[error("{}", .0.error_message())]
    ValidationFailed(ValidationOutcome),

    /// The operating system could not start the validator.
    #[error("failed to spawn validator `{}`: {source}", program.display())]
    ProcessSpawn {
        /// Program that failed to launch.
        program: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Waiting on or reading from a running validator failed.
    #[error("validator I/O error: {0}")]
    Io(#[from] io::Error),

    /// The run exceeded the configured timeout and the validator was killed.
    #[error("validator timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The run was cancelled through its [`crate::CancelHandle`].
    #[error("validation cancelled")]
    Cancelled,
}

impl ValidatorError {
    /// The structured outcome of a failed validation, if this is one.
    #[must_use]
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        match self {
            Self::ValidationFailed(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the document itself was rejected (as opposed to the bridge failing).
    #[must_use]
    pub fn is_invalid_xml(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_message() {
        let err = ValidatorError::ValidationFailed(ValidationOutcome::new(
            false,
            "WITH_ERRORS",
            vec!["[error] 1:5 cvc-elt.1.a: Cannot find the declaration of element 'a'.".to_owned()],
        ));

        let msg = err.to_string();
        assert!(msg.starts_with("invalid xml (status=WITH_ERRORS)"));
        assert!(msg.contains("Cannot find the declaration of element 'a'"));
        assert!(err.is_invalid_xml());
        assert_eq!(err.outcome().map(|o| o.messages.len()), Some(1));
    }

    #[test]
    fn test_unsupported_input_message() {
        let err = ValidatorError::UnsupportedInput(SUPPORTED_INPUT_SHAPES.to_owned());
        assert!(err.to_string().contains("{ file: path }"));
        assert!(err.outcome().is_none());
    }

    #[test]
    fn test_spawn_message_names_program() {
        let err = ValidatorError::ProcessSpawn {
            program: PathBuf::from("/opt/jdk/bin/java"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/opt/jdk/bin/java"));
        assert!(!err.is_invalid_xml());
    }
}
