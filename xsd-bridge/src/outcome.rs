//! Validation outcome types.

use serde::Serialize;

/// Status reported when the validator exits cleanly without a `result=` line.
pub const STATUS_OK: &str = "OK";

/// Status reported when the validator exits with a non-zero code and
/// without a `result=` line.
pub const STATUS_WITH_ERRORS: &str = "WITH_ERRORS";

/// Result of one validator run.
///
/// `valid` is decided by the validator's exit code alone; `status` is the raw
/// token it printed (or the fallback), and `messages` holds the diagnostic
/// lines in the order they were emitted across stdout and stderr.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ValidationOutcome {
    /// Whether the validator exited with code 0.
    pub valid: bool,
    /// Raw status token emitted by the validator.
    pub status: String,
    /// Diagnostic lines (those starting with `[`), in arrival order.
    pub messages: Vec<String>,
}

impl ValidationOutcome {
    /// Build an outcome from its parts.
    #[must_use]
    pub fn new(valid: bool, status: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            valid,
            status: status.into(),
            messages,
        }
    }

    /// Human-readable summary used as the message of a failed validation.
    ///
    /// `invalid xml (status=<status>)` followed by one `\n\t<message>` per
    /// diagnostic.
    #[must_use]
    pub fn error_message(&self) -> String {
        let mut msg = format!("invalid xml (status={})", self.status);
        for m in &self.messages {
            msg.push_str("\n\t");
            msg.push_str(m);
        }
        msg
    }

    /// Number of diagnostics collected.
    #[must_use]
    pub fn messages_count(&self) -> usize {
        self.messages.len()
    }
}
