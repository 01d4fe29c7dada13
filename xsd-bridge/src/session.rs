//! Completion state of a single validator run.
//!
//! The exit status and the `result=` line arrive independently and in either
//! order. [`CompletionJoin`] collects both, together with the diagnostics, and
//! is consumed exactly once by [`CompletionJoin::finish`].

use tracing::debug;

use crate::error::ValidatorError;
use crate::outcome::{STATUS_OK, STATUS_WITH_ERRORS, ValidationOutcome};
use crate::protocol::Line;

/// Exit code slot. `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// Process exit code, if any.
    pub code: Option<i32>,
}

impl Exit {
    /// Only a zero exit code counts as success.
    #[must_use]
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

/// Two-slot join over process exit and output drain.
#[derive(Debug, Default)]
pub struct CompletionJoin {
    exit: Option<Exit>,
    status: Option<String>,
    messages: Vec<String>,
    drained: bool,
    debug: bool,
}

impl CompletionJoin {
    /// Create an empty join. With `debug` set, unclassified lines are logged.
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }

    /// Record one classified output line.
    pub fn record(&mut self, line: Line) {
        match line {
            Line::Diagnostic(message) => self.messages.push(message),
            Line::Status(token) => self.status = Some(token),
            Line::Other(text) => {
                if self.debug {
                    debug!(target: "xsd_bridge::validator", "{text}");
                }
            }
        }
    }

    /// Record the process exit.
    pub fn record_exit(&mut self, code: Option<i32>) {
        self.exit = Some(Exit { code });
    }

    /// Mark both output channels as fully read.
    pub fn mark_drained(&mut self) {
        self.drained = true;
    }

    /// Whether the exit slot has been filled.
    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.exit.is_some()
    }

    /// Whether output is still being read.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        !self.drained
    }

    /// Both slots are settled: the process exited and its output was drained.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.exit.is_some() && self.drained
    }

    /// Produce the single result of this run.
    ///
    /// The status token is the captured `result=` value, or `OK` / `WITH_ERRORS`
    /// depending on the exit code when none arrived. Validity follows the exit
    /// code only. Calling this before an exit was recorded treats the run as
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::ValidationFailed`] when the exit code is not zero.
    pub fn finish(self) -> Result<ValidationOutcome, ValidatorError> {
        let success = self.exit.is_some_and(Exit::success);
        let status = self.status.unwrap_or_else(|| {
            if success {
                STATUS_OK.to_owned()
            } else {
                STATUS_WITH_ERRORS.to_owned()
            }
        });
        let outcome = ValidationOutcome::new(success, status, self.messages);
        if success {
            Ok(outcome)
        } else {
            Err(ValidatorError::ValidationFailed(outcome))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::protocol::classify;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn feed(join: &mut CompletionJoin, lines: &[&str]) {
        for line in lines {
            join.record(classify(line));
        }
    }

    #[test]
    fn test_result_before_exit() {
        let mut join = CompletionJoin::new(false);
        feed(&mut join, &["[error] bad element", "result=INVALID"]);
        join.mark_drained();
        assert!(!join.is_ready());
        join.record_exit(Some(1));
        assert!(join.is_ready());

        let err = join.finish().unwrap_err();
        let outcome = err.outcome().unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.status, "INVALID");
        assert_eq!(outcome.messages, vec!["[error] bad element".to_owned()]);
    }

    #[test]
    fn test_exit_before_result() {
        let mut join = CompletionJoin::new(false);
        join.record_exit(Some(1));
        assert!(!join.is_ready());
        feed(&mut join, &["[error] bad element", "result=INVALID"]);
        join.mark_drained();
        assert!(join.is_ready());

        let err = join.finish().unwrap_err();
        assert_eq!(err.outcome().unwrap().status, "INVALID");
    }

    #[test]
    fn test_orderings_agree() {
        let mut first = CompletionJoin::new(false);
        feed(&mut first, &["noise", "[e] one", "result=OK"]);
        first.record_exit(Some(0));
        first.mark_drained();

        let mut second = CompletionJoin::new(false);
        second.record_exit(Some(0));
        feed(&mut second, &["noise", "[e] one", "result=OK"]);
        second.mark_drained();

        assert_eq!(first.finish().unwrap(), second.finish().unwrap());
    }

    #[test]
    fn test_fallback_status() {
        let mut ok = CompletionJoin::new(false);
        ok.record_exit(Some(0));
        ok.mark_drained();
        let outcome = ok.finish().unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.status, STATUS_OK);

        let mut failed = CompletionJoin::new(false);
        failed.record_exit(Some(3));
        failed.mark_drained();
        let err = failed.finish().unwrap_err();
        assert_eq!(err.outcome().unwrap().status, STATUS_WITH_ERRORS);
    }

    #[test]
    fn test_exit_code_decides_validity() {
        // A success token does not override a failing exit code.
        let mut join = CompletionJoin::new(false);
        feed(&mut join, &["result=OK"]);
        join.record_exit(Some(2));
        join.mark_drained();
        let err = join.finish().unwrap_err();
        assert_eq!(err.outcome().unwrap().status, "OK");

        // Killed by a signal: no exit code.
        let mut join = CompletionJoin::new(false);
        join.record_exit(None);
        join.mark_drained();
        assert!(join.finish().is_err());
    }

    #[test]
    fn test_last_result_line_wins_and_noise_is_dropped() {
        let mut join = CompletionJoin::new(true);
        feed(
            &mut join,
            &["result=FIRST", "Picked up _JAVA_OPTIONS", "[w] kept", "result=SECOND"],
        );
        join.record_exit(Some(0));
        join.mark_drained();
        let outcome = join.finish().unwrap();
        assert_eq!(outcome.status, "SECOND");
        assert_eq!(outcome.messages, vec!["[w] kept".to_owned()]);
    }

    /// Shared buffer the fmt subscriber writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record_with_subscriber(debug: bool, lines: &[&str]) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut join = CompletionJoin::new(debug);
            feed(&mut join, lines);
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debug_logs_unclassified_lines() {
        let lines = ["Picked up _JAVA_OPTIONS: -Xmx512m", "[error] kept", "result=OK"];

        let logged = record_with_subscriber(true, &lines);
        let noise: Vec<&str> = logged.lines().collect();
        assert_eq!(noise.len(), 1, "{logged}");
        assert!(noise[0].contains("DEBUG"));
        assert!(noise[0].contains("xsd_bridge::validator"));
        assert!(noise[0].contains("Picked up _JAVA_OPTIONS: -Xmx512m"));

        assert_eq!(record_with_subscriber(false, &lines), "");
    }
}
