//! Validator interface and its JVM process adapter.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::command::build_command;
use crate::config::ValidatorConfig;
use crate::error::ValidatorError;
use crate::input::XmlInput;
use crate::outcome::ValidationOutcome;
use crate::protocol::{Line, classify_bytes};
use crate::session::CompletionJoin;

/// Buffered output lines between the pipe readers and the run loop.
const LINE_BUFFER: usize = 64;

/// Validates an XML document against an XML Schema.
///
/// Callers depend on this trait rather than on the process adapter, so an
/// in-process schema library can replace the JVM without touching them.
pub trait SchemaValidator {
    /// Validate `input` against the schema at `schema`.
    ///
    /// Resolves to `Ok` with `valid = true` when the document conforms.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::ValidationFailed`] when the document is rejected,
    /// or any bridge-level failure (spawn, I/O, timeout, cancellation).
    fn validate(
        &self,
        input: XmlInput,
        schema: &str,
    ) -> impl Future<Output = Result<ValidationOutcome, ValidatorError>> + Send;
}

/// Cancels a running validation by killing its process.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

/// Launches `support.XMLValidator` in a JVM for every validation.
///
/// Cloning is cheap; concurrent validations run as independent processes.
#[derive(Debug, Clone)]
pub struct JvmValidator {
    config: Arc<ValidatorConfig>,
}

impl JvmValidator {
    /// Create a validator with the given launch configuration.
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The launch configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Spawn the validator and start delivering `input` to it.
    ///
    /// The returned [`ValidationRun`] exposes the process id and a
    /// [`CancelHandle`]; await [`ValidationRun::wait`] for the result.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::ProcessSpawn`] if the Java launcher cannot be started.
    pub fn start(&self, input: XmlInput, schema: &str) -> Result<ValidationRun, ValidatorError> {
        let mut command = build_command(&self.config, input.mode(), schema);
        debug!(
            program = %self.config.java.display(),
            input = input.kind(),
            schema,
            "spawning schema validator"
        );

        let mut child = command
            .spawn()
            .map_err(|source| ValidatorError::ProcessSpawn {
                program: self.config.java.clone(),
                source,
            })?;

        let mut io_tasks = JoinSet::new();
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        if let Some(stdout) = child.stdout.take() {
            io_tasks.spawn(read_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            io_tasks.spawn(read_lines(stderr, tx.clone()));
        }
        drop(tx);

        if let Some(stdin) = child.stdin.take() {
            io_tasks.spawn(write_input(stdin, input));
        }

        Ok(ValidationRun {
            child,
            lines: rx,
            io_tasks,
            cancel: CancelHandle::default(),
            debug: self.config.debug,
            timeout: self.config.timeout,
            drain_grace: self.config.drain_grace,
        })
    }

    /// Validate loosely typed input, as received from a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::UnsupportedInput`] without spawning anything
    /// when `value` is not a string, a byte array or `{ "file": path }`.
    /// Otherwise behaves like [`SchemaValidator::validate`].
    pub async fn validate_value(
        &self,
        value: Value,
        schema: &str,
    ) -> Result<ValidationOutcome, ValidatorError> {
        let input = XmlInput::try_from(value)?;
        self.validate(input, schema).await
    }
}

impl SchemaValidator for JvmValidator {
    async fn validate(
        &self,
        input: XmlInput,
        schema: &str,
    ) -> Result<ValidationOutcome, ValidatorError> {
        self.start(input, schema)?.wait().await
    }
}

/// A running validator process.
///
/// Dropping the run kills the process and aborts its pipe tasks.
#[derive(Debug)]
pub struct ValidationRun {
    child: Child,
    lines: mpsc::Receiver<Line>,
    io_tasks: JoinSet<()>,
    cancel: CancelHandle,
    debug: bool,
    timeout: Option<Duration>,
    drain_grace: Duration,
}

impl ValidationRun {
    /// OS process id, while the process is running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Handle that cancels this run from another task.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait until the process exited and its output was read, then resolve.
    ///
    /// The caller's input stream is released before this returns, even when
    /// the validator exited without reading all of it.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::ValidationFailed`] on a non-zero exit code,
    /// [`ValidatorError::Timeout`] / [`ValidatorError::Cancelled`] when the
    /// process had to be killed, [`ValidatorError::Io`] if waiting failed.
    pub async fn wait(mut self) -> Result<ValidationOutcome, ValidatorError> {
        let result = self.supervise().await;
        self.io_tasks.shutdown().await;
        result
    }

    async fn supervise(&mut self) -> Result<ValidationOutcome, ValidatorError> {
        let mut join = CompletionJoin::new(self.debug);
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut drain_deadline: Option<Instant> = None;

        loop {
            if join.is_ready() {
                return join.finish();
            }

            tokio::select! {
                line = self.lines.recv(), if join.is_draining() => match line {
                    Some(line) => join.record(line),
                    None => join.mark_drained(),
                },
                status = self.child.wait(), if !join.has_exited() => {
                    let status = status?;
                    debug!(code = ?status.code(), "schema validator exited");
                    join.record_exit(status.code());
                    drain_deadline = Some(Instant::now() + self.drain_grace);
                },
                () = sleep_until(drain_deadline), if drain_deadline.is_some() && join.is_draining() => {
                    debug!("validator output still open after exit; settling on fallback status");
                    join.mark_drained();
                },
                () = sleep_until(deadline), if deadline.is_some() => {
                    self.kill().await;
                    return Err(ValidatorError::Timeout(self.timeout.unwrap_or_default()));
                },
                () = self.cancel.cancelled() => {
                    self.kill().await;
                    return Err(ValidatorError::Cancelled);
                },
            }
        }
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill schema validator");
        }
    }
}

/// Validate with the default configuration (`java` on `PATH`, current directory).
///
/// # Errors
///
/// See [`SchemaValidator::validate`].
pub async fn validate_xml(
    input: impl Into<XmlInput>,
    schema: &str,
) -> Result<ValidationOutcome, ValidatorError> {
    JvmValidator::new(ValidatorConfig::default())
        .validate(input.into(), schema)
        .await
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn read_lines<R>(reader: R, tx: mpsc::Sender<Line>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(classify_bytes(&buf)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read schema validator output");
                break;
            }
        }
    }
}

/// Deliver the document on stdin, then close it so the validator sees EOF.
async fn write_input(mut stdin: ChildStdin, input: XmlInput) {
    let written = match input {
        XmlInput::Text(text) => stdin.write_all(text.as_bytes()).await,
        XmlInput::Bytes(bytes) => stdin.write_all(&bytes).await,
        XmlInput::Stream(mut reader) => tokio::io::copy(&mut reader, &mut stdin).await.map(drop),
        XmlInput::File(_) => Ok(()),
    };

    match written.and(stdin.shutdown().await) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("schema validator closed stdin before the document was written");
        }
        Err(e) => warn!(error = %e, "failed to deliver document to schema validator"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let mut config = ValidatorConfig::default();
        config.java = PathBuf::from("/nonexistent/jdk/bin/java");
        let validator = JvmValidator::new(config);

        let err = validator.validate("<a/>".into(), "a.xsd").await.unwrap_err();
        assert!(
            matches!(err, ValidatorError::ProcessSpawn { ref program, .. } if program == &PathBuf::from("/nonexistent/jdk/bin/java")),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unsupported_value_is_rejected() {
        let validator = JvmValidator::new(ValidatorConfig::default());
        let err = validator
            .validate_value(serde_json::json!(42), "a.xsd")
            .await
            .unwrap_err();
        assert!(matches!(err, ValidatorError::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_cancel_handle_before_wait() {
        let handle = CancelHandle::default();
        assert!(!handle.is_cancelled());
        handle.cancel();
        assert!(handle.is_cancelled());
        // Resolves immediately once cancelled.
        handle.cancelled().await;
    }
}
