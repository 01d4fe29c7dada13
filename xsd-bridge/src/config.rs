//! Configuration for the external validator process.
//!
//! Everything the bridge needs to launch the JVM is carried here explicitly.
//! Environment lookups (`JAVA_HOME` and friends) belong to the CLI layer,
//! which builds a `ValidatorConfig` and hands it to [`crate::JvmValidator`].

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fully qualified name of the validator entry point.
pub const DEFAULT_MAIN_CLASS: &str = "support.XMLValidator";

/// Java launcher used when no installation root is configured.
pub const DEFAULT_JAVA: &str = "java";

/// Separator between classpath entries on the current platform.
#[cfg(windows)]
pub const CLASSPATH_SEPARATOR: &str = ";";
/// Separator between classpath entries on the current platform.
#[cfg(not(windows))]
pub const CLASSPATH_SEPARATOR: &str = ":";

/// Options for launching the validator JVM.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidatorConfig {
    /// Java launcher to execute (default: `java`, resolved through `PATH`).
    pub java: PathBuf,
    /// Directory containing the compiled validator classes
    /// (`support/XMLValidator.class`). First classpath entry.
    pub base_dir: PathBuf,
    /// Working directory of the validator; also the second classpath entry,
    /// so relative schema includes resolve from here.
    pub cwd: PathBuf,
    /// Validator entry point (default: `support.XMLValidator`).
    pub main_class: String,
    /// Log validator lines that are neither diagnostics nor the result token.
    pub debug: bool,
    /// Kill the validator and fail if a run takes longer than this.
    /// `None` (default) waits indefinitely.
    pub timeout: Option<Duration>,
    /// How long to keep reading output after the process exited before
    /// settling on the fallback status (default: 5 seconds).
    pub drain_grace: Duration,
}

impl ValidatorConfig {
    /// Resolve the Java launcher from an optional installation root.
    ///
    /// `Some(root)` maps to `<root>/bin/java`; `None` falls back to `java`
    /// on the search path.
    #[must_use]
    pub fn java_from_home(java_home: Option<&Path>) -> PathBuf {
        java_home.map_or_else(
            || PathBuf::from(DEFAULT_JAVA),
            |home| home.join("bin").join(DEFAULT_JAVA),
        )
    }

    /// Classpath handed to the JVM: `base_dir` then `cwd`.
    #[must_use]
    pub fn classpath(&self) -> String {
        format!(
            "{}{CLASSPATH_SEPARATOR}{}",
            self.base_dir.display(),
            self.cwd.display()
        )
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            java: PathBuf::from(DEFAULT_JAVA),
            base_dir: cwd.clone(),
            cwd,
            main_class: DEFAULT_MAIN_CLASS.to_owned(),
            debug: false,
            timeout: None,
            drain_grace: Duration::from_secs(5),
        }
    }
}
