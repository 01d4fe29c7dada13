//! Command line of the validator JVM.

use std::ffi::OsString;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ValidatorConfig;
use crate::input::InputMode;

/// JVM option forcing UTF-8 for the validator's own I/O.
pub const FILE_ENCODING_OPTION: &str = "-Dfile.encoding=UTF-8";

/// Arguments passed to the Java launcher, in order.
#[must_use]
pub fn validator_args(config: &ValidatorConfig, mode: InputMode<'_>, schema: &str) -> Vec<OsString> {
    let input_flag = match mode {
        InputMode::File(path) => {
            let mut flag = OsString::from("-file=");
            flag.push(path.as_os_str());
            flag
        }
        InputMode::Stdin => OsString::from("-stdin"),
    };

    vec![
        OsString::from(FILE_ENCODING_OPTION),
        OsString::from("-classpath"),
        OsString::from(config.classpath()),
        OsString::from(&config.main_class),
        input_flag,
        OsString::from(format!("-schema={schema}")),
    ]
}

/// Build the validator command with piped output channels.
///
/// Stdin is piped only when the document is delivered through it. The child
/// is killed if its handle is dropped before it exits.
#[must_use]
pub fn build_command(config: &ValidatorConfig, mode: InputMode<'_>, schema: &str) -> Command {
    let mut command = Command::new(&config.java);
    command
        .args(validator_args(config, mode, schema))
        .current_dir(&config.cwd)
        .stdin(match mode {
            InputMode::File(_) => Stdio::null(),
            InputMode::Stdin => Stdio::piped(),
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}
