// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stderr: CLI tools are expected to print to stderr for user output.
// - exit: Calling `std::process::exit()` is standard for CLI apps to signal failure to the shell.
#![allow(clippy::print_stderr, clippy::exit)]

use xsd_bridge_cli::cli::{self, Verdict};

#[tokio::main]
async fn main() {
    match cli::run().await {
        Ok(Verdict::Valid | Verdict::Served) => {}
        Ok(Verdict::Invalid) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
