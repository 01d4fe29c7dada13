//! Command line definition and dispatch.
//!
//! This is the composition layer: it reads `JAVA_HOME` and friends, builds the
//! bridge configuration, installs the tracing subscriber and runs a command.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use xsd_bridge::saml::{SamlAccepted, SamlSchemaError, SamlSchemaValidator};
use xsd_bridge::{JvmValidator, SchemaValidator, ValidationOutcome, ValidatorConfig, XmlInput, output};

use crate::server;

#[derive(Debug, Parser)]
#[command(name = "xsd-bridge", version, about = "Validate XML against XML Schemas through a JVM validator")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub launcher: LauncherArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how to launch the validator JVM.
#[derive(Debug, Args)]
pub struct LauncherArgs {
    /// Java installation root; the launcher is `<root>/bin/java` (default: `java` on PATH)
    #[arg(long, env = "JAVA_HOME", global = true)]
    pub java_home: Option<PathBuf>,

    /// Directory containing the compiled `support.XMLValidator` classes
    #[arg(long, env = "XSD_VALIDATOR_HOME", global = true)]
    pub validator_home: Option<PathBuf>,

    /// Working directory of the validator; relative schema includes resolve here
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Log validator output that is neither a diagnostic nor the result line
    #[arg(long, env = "XSD_VALIDATOR_DEBUG", global = true)]
    pub debug_validator: bool,

    /// Kill the validator if a run takes longer than this many seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl LauncherArgs {
    /// Build the bridge configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn to_config(&self) -> Result<ValidatorConfig> {
        let current = std::env::current_dir().context("Failed to determine current directory")?;
        let mut config = ValidatorConfig::default();
        config.java = ValidatorConfig::java_from_home(self.java_home.as_deref());
        config.base_dir = self.validator_home.clone().unwrap_or_else(|| current.clone());
        config.cwd = self.cwd.clone().unwrap_or(current);
        config.debug = self.debug_validator;
        config.timeout = self.timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate an XML document against an XML Schema
    Validate {
        /// Schema path or URI handed to the validator
        #[arg(long)]
        schema: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Validate a SAML 2.0 protocol message against the OASIS schemas
    Saml {
        /// Directory holding `saml-schema-protocol-2.0.xsd` and its imports
        #[arg(long)]
        schema_dir: PathBuf,

        /// Root schema file inside the schema directory
        #[arg(long)]
        schema_file: Option<String>,

        /// The document is a base64 HTTP-POST binding value (`SAMLResponse`)
        #[arg(long)]
        base64: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Serve `POST /validate` over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 8090)]
        port: u16,
    },
}

/// Where the document comes from. Exactly one must be given.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Document on disk, read by the validator itself
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Stream the document from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Inline document text
    #[arg(long)]
    pub text: Option<String>,
}

impl SourceArgs {
    /// Label used in reports.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.file, &self.text) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(_)) => "<inline>".to_owned(),
            (None, None) => "<stdin>".to_owned(),
        }
    }

    /// Convert into bridge input without reading anything.
    #[must_use]
    pub fn into_input(self) -> XmlInput {
        match (self.file, self.text) {
            (Some(path), _) => XmlInput::File(path),
            (None, Some(text)) => XmlInput::Text(text),
            (None, None) => XmlInput::stream(tokio::io::stdin()),
        }
    }

    /// Read the whole document as text.
    async fn read_to_string(self) -> Result<String> {
        match (self.file, self.text) {
            (Some(path), _) => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, Some(text)) => Ok(text),
            (None, None) => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("Failed to read standard input")?;
                Ok(buf)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// What a successful command run concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The document conforms to its schema.
    Valid,
    /// The document was rejected by the schema.
    Invalid,
    /// The server ran until shutdown.
    Served,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `-v` picks the level. Validator debug output
/// is enabled whenever `debug_validator` is set.
///
/// # Errors
///
/// Returns an error if the validator log directive cannot be parsed.
pub fn init_logging(verbose: u8, debug_validator: bool) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if debug_validator {
        filter = filter.add_directive("xsd_bridge::validator=debug".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Parse the command line and run it.
///
/// # Errors
///
/// Returns an error when the bridge fails to run (spawn, I/O, timeout) or
/// the document cannot be read. A rejected document is not an error; it is
/// reported and yields [`Verdict::Invalid`].
pub async fn run() -> Result<Verdict> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.launcher.debug_validator)?;
    let validator = JvmValidator::new(cli.launcher.to_config()?);

    match cli.command {
        Commands::Validate {
            schema,
            source,
            format,
        } => {
            let label = source.label();
            let result = validator.validate(source.into_input(), &schema).await;
            let outcome = settle(result)?;
            report(&outcome, &label, format)?;
            Ok(verdict(&outcome))
        }
        Commands::Saml {
            schema_dir,
            schema_file,
            base64,
            source,
        } => {
            let mut saml = SamlSchemaValidator::new(validator, schema_dir);
            if let Some(file) = schema_file {
                saml = saml.with_schema_file(file);
            }
            let label = source.label();
            let result = if base64 {
                let encoded = source.read_to_string().await?;
                saml.validate_post_binding(&encoded).await
            } else {
                saml.validate_message(source.into_input()).await
            };
            let outcome = settle_saml(result)?;
            report(&outcome, &label, OutputFormat::Human)?;
            Ok(verdict(&outcome))
        }
        Commands::Serve { host, port } => {
            server::serve(validator, &host, port, cli.verbose).await?;
            Ok(Verdict::Served)
        }
    }
}

/// Turn a rejected document into an outcome to report; keep real failures as errors.
fn settle(result: Result<ValidationOutcome, xsd_bridge::ValidatorError>) -> Result<ValidationOutcome> {
    match result {
        Ok(outcome) | Err(xsd_bridge::ValidatorError::ValidationFailed(outcome)) => Ok(outcome),
        Err(e) => Err(e.into()),
    }
}

/// Same as [`settle`] for SAML messages.
fn settle_saml(result: Result<SamlAccepted, SamlSchemaError>) -> Result<ValidationOutcome> {
    match result {
        Ok(SamlAccepted { outcome, .. }) | Err(SamlSchemaError::Invalid(outcome)) => Ok(outcome),
        Err(e) => Err(e.into()),
    }
}

fn verdict(outcome: &ValidationOutcome) -> Verdict {
    if outcome.valid {
        Verdict::Valid
    } else {
        Verdict::Invalid
    }
}

fn report(outcome: &ValidationOutcome, label: &str, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => output::write_human(outcome, label, &mut out)?,
        OutputFormat::Json => output::write_json(outcome, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
