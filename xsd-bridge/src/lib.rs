//! # xsd-bridge
//!
//! XML Schema validation through an external JVM validator process.
//!
//! The bridge launches `support.XMLValidator`, streams the document into it,
//! classifies what it prints and resolves to a [`ValidationOutcome`]. Callers
//! program against the [`SchemaValidator`] trait; [`JvmValidator`] is the
//! process-backed implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use xsd_bridge::{JvmValidator, SchemaValidator, ValidatorConfig, XmlInput};
//!
//! # async fn run() -> Result<(), xsd_bridge::ValidatorError> {
//! let mut config = ValidatorConfig::default();
//! config.base_dir = PathBuf::from("/opt/xsd-schema-validator");
//!
//! let validator = JvmValidator::new(config);
//! let outcome = validator
//!     .validate(XmlInput::from("<a/>"), "schemas/a.xsd")
//!     .await?;
//! println!("valid: {} (status {})", outcome.valid, outcome.status);
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod error;
mod input;
mod outcome;
pub mod output;
mod protocol;
pub mod saml;
mod session;
mod validator;

pub use command::validator_args;
pub use config::{CLASSPATH_SEPARATOR, DEFAULT_MAIN_CLASS, ValidatorConfig};
pub use error::ValidatorError;
pub use input::{InputMode, XmlInput};
pub use outcome::{STATUS_OK, STATUS_WITH_ERRORS, ValidationOutcome};
pub use protocol::{Line, classify};
pub use validator::{CancelHandle, JvmValidator, SchemaValidator, ValidationRun, validate_xml};
