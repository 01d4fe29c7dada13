//! Schema validation hook for SAML 2.0 protocol messages.
//!
//! A SAML library hands every inbound message (e.g. the `SAMLResponse` posted
//! by Okta to the assertion consumer service) to a schema validator before it
//! checks signatures. This module adapts any [`SchemaValidator`] to that role.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::error::ValidatorError;
use crate::input::XmlInput;
use crate::outcome::ValidationOutcome;
use crate::validator::SchemaValidator;

/// Default protocol schema file, resolved inside the schema directory.
pub const SAML_PROTOCOL_SCHEMA: &str = "saml-schema-protocol-2.0.xsd";

/// Token returned when a message conforms to the protocol schema.
pub const SUCCESS_VALIDATE_XML: &str = "SUCCESS_VALIDATE_XML";

/// Token prefixed to the message of a rejected document.
pub const ERR_EXCEPTION_VALIDATE_XML: &str = "ERR_EXCEPTION_VALIDATE_XML";

/// Errors from validating a SAML message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SamlSchemaError {
    /// The message does not conform to the SAML protocol schema.
    #[error("{ERR_EXCEPTION_VALIDATE_XML}: {}", .0.error_message())]
    Invalid(ValidationOutcome),

    /// The HTTP-POST binding value is not valid base64.
    #[error("malformed SAML HTTP-POST payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The bridge itself failed (spawn, I/O, timeout, cancellation).
    #[error(transparent)]
    Bridge(ValidatorError),
}

impl From<ValidatorError> for SamlSchemaError {
    fn from(err: ValidatorError) -> Self {
        match err {
            ValidatorError::ValidationFailed(outcome) => Self::Invalid(outcome),
            other => Self::Bridge(other),
        }
    }
}

/// A message accepted by the protocol schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlAccepted {
    /// Always [`SUCCESS_VALIDATE_XML`].
    pub token: &'static str,
    /// What the validator reported, including its status token.
    pub outcome: ValidationOutcome,
}

/// Validates SAML protocol messages against the OASIS schemas.
#[derive(Debug, Clone)]
pub struct SamlSchemaValidator<V> {
    inner: V,
    schema_dir: PathBuf,
    schema_file: String,
}

impl<V: SchemaValidator> SamlSchemaValidator<V> {
    /// Validate against `<schema_dir>/saml-schema-protocol-2.0.xsd`.
    ///
    /// The directory must also hold the schemas it imports (assertion,
    /// xmldsig, xenc).
    #[must_use]
    pub fn new(inner: V, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            schema_dir: schema_dir.into(),
            schema_file: SAML_PROTOCOL_SCHEMA.to_owned(),
        }
    }

    /// Use a different root schema file inside the schema directory.
    #[must_use]
    pub fn with_schema_file(mut self, file: impl Into<String>) -> Self {
        self.schema_file = file.into();
        self
    }

    /// Full path of the root schema.
    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.schema_dir.join(&self.schema_file)
    }

    /// The schema directory.
    #[must_use]
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Validate a decoded SAML message.
    ///
    /// # Errors
    ///
    /// [`SamlSchemaError::Invalid`] when the schema rejects the message,
    /// [`SamlSchemaError::Bridge`] when the validator could not run.
    pub async fn validate_message(
        &self,
        xml: impl Into<XmlInput>,
    ) -> Result<SamlAccepted, SamlSchemaError> {
        let schema = self.schema_path();
        let outcome = self
            .inner
            .validate(xml.into(), &schema.to_string_lossy())
            .await?;
        Ok(SamlAccepted {
            token: SUCCESS_VALIDATE_XML,
            outcome,
        })
    }

    /// Decode an HTTP-POST binding value and validate the message inside.
    ///
    /// # Errors
    ///
    /// [`SamlSchemaError::Encoding`] for malformed base64, otherwise as
    /// [`SamlSchemaValidator::validate_message`].
    pub async fn validate_post_binding(
        &self,
        encoded: &str,
    ) -> Result<SamlAccepted, SamlSchemaError> {
        let xml = decode_post_binding(encoded)?;
        self.validate_message(xml).await
    }
}

/// Decode the base64 value of an HTTP-POST `SAMLRequest` / `SAMLResponse` field.
///
/// Line breaks and other ASCII whitespace inserted by form encoders are ignored.
///
/// # Errors
///
/// Returns [`SamlSchemaError::Encoding`] if the value is not valid base64.
pub fn decode_post_binding(encoded: &str) -> Result<Vec<u8>, SamlSchemaError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}
