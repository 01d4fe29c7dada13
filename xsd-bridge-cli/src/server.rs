//! HTTP front end: `POST /validate` and `GET /health`.
//!
//! The request body is `{ "xml": <string | byte array | { "file": path }>, "schema": "<path>" }`.
//! Responses carry the outcome JSON: 200 when valid, 422 when the schema
//! rejects the document, 400 for unsupported `xml` shapes and 500 when the
//! validator could not run.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};
use xsd_bridge::{JvmValidator, ValidatorError};

use crate::logging::LoggingMiddleware;

/// Body of `POST /validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Document, in any supported shape.
    pub xml: Value,
    /// Schema path or URI handed to the validator.
    pub schema: String,
}

#[derive(Clone)]
struct AppState {
    validator: JvmValidator,
}

/// Build the router.
#[must_use]
pub fn router(validator: JvmValidator, verbose: u8) -> Router {
    let logging = LoggingMiddleware::new(verbose);
    Router::new()
        .route("/validate", post(validate))
        .route("/health", get(health))
        .layer(middleware::from_fn(move |request: Request, next: Next| {
            let logging = logging.clone();
            async move { logging.handle(request, next).await }
        }))
        .with_state(AppState { validator })
}

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(validator: JvmValidator, host: &str, port: u16, verbose: u8) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    info!("xsd-bridge listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(validator, verbose))
        .await
        .context("HTTP server failed")
}

async fn validate(State(state): State<AppState>, Json(request): Json<ValidateRequest>) -> Response {
    match state
        .validator
        .validate_value(request.xml, &request.schema)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(ValidatorError::ValidationFailed(outcome)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(outcome)).into_response()
        }
        Err(e @ ValidatorError::UnsupportedInput(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!(error = %e, schema = %request.schema, "schema validation failed to run");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[allow(clippy::unused_async)]
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
