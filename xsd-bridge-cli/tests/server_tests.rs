#![allow(clippy::unwrap_used)]
//! Integration tests for the HTTP front end.
//!
//! These tests cover:
//! - `GET /health`
//! - Unsupported `xml` shapes rejected with 400 before any process is spawned
//! - Missing launcher reported as 500
//! - Valid and rejected documents through a stub validator (unix only)

use std::path::PathBuf;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use xsd_bridge::{JvmValidator, ValidatorConfig};
use xsd_bridge_cli::server::router;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn missing_launcher() -> JvmValidator {
    let mut config = ValidatorConfig::default();
    config.java = PathBuf::from("/nonexistent/jdk/bin/java");
    JvmValidator::new(config)
}

async fn post_validate(validator: JvmValidator, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/validate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router(validator, 0).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router(missing_launcher(), 0).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_xml_shape_is_bad_request() {
    // The launcher does not exist, so reaching the spawn would yield a 500.
    let (status, body) =
        post_validate(missing_launcher(), &json!({ "xml": 42, "schema": "a.xsd" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("unsupported <xml> parameter")
    );
}

#[tokio::test]
async fn test_missing_launcher_is_server_error() {
    let (status, body) =
        post_validate(missing_launcher(), &json!({ "xml": "<a/>", "schema": "a.xsd" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("failed to spawn validator"));
}

#[cfg(unix)]
mod with_stub {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Accepts documents containing `<b`, rejects everything else.
    const STUB: &str = r#"#!/bin/sh
doc=$(cat)
case "$doc" in
  *"<b"*) echo "result=OK"; exit 0 ;;
  *) echo "[error] 1:1 cvc-elt.1.a: Cannot find the declaration of element." >&2
     echo "result=WITH_ERRORS"; exit 255 ;;
esac
"#;

    fn stub_validator(dir: &TempDir) -> JvmValidator {
        let java = dir.path().join("java");
        fs::write(&java, STUB).unwrap();
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();
        let mut config = ValidatorConfig::default();
        config.java = java;
        config.cwd = dir.path().to_path_buf();
        JvmValidator::new(config)
    }

    #[tokio::test]
    async fn test_valid_and_rejected_documents() {
        let dir = TempDir::new().unwrap();
        let validator = stub_validator(&dir);

        let (status, body) =
            post_validate(validator.clone(), &json!({ "xml": "<b/>", "schema": "b.xsd" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["status"], "OK");

        let (status, body) =
            post_validate(validator, &json!({ "xml": [60, 97, 47, 62], "schema": "b.xsd" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["valid"], false);
        assert_eq!(body["status"], "WITH_ERRORS");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }
}
