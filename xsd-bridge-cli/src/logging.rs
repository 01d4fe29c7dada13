use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info};

/// Request logging for the HTTP endpoint.
///
/// `verbose == 0` logs nothing, `1` logs one summary line per request,
/// `2+` additionally logs request and response bodies at DEBUG.
#[derive(Clone)]
pub struct LoggingMiddleware {
    pub verbose: u8,
}

impl LoggingMiddleware {
    #[must_use]
    pub fn new(verbose: u8) -> Self {
        Self { verbose }
    }

    pub async fn handle(&self, request: Request, next: Next) -> Response {
        if self.verbose == 0 {
            return next.run(request).await;
        }

        let method = request.method().clone();
        let uri = request.uri().clone();
        let start = Instant::now();

        let response = if self.verbose >= 2 {
            let (parts, body) = request.into_parts();
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();
            if !bytes.is_empty() {
                debug!(body = %String::from_utf8_lossy(&bytes), "request body");
            }
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        } else {
            next.run(request).await
        };

        let status = response.status();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            method = %method,
            path = uri.path(),
            status = status.as_u16(),
            elapsed_ms = format_args!("{elapsed_ms:.1}"),
            "request handled"
        );

        if self.verbose >= 2 {
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();
            if !bytes.is_empty() {
                debug!(body = %String::from_utf8_lossy(&bytes), "response body");
            }
            return Response::from_parts(parts, Body::from(bytes));
        }

        response
    }
}
