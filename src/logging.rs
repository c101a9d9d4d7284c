//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use unicode_segmentation::UnicodeSegmentation;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_body("Received request", &format!("{parts:#?}"), &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_body("Sending response", &format!("{parts:#?}"), &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_body(label: &str, head: &str, body: &[u8]) {
    let body = String::from_utf8_lossy(body);

    match truncate(&body, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::info!("{label}: {head}\nbody: {truncated}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{label}: {head}\nbody: {body:?}"),
    }
}

/// The first `limit` characters of `text`, or `None` if `text` is not longer than `limit`.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.grapheme_indices(true)
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}
