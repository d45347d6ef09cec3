//! JSON error responses.
//!
//! Every failure that can still produce a well-formed HTTP response goes
//! through these helpers, so clients always see a `{"error", "message"}`
//! body (CORS headers are added by the layer wrapping the router).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::upstream::UpstreamError;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

pub fn create_error(status: StatusCode, error: &str, message: impl AsRef<str>) -> Response {
    (
        status,
        Json(ErrorBody {
            error,
            message: message.as_ref(),
        }),
    )
        .into_response()
}

pub fn bad_request(message: impl AsRef<str>) -> Response {
    create_error(StatusCode::BAD_REQUEST, "Bad request", message)
}

pub fn server_configuration_error() -> Response {
    create_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server configuration error",
        "API key not configured. Please check server environment variables.",
    )
}

pub fn internal_error(message: impl AsRef<str>) -> Response {
    create_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", message)
}

pub fn method_not_allowed() -> Response {
    create_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        "Only POST is supported on this endpoint",
    )
}

pub fn enhanced_cod_failed(message: impl AsRef<str>) -> Response {
    create_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Enhanced CoD processing failed",
        message,
    )
}

/// Map an upstream failure onto the response contract: provider errors
/// pass their status and raw body through, transport failures become 500s.
pub fn upstream_error(err: UpstreamError) -> Response {
    match err {
        UpstreamError::Status { status, body } => {
            create_error(status, "API request failed", body)
        }
        UpstreamError::NoResponseBody => internal_error("No response body from API"),
        UpstreamError::Request(e) => internal_error(e.to_string()),
    }
}
