//! Response shaping.
//!
//! # Responsibilities
//! - Uniform JSON error bodies
//! - Map every dispatch outcome to an HTTP status
//!
//! # Design Decisions
//! - Exhausted upstream rate limits surface as 429, distinct from other
//!   failures, so clients can implement try-again-later behavior
//! - Transport failures surface as 502 without leaking connection detail
//! - Other upstream errors pass the original status and detail through

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::upstream::DispatchResult;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error body carrying upstream detail alongside the gateway message.
#[derive(Debug, Serialize)]
struct UpstreamErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream: Option<serde_json::Value>,
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a non-success dispatch outcome to a gateway response.
///
/// `operation` names what the gateway was trying to do, for the error
/// message.
pub fn dispatch_failure(operation: &str, result: DispatchResult) -> Response {
    match result {
        DispatchResult::Success { .. } => {
            // Callers only hand over non-success outcomes.
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {operation}"),
            )
        }
        DispatchResult::RateLimited => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            format!("Upstream rate limit exceeded while trying to {operation}; try again later"),
        ),
        DispatchResult::TransportFailure { cause } => {
            tracing::error!(operation, error = %cause, "Upstream unreachable");
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Upstream unreachable; failed to {operation}"),
            )
        }
        DispatchResult::ClientError { status, body } => {
            tracing::warn!(operation, status = %status, "Upstream rejected the request");
            let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
            let upstream = match parsed {
                Some(value) => Some(value),
                None if body.is_empty() => None,
                None => Some(serde_json::Value::String(body)),
            };
            (
                status,
                Json(UpstreamErrorBody {
                    error: format!("Failed to {operation}"),
                    upstream,
                }),
            )
                .into_response()
        }
    }
}
