//! Caller-visible relay failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::mapping::ResolveError;
use crate::relay::forwarder::ForwardError;

/// Generic message returned for every forwarding failure.
pub const BAD_GATEWAY_MESSAGE: &str = "Failed to forward request to destination";

/// Terminal failure of one relay evaluation.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Resolve(_) => StatusCode::NOT_FOUND,
            RelayError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::Resolve(ResolveError::PlatformNotConfigured { .. }) => "platform_not_configured",
            RelayError::Resolve(ResolveError::UnmappedIdentifier { .. }) => "unmapped_identifier",
            RelayError::Forward(e) if e.is_timeout() => "forward_timeout",
            RelayError::Forward(_) => "forward_failed",
        }
    }

    /// Message exposed to the caller. Forwarding detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Resolve(e) => e.to_string(),
            RelayError::Forward(_) => BAD_GATEWAY_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
