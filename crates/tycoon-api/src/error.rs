//! Error types for the action API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"success": false, "message", "status"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use tycoon_economy::ActionError;

/// Message shown for failures the player cannot act on.
const GENERIC_FAILURE: &str = "the action failed and nothing was changed";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An action or registration failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or query could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status and player-facing message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Action(ActionError::Rejected { reason }) => {
                (StatusCode::BAD_REQUEST, reason.clone())
            }
            Self::Action(ActionError::Conflict { reason }) => {
                (StatusCode::CONFLICT, reason.clone())
            }
            Self::Action(e @ ActionError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            Self::Action(_) | Self::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_owned(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "message": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_errors_map_to_statuses() {
        let cases = [
            (ActionError::rejected("not enough energy"), StatusCode::BAD_REQUEST),
            (ActionError::conflict("already travelling"), StatusCode::CONFLICT),
            (ActionError::not_found("player", "x"), StatusCode::NOT_FOUND),
            (ActionError::internal("broken"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            let (status, _) = ApiError::from(error).status_and_message();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn internal_details_are_not_shown() {
        let (_, message) =
            ApiError::from(ActionError::internal("ledger drifted")).status_and_message();
        assert_eq!(message, GENERIC_FAILURE);

        let (_, message) =
            ApiError::from(ActionError::conflict("already travelling")).status_and_message();
        assert_eq!(message, "already travelling");
    }
}
