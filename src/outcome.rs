//! The uniform result shape returned by every mutating endpoint.
//!
//! Callers check `success` instead of relying on HTTP status codes alone.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The result of an operation as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the operation completed.
    pub success: bool,
    /// A human readable note about what happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Why the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    /// A successful outcome with nothing more to say.
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    /// A successful outcome with a note for the user.
    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Respond with `status_code` instead of the default 200 OK.
    pub fn with_status(self, status_code: StatusCode) -> Response {
        (status_code, Json(self)).into_response()
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}
