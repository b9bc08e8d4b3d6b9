//! Response bodies shared by every handler

use chrono::Utc;
use serde::Serialize;

use navhub_core::domain::DeleteOutcome;

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Body returned by the delete endpoints.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: DeleteOutcome,
}

impl DeletedResponse {
    pub fn new(message: &str, outcome: DeleteOutcome) -> Self {
        Self {
            message: message.to_string(),
            outcome,
        }
    }
}
