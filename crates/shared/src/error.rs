use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body a backend may return alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid rating '{value}' for {criterion}: expected a number between 0 and 10")]
pub struct InvalidScore {
    pub criterion: String,
    pub value: String,
}
