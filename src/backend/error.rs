//! Backend error taxonomy

use crate::models::ResourceKind;

/// Errors raised while talking to the content backend.
///
/// Every variant is cloneable so a single failed fetch can be handed to all
/// callers that were waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout or protocol failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status other than 401
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 401
    #[error("Backend rejected the credentials")]
    Unauthorized,

    /// A write was attempted without a bearer token
    #[error("Authentication token not found")]
    MissingToken,

    /// Response body could not be understood
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Envelope came back with `success: false`
    #[error("Backend reported failure listing {0}")]
    Unsuccessful(ResourceKind),
}

impl ClientError {
    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication failed. Your session may have expired. Please log in again.",
            Self::MissingToken => "Authentication token not found. Please log in again.",
            Self::Transport(_) => "Could not reach the server. Please try again.",
            Self::Status { .. } | Self::Decode(_) | Self::Unsuccessful(_) => {
                "The server could not complete the request. Please try again."
            }
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::MissingToken)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        match e.status() {
            Some(status) if status.as_u16() == 401 => Self::Unauthorized,
            Some(status) => Self::Status {
                status: status.as_u16(),
                body: e.to_string(),
            },
            None => Self::Transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
