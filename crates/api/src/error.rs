//! Fehler- und Ergebnis-Typen für Backend-Aufrufe.
use thiserror::Error;

const UNREACHABLE_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Transport failure without an underlying reqwest error (stubs, invalid parts).
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// 2xx status whose payload reports failure.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response carried no session token")]
    MissingToken,

    #[error("session storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("not signed in")]
    Unauthenticated,
}

impl ApiError {
    /// Text suitable for a top-level banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Network(_) => UNREACHABLE_MESSAGE.to_string(),
            ApiError::Status { message, .. } | ApiError::Rejected { message, .. } => {
                message.clone()
            }
            ApiError::Decode(_) | ApiError::MissingToken => {
                "Unexpected response from the server.".to_string()
            }
            ApiError::Storage(_) => "Could not store your session on this device.".to_string(),
            ApiError::Unauthenticated => "Please log in again.".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
