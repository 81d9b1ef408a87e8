//! Fehler des Portals außerhalb der Formularvalidierung.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Api(#[from] api::ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected weeks payload: {0}")]
    Weeks(#[from] serde_json::Error),

    #[error("unknown week: {0}")]
    UnknownWeek(String),
}

pub type Result<T, E = PortalError> = std::result::Result<T, E>;
