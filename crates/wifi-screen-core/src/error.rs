use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    /// Device unreachable, connection reset, or a transport-level timeout.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body was malformed or missing required fields.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScreenError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, ScreenError>;
