use thiserror::Error;

#[derive(Error, Debug)]
pub enum JudoError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Device answered with HTTP status {0}")]
    HttpStatus(u16),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Lock acquisition failed")]
    LockError,
}

/// Coarse classification used for retry decisions and log wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Decode,
    Transport,
    Protocol,
    Local,
}

impl JudoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JudoError::ValidationError(_) => ErrorKind::Validation,
            JudoError::DecodeError(_) => ErrorKind::Decode,
            JudoError::TransportError(_) | JudoError::Timeout => ErrorKind::Transport,
            JudoError::ProtocolError(_) | JudoError::HttpStatus(_) => ErrorKind::Protocol,
            JudoError::ConfigError(_)
            | JudoError::SerializationError(_)
            | JudoError::IoError(_)
            | JudoError::LockError => ErrorKind::Local,
        }
    }

    /// Transport failures clear up on their own; everything else needs attention.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<reqwest::Error> for JudoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JudoError::Timeout
        } else if let Some(status) = err.status() {
            JudoError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            JudoError::ProtocolError(format!("Malformed response body: {}", err))
        } else {
            JudoError::TransportError(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for JudoError {
    fn from(err: serde_json::Error) -> Self {
        JudoError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for JudoError {
    fn from(err: std::io::Error) -> Self {
        JudoError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for JudoError {
    fn from(err: toml::de::Error) -> Self {
        JudoError::ConfigError(format!("Invalid TOML: {}", err))
    }
}

impl From<toml::ser::Error> for JudoError {
    fn from(err: toml::ser::Error) -> Self {
        JudoError::SerializationError(format!("TOML error: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for JudoError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        JudoError::Timeout
    }
}
