use std::io;
use thiserror::Error;

/// Custom error type for Obidome
#[derive(Error, Debug)]
pub enum ObidomeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}

/// Result type alias for Obidome
pub type Result<T> = std::result::Result<T, ObidomeError>;

impl ObidomeError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ObidomeError::Config(msg.into())
    }

    /// Create a platform error
    pub fn platform<S: Into<String>>(msg: S) -> Self {
        ObidomeError::Platform(msg.into())
    }

    pub fn template<S: Into<String>>(msg: S) -> Self {
        ObidomeError::Template(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        ObidomeError::Unsupported(msg.into())
    }

    pub fn render<S: Into<String>>(msg: S) -> Self {
        ObidomeError::Render(msg.into())
    }
}
