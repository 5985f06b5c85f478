//! Shared error type across hellometrics crates.

use thiserror::Error;

/// Stable error codes, used in logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration or metric definition.
    Config,
    /// I/O failure (bind, read).
    Io,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::Io => "IO",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HelloMetricsError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum HelloMetricsError {
    #[error("config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl HelloMetricsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HelloMetricsError::Config(_) => ErrorCode::Config,
            HelloMetricsError::Io(_) => ErrorCode::Io,
            HelloMetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
