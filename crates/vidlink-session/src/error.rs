//! Error types for vidlink-session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bootstrap rejected with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("bootstrap transport error: {0}")]
    Transport(String),

    #[error("malformed bootstrap payload: {0}")]
    Payload(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session bootstrap failed: {0}")]
    BootstrapFailed(#[from] BootstrapError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
