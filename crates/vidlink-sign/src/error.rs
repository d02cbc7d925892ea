#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("invalid HMAC key: {0}")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
}

pub type Result<T> = std::result::Result<T, SignError>;
