use prefstate::v1::ConvergeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("failed to encode document: {0}")]
    Encode(String),

    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("home directory not found")]
    NoHomeDirectory,

    #[error(transparent)]
    Converge(#[from] ConvergeError),
}
