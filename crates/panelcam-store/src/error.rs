use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object store timed out")]
    Timeout,

    #[error("object store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("object store error: {0}")]
    Backend(String),
}

impl Classify for StoreError {
    fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotFound(_) => ErrorClass::InvalidInput,
            StoreError::InvalidKey(_) => ErrorClass::InvalidInput,
            StoreError::Timeout => ErrorClass::Transient,
            StoreError::Unavailable(_) => ErrorClass::Transient,
            StoreError::Backend(_) => ErrorClass::Internal,
        }
    }
}
