use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("unknown queue: {0}")]
    UnknownQueue(String),

    #[error("queue broker unavailable: {0}")]
    Unavailable(String),

    #[error("malformed queue payload: {0}")]
    Malformed(String),
}

impl Classify for QueueError {
    fn class(&self) -> ErrorClass {
        match self {
            QueueError::UnknownQueue(_) => ErrorClass::InvalidInput,
            QueueError::Unavailable(_) => ErrorClass::Transient,
            QueueError::Malformed(_) => ErrorClass::InvalidInput,
        }
    }
}
