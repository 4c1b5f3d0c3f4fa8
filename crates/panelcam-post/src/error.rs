use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("unknown machine profile: {0}")]
    UnknownProfile(String),

    #[error("invalid machining operation: {0}")]
    InvalidMachining(String),

    #[error("G-code emission error: {0}")]
    Emission(String),
}

impl Classify for PostError {
    fn class(&self) -> ErrorClass {
        match self {
            PostError::UnknownProfile(_) => ErrorClass::InvalidInput,
            PostError::InvalidMachining(_) => ErrorClass::InvalidMachining,
            PostError::Emission(_) => ErrorClass::Internal,
        }
    }
}
