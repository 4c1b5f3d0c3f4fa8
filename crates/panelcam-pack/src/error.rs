use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid packer configuration: {0}")]
    InvalidConfig(String),
}

impl Classify for PackError {
    fn class(&self) -> ErrorClass {
        ErrorClass::InvalidInput
    }
}
