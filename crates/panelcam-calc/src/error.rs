use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid cabinet spec: {0}")]
    InvalidSpec(String),
}

impl Classify for CalcError {
    fn class(&self) -> ErrorClass {
        ErrorClass::InvalidInput
    }
}
