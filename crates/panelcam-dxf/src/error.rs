use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DxfError {
    #[error("DXF write error: {0}")]
    Write(String),

    #[error("panel '{0}' has no matching entry in the placed layout")]
    MissingPanel(String),
}

impl Classify for DxfError {
    fn class(&self) -> ErrorClass {
        match self {
            DxfError::Write(_) => ErrorClass::Internal,
            DxfError::MissingPanel(_) => ErrorClass::InvalidInput,
        }
    }
}
