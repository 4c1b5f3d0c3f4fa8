use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

/// Failure from running one dispatch branch (`DXF`/`GCODE`/`DRILLING`/`ZIP`).
/// The worker loop only ever inspects `.class()` to decide retry vs. DLQ —
/// never the message text.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Calc(#[from] panelcam_calc::CalcError),

    #[error(transparent)]
    Pack(#[from] panelcam_pack::PackError),

    #[error(transparent)]
    Dxf(#[from] panelcam_dxf::DxfError),

    #[error(transparent)]
    Post(#[from] panelcam_post::PostError),

    #[error(transparent)]
    Store(#[from] panelcam_store::StoreError),

    #[error(transparent)]
    Repo(#[from] panelcam_repo::RepoError),

    #[error("referenced job {0} has no artifact")]
    MissingArtifact(uuid::Uuid),

    #[error("unknown machine profile: {0}")]
    UnknownMachineProfile(String),

    #[error("malformed job payload: {0}")]
    MalformedPayload(String),

    #[error("zip archive error: {0}")]
    Zip(String),
}

impl Classify for DispatchError {
    fn class(&self) -> ErrorClass {
        match self {
            DispatchError::Calc(e) => e.class(),
            DispatchError::Pack(e) => e.class(),
            DispatchError::Dxf(e) => e.class(),
            DispatchError::Post(e) => e.class(),
            DispatchError::Store(e) => e.class(),
            DispatchError::Repo(e) => e.class(),
            DispatchError::MissingArtifact(_) => ErrorClass::DependencyMissing,
            DispatchError::UnknownMachineProfile(_) => ErrorClass::InvalidInput,
            DispatchError::MalformedPayload(_) => ErrorClass::InvalidInput,
            DispatchError::Zip(_) => ErrorClass::Internal,
        }
    }
}
