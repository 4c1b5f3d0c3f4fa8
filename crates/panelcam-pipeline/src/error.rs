use panelcam_core::{Classify, ErrorClass};
use panelcam_queue::QueueError;
use panelcam_repo::RepoError;
use panelcam_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("job {0} not found")]
    JobNotFound(uuid::Uuid),

    #[error("job {0} has no artifact yet")]
    ArtifactNotReady(uuid::Uuid),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for PipelineError {
    fn class(&self) -> ErrorClass {
        match self {
            PipelineError::JobNotFound(_) => ErrorClass::InvalidInput,
            PipelineError::ArtifactNotReady(_) => ErrorClass::InvalidInput,
            PipelineError::Repo(e) => e.class(),
            PipelineError::Queue(e) => e.class(),
            PipelineError::Store(e) => e.class(),
        }
    }
}
