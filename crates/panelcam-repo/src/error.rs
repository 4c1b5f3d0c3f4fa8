use panelcam_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("job not found: {0}")]
    NotFound(uuid::Uuid),

    #[error("idempotency key already in use")]
    DuplicateIdempotencyKey,

    #[error("compare-and-set failed: job {0} was not in the expected status")]
    CasConflict(uuid::Uuid),

    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Backend(String),
}

impl Classify for RepoError {
    fn class(&self) -> ErrorClass {
        match self {
            RepoError::NotFound(_) => ErrorClass::DependencyMissing,
            RepoError::DuplicateIdempotencyKey => ErrorClass::InvalidInput,
            RepoError::CasConflict(_) => ErrorClass::Transient,
            RepoError::Unavailable(_) => ErrorClass::Transient,
            RepoError::Backend(_) => ErrorClass::Internal,
        }
    }
}
