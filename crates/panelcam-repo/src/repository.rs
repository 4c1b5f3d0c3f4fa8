use async_trait::async_trait;
use panelcam_core::{Job, JobStatus};
use uuid::Uuid;

use crate::error::RepoError;
use crate::types::NewJob;

/// Job persistence. Every write that changes lifecycle state goes through
/// `update_status`'s compare-and-set so concurrent workers can never both
/// believe they own the same job.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: NewJob) -> Result<Job, RepoError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Job, RepoError>;

    async fn get_by_idempotency_key(&self, key: &str) -> Result<Option<Job>, RepoError>;

    /// Transition `id` from `expected` to `next`, failing with
    /// `CasConflict` if the row's current status doesn't match `expected`.
    /// The `Processing -> Created` retry transition additionally
    /// increments `attempt` as part of the same conditional update.
    async fn update_status(&self, id: Uuid, expected: JobStatus, next: JobStatus, error: Option<String>) -> Result<Job, RepoError>;

    /// Link the produced artifact to `id` and, if the dispatch branch
    /// produced kind-specific output metadata (packer utilization,
    /// placed/unplaced counts...), attach it alongside.
    async fn attach_artifact(
        &self,
        id: Uuid,
        artifact_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<Job, RepoError>;
}
