use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use panelcam_core::{Job, JobStatus};
use uuid::Uuid;

use crate::error::RepoError;
use crate::repository::JobRepository;
use crate::types::NewJob;

/// In-memory stand-in for `JobRepository`, used by worker/pipeline tests.
/// Uses a single mutex rather than row-level locks — fine for tests, which
/// never need the finer-grained concurrency a real Postgres pool offers.
#[derive(Default)]
pub struct InMemoryRepository {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryRepository {
    async fn create(&self, job: NewJob) -> Result<Job, RepoError> {
        let mut jobs = self.jobs.lock().unwrap();

        if let Some(key) = &job.idempotency_key {
            if jobs.values().any(|j| j.idempotency_key.as_deref() == Some(key.as_str())) {
                return Err(RepoError::DuplicateIdempotencyKey);
            }
        }

        let record = Job {
            id: Uuid::new_v4(),
            kind: job.kind,
            status: JobStatus::Created,
            attempt: 0,
            context: job.context,
            artifact_id: None,
            idempotency_key: job.idempotency_key,
            error: None,
            result: None,
        };
        jobs.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Job, RepoError> {
        self.jobs.lock().unwrap().get(&id).cloned().ok_or(RepoError::NotFound(id))
    }

    async fn get_by_idempotency_key(&self, key: &str) -> Result<Option<Job>, RepoError> {
        Ok(self.jobs.lock().unwrap().values().find(|j| j.idempotency_key.as_deref() == Some(key)).cloned())
    }

    async fn update_status(&self, id: Uuid, expected: JobStatus, next: JobStatus, error: Option<String>) -> Result<Job, RepoError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        if job.status != expected {
            return Err(RepoError::CasConflict(id));
        }
        if expected == JobStatus::Processing && next == JobStatus::Created {
            job.attempt += 1;
        }
        job.status = next;
        job.error = error;
        Ok(job.clone())
    }

    async fn attach_artifact(
        &self,
        id: Uuid,
        artifact_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<Job, RepoError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        job.artifact_id = Some(artifact_id);
        job.result = result;
        Ok(job.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcam_core::JobContext;

    fn sample_context() -> JobContext {
        JobContext::Zip { job_ids: vec![], extra: Default::default() }
    }

    #[tokio::test]
    async fn create_then_get_by_id_round_trips() {
        let repo = InMemoryRepository::new();
        let job = repo.create(NewJob::new(sample_context(), None)).await.unwrap();
        let fetched = repo.get_by_id(job.id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.status, JobStatus::Created);
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_rejected() {
        let repo = InMemoryRepository::new();
        repo.create(NewJob::new(sample_context(), Some("k1".to_string()))).await.unwrap();
        let err = repo.create(NewJob::new(sample_context(), Some("k1".to_string()))).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateIdempotencyKey));
    }

    #[tokio::test]
    async fn update_status_rejects_wrong_expected_state() {
        let repo = InMemoryRepository::new();
        let job = repo.create(NewJob::new(sample_context(), None)).await.unwrap();
        let err = repo.update_status(job.id, JobStatus::Processing, JobStatus::Completed, None).await.unwrap_err();
        assert!(matches!(err, RepoError::CasConflict(_)));
    }

    #[tokio::test]
    async fn retry_transition_increments_attempt() {
        let repo = InMemoryRepository::new();
        let job = repo.create(NewJob::new(sample_context(), None)).await.unwrap();
        repo.update_status(job.id, JobStatus::Created, JobStatus::Processing, None).await.unwrap();
        let retried = repo.update_status(job.id, JobStatus::Processing, JobStatus::Created, Some("transient".to_string())).await.unwrap();
        assert_eq!(retried.attempt, 1);
    }

    #[tokio::test]
    async fn attach_artifact_sets_artifact_id() {
        let repo = InMemoryRepository::new();
        let job = repo.create(NewJob::new(sample_context(), None)).await.unwrap();
        let artifact_id = Uuid::new_v4();
        let updated = repo.attach_artifact(job.id, artifact_id, Some(serde_json::json!({"placed": 12}))).await.unwrap();
        assert_eq!(updated.artifact_id, Some(artifact_id));
        assert_eq!(updated.result, Some(serde_json::json!({"placed": 12})));
    }
}
