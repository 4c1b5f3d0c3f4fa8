use async_trait::async_trait;
use panelcam_core::{Job, JobStatus};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::convert::{kind_to_str, row_to_job, status_to_str};
use crate::error::RepoError;
use crate::repository::JobRepository;
use crate::types::{JobRow, NewJob};

pub struct PostgresJobRepository {
    pool: Pool<Postgres>,
}

impl PostgresJobRepository {
    pub async fn connect(database_url: &str) -> Result<Self, RepoError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn create(&self, job: NewJob) -> Result<Job, RepoError> {
        let id = Uuid::new_v4();
        let kind = kind_to_str(job.kind);
        let status = status_to_str(JobStatus::Created);
        let context = serde_json::to_value(&job.context).map_err(|e| RepoError::Backend(e.to_string()))?;

        let row: JobRow = sqlx::query_as(
            "INSERT INTO jobs (id, kind, status, attempt, context, artifact_id, idempotency_key, error, result)
             VALUES ($1, $2, $3, 0, $4, NULL, $5, NULL, NULL)
             RETURNING id, kind, status, attempt, context, artifact_id, idempotency_key, error, result",
        )
        .bind(id)
        .bind(kind)
        .bind(status)
        .bind(context)
        .bind(&job.idempotency_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) {
                RepoError::DuplicateIdempotencyKey
            } else {
                RepoError::Backend(e.to_string())
            }
        })?;

        row_to_job(row)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Job, RepoError> {
        let row: JobRow = sqlx::query_as(
            "SELECT id, kind, status, attempt, context, artifact_id, idempotency_key, error, result FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Backend(e.to_string()))?
        .ok_or(RepoError::NotFound(id))?;

        row_to_job(row)
    }

    async fn get_by_idempotency_key(&self, key: &str) -> Result<Option<Job>, RepoError> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT id, kind, status, attempt, context, artifact_id, idempotency_key, error, result
             FROM jobs WHERE idempotency_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Backend(e.to_string()))?;

        row.map(row_to_job).transpose()
    }

    async fn update_status(&self, id: Uuid, expected: JobStatus, next: JobStatus, error: Option<String>) -> Result<Job, RepoError> {
        let expected_str = status_to_str(expected);
        let next_str = status_to_str(next);
        let is_retry = expected == JobStatus::Processing && next == JobStatus::Created;

        let row: Option<JobRow> = if is_retry {
            sqlx::query_as(
                "UPDATE jobs SET status = $1, attempt = attempt + 1, error = $2
                 WHERE id = $3 AND status = $4
                 RETURNING id, kind, status, attempt, context, artifact_id, idempotency_key, error, result",
            )
            .bind(&next_str)
            .bind(&error)
            .bind(id)
            .bind(&expected_str)
            .fetch_optional(&self.pool)
            .await
        } else {
            sqlx::query_as(
                "UPDATE jobs SET status = $1, error = $2
                 WHERE id = $3 AND status = $4
                 RETURNING id, kind, status, attempt, context, artifact_id, idempotency_key, error, result",
            )
            .bind(&next_str)
            .bind(&error)
            .bind(id)
            .bind(&expected_str)
            .fetch_optional(&self.pool)
            .await
        }
        .map_err(|e| RepoError::Backend(e.to_string()))?;

        match row {
            Some(row) => row_to_job(row),
            None => {
                // Distinguish "job doesn't exist" from "status didn't match" so the
                // worker can tell a CAS race from a bad job id.
                match self.get_by_id(id).await {
                    Ok(_) => Err(RepoError::CasConflict(id)),
                    Err(e) => Err(e),
                }
            }
        }
    }

    async fn attach_artifact(
        &self,
        id: Uuid,
        artifact_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<Job, RepoError> {
        let row: Option<JobRow> = sqlx::query_as(
            "UPDATE jobs SET artifact_id = $1, result = $2 WHERE id = $3
             RETURNING id, kind, status, attempt, context, artifact_id, idempotency_key, error, result",
        )
        .bind(artifact_id)
        .bind(result)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Backend(e.to_string()))?;

        row_to_job(row.ok_or(RepoError::NotFound(id))?)
    }
}
