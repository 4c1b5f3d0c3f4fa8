use panelcam_core::{Job, JobContext, JobKind, JobStatus};
use serde_json::Value;

use crate::error::RepoError;
use crate::types::JobRow;

pub(crate) fn kind_to_str(kind: JobKind) -> String {
    serde_json::to_value(kind).unwrap().as_str().unwrap().to_string()
}

pub(crate) fn status_to_str(status: JobStatus) -> String {
    serde_json::to_value(status).unwrap().as_str().unwrap().to_string()
}

pub(crate) fn str_to_status(s: &str) -> Result<JobStatus, RepoError> {
    serde_json::from_value(Value::String(s.to_string())).map_err(|e| RepoError::Backend(e.to_string()))
}

pub(crate) fn row_to_job(row: JobRow) -> Result<Job, RepoError> {
    let status = str_to_status(&row.status)?;
    let context: JobContext = serde_json::from_value(row.context).map_err(|e| RepoError::Backend(e.to_string()))?;
    Ok(Job {
        id: row.id,
        kind: context.kind(),
        status,
        attempt: row.attempt.max(0) as u32,
        context,
        artifact_id: row.artifact_id,
        idempotency_key: row.idempotency_key,
        error: row.error,
        result: row.result,
    })
}
