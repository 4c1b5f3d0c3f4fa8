use panelcam_core::{Job, JobKind, JobStatus};
use serde::Serialize;
use uuid::Uuid;

/// What `submit_*` hands back to the gateway: enough to poll `get_job`
/// without exposing repository internals.
#[derive(Debug, Clone, Serialize)]
pub struct JobHandle {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
}

impl From<&Job> for JobHandle {
    fn from(job: &Job) -> Self {
        Self { job_id: job.id, kind: job.kind, status: job.status }
    }
}

/// `get_job` response. `utilization`/`placed`/`unplaced` only ever appear
/// on completed `DXF` jobs, carried over from the packer's result blob.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub attempt: u32,
    pub artifact_id: Option<Uuid>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unplaced: Option<u32>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let utilization = job.result.as_ref().and_then(|r| r.get("utilization")).and_then(|v| v.as_f64());
        let placed = job.result.as_ref().and_then(|r| r.get("placed")).and_then(|v| v.as_u64()).map(|v| v as u32);
        let unplaced = job.result.as_ref().and_then(|r| r.get("unplaced")).and_then(|v| v.as_u64()).map(|v| v as u32);
        Self {
            job_id: job.id,
            kind: job.kind,
            status: job.status,
            attempt: job.attempt,
            artifact_id: job.artifact_id,
            error: job.error,
            utilization,
            placed,
            unplaced,
        }
    }
}

/// `get_artifact_download` response.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactDownload {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub expires_in: u64,
}
