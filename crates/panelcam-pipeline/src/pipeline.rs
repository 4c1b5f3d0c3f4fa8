use panelcam_core::{ArtifactKind, Job, JobContext, JobKind};
use panelcam_queue::ensure_idempotency_key;
use panelcam_repo::{NewJob, RepoError};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::handle::{ArtifactDownload, JobHandle, JobView};

/// Sheet dimensions a DXF job packs panels onto.
#[derive(Debug, Clone, Copy)]
pub struct SheetSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DxfOptions {
    pub optimize: bool,
    pub gap_mm: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GcodeOverrides {
    pub spindle_speed: Option<f64>,
    pub feed_rate_cutting: Option<f64>,
    pub feed_rate_plunge: Option<f64>,
    pub cut_depth: Option<f64>,
    pub safe_height: Option<f64>,
    pub tool_diameter: Option<f64>,
}

/// Create the job record, enqueue it, and return its handle — or, if
/// `idempotency_key` already names an existing job, return that job
/// unchanged without touching the queue.
async fn submit(ctx: &PipelineContext, context: JobContext, idempotency_key: Option<String>) -> Result<JobHandle, PipelineError> {
    let kind = context.kind();
    let (job, freshly_created) = match ctx.repo.create(NewJob::new(context, idempotency_key.clone())).await {
        Ok(job) => (job, true),
        Err(RepoError::DuplicateIdempotencyKey) => {
            let key = idempotency_key.as_deref().expect("duplicate key error implies a key was supplied");
            let job = ctx.repo.get_by_idempotency_key(key).await?.ok_or(RepoError::DuplicateIdempotencyKey)?;
            (job, false)
        }
        Err(e) => return Err(e.into()),
    };

    if freshly_created {
        let mut payload = json!({ "job_id": job.id });
        if let Some(key) = &job.idempotency_key {
            payload["idempotency_key"] = Value::String(key.clone());
        }
        ensure_idempotency_key(&mut payload);
        ctx.queue.enqueue(kind, payload).await?;
    }

    Ok((&job).into())
}

pub async fn submit_dxf(
    ctx: &PipelineContext,
    panels: Vec<Value>,
    sheet: SheetSize,
    options: DxfOptions,
    idempotency_key: Option<String>,
) -> Result<JobHandle, PipelineError> {
    let context = JobContext::Dxf {
        panels,
        sheet_width: sheet.width_mm,
        sheet_height: sheet.height_mm,
        optimize: options.optimize,
        gap_mm: options.gap_mm,
        extra: Default::default(),
    };
    submit(ctx, context, idempotency_key).await
}

pub async fn submit_gcode(
    ctx: &PipelineContext,
    dxf_artifact_id: Uuid,
    machine_profile: String,
    overrides: GcodeOverrides,
    idempotency_key: Option<String>,
) -> Result<JobHandle, PipelineError> {
    let context = JobContext::Gcode {
        dxf_artifact_id,
        machine_profile,
        spindle_speed: overrides.spindle_speed,
        feed_rate_cutting: overrides.feed_rate_cutting,
        feed_rate_plunge: overrides.feed_rate_plunge,
        cut_depth: overrides.cut_depth,
        safe_height: overrides.safe_height,
        tool_diameter: overrides.tool_diameter,
        extra: Default::default(),
    };
    submit(ctx, context, idempotency_key).await
}

pub async fn submit_drilling(
    ctx: &PipelineContext,
    order_id: String,
    machine_profile: String,
    idempotency_key: Option<String>,
) -> Result<JobHandle, PipelineError> {
    let context = JobContext::Drilling {
        order_id,
        machine_profile,
        output_format: panelcam_core::DrillingOutputFormat::Zip,
        extra: Default::default(),
    };
    submit(ctx, context, idempotency_key).await
}

pub async fn submit_zip(
    ctx: &PipelineContext,
    job_ids: Vec<Uuid>,
    idempotency_key: Option<String>,
) -> Result<JobHandle, PipelineError> {
    let context = JobContext::Zip { job_ids, extra: Default::default() };
    submit(ctx, context, idempotency_key).await
}

pub async fn get_job(ctx: &PipelineContext, job_id: Uuid) -> Result<JobView, PipelineError> {
    let job: Job = ctx.repo.get_by_id(job_id).await.map_err(|e| match e {
        RepoError::NotFound(id) => PipelineError::JobNotFound(id),
        other => other.into(),
    })?;
    Ok(job.into())
}

pub async fn get_artifact_download(
    ctx: &PipelineContext,
    job_id: Uuid,
    ttl: Option<std::time::Duration>,
) -> Result<ArtifactDownload, PipelineError> {
    let job = ctx.repo.get_by_id(job_id).await.map_err(|e| match e {
        RepoError::NotFound(id) => PipelineError::JobNotFound(id),
        other => other.into(),
    })?;
    let _artifact_id = job.artifact_id.ok_or(PipelineError::ArtifactNotReady(job_id))?;

    let artifact_kind = match job.kind {
        JobKind::Dxf => ArtifactKind::Dxf,
        JobKind::Gcode => ArtifactKind::Gcode,
        JobKind::Drilling => ArtifactKind::Drilling,
        JobKind::Zip => ArtifactKind::Zip,
    };
    let key = artifact_kind.storage_key(job_id);
    let ttl = ttl.unwrap_or(std::time::Duration::from_secs(ctx.settings.default_presign_ttl_secs));

    let url = ctx.store.presign_get(&key, ttl).await?;
    let size = ctx.store.stat(&key).await?;
    let filename = format!("{job_id}.{}", artifact_kind.extension());

    Ok(ArtifactDownload { url, filename, size, expires_in: ttl.as_secs() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use panelcam_queue::InMemoryQueue;
    use panelcam_repo::InMemoryRepository;
    use panelcam_store::InMemoryStore;

    use super::*;
    use crate::context::PipelineSettings;

    fn test_context() -> PipelineContext {
        PipelineContext::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryQueue::new()),
            Arc::new(InMemoryStore::new()),
            PipelineSettings::default(),
        )
    }

    #[tokio::test]
    async fn submit_dxf_creates_and_enqueues() {
        let ctx = test_context();
        let handle = submit_dxf(
            &ctx,
            vec![json!({"width": 600.0, "height": 720.0})],
            SheetSize { width_mm: 2800.0, height_mm: 2070.0 },
            DxfOptions { optimize: true, gap_mm: 5.0 },
            None,
        )
        .await
        .unwrap();
        assert_eq!(handle.kind, JobKind::Dxf);

        let view = get_job(&ctx, handle.job_id).await.unwrap();
        assert_eq!(view.status, panelcam_core::JobStatus::Created);
    }

    #[tokio::test]
    async fn repeated_idempotency_key_returns_same_job() {
        let ctx = test_context();
        let key = "order-123".to_string();
        let first = submit_zip(&ctx, vec![Uuid::new_v4()], Some(key.clone())).await.unwrap();
        let second = submit_zip(&ctx, vec![Uuid::new_v4()], Some(key)).await.unwrap();
        assert_eq!(first.job_id, second.job_id);
    }

    #[tokio::test]
    async fn get_job_on_unknown_id_is_not_found() {
        let ctx = test_context();
        let err = get_job(&ctx, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PipelineError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn get_artifact_download_before_completion_errors() {
        let ctx = test_context();
        let handle = submit_zip(&ctx, vec![Uuid::new_v4()], None).await.unwrap();
        let err = get_artifact_download(&ctx, handle.job_id, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotReady(_)));
    }

    #[tokio::test]
    async fn get_artifact_download_after_completion_presigns() {
        let ctx = test_context();
        let handle = submit_zip(&ctx, vec![Uuid::new_v4()], None).await.unwrap();
        let key = ArtifactKind::Zip.storage_key(handle.job_id);
        ctx.store.put(&key, b"bundle".to_vec(), "application/zip").await.unwrap();
        ctx.repo
            .update_status(handle.job_id, panelcam_core::JobStatus::Created, panelcam_core::JobStatus::Processing, None)
            .await
            .unwrap();
        ctx.repo
            .update_status(handle.job_id, panelcam_core::JobStatus::Processing, panelcam_core::JobStatus::Completed, None)
            .await
            .unwrap();
        ctx.repo.attach_artifact(handle.job_id, Uuid::new_v4(), None).await.unwrap();

        let download = get_artifact_download(&ctx, handle.job_id, None).await.unwrap();
        assert_eq!(download.size, 6);
        assert_eq!(download.expires_in, 900);
    }
}
