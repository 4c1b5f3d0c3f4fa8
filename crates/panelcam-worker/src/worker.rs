use std::time::Duration;

use panelcam_core::{Classify, JobKind, JobStatus};
use panelcam_pipeline::PipelineContext;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::dispatch::{dispatch, store_output};

/// How long the blocking multi-queue pop waits before looping again to
/// check the cancellation token.
const POP_TIMEOUT: Duration = Duration::from_secs(5);

/// Ceiling on one dispatch call's wall-clock time. Timing out is treated
/// the same as any other `Transient` failure.
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(300);

const MAX_RETRIES: u32 = 3;
const BACKOFF_FACTOR: f64 = 2.0;

const ALL_QUEUES: [JobKind; 4] = JobKind::ALL;

/// Runs the consumer loop until `shutdown` is cancelled. In-flight jobs are
/// allowed to finish; the pop loop does not preempt a dispatch mid-flight.
pub async fn run(ctx: &PipelineContext, shutdown: CancellationToken) {
    loop {
        if shutdown.is_cancelled() {
            tracing::info!("shutdown signal received, worker loop exiting");
            return;
        }

        let popped = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown signal received while idle, worker loop exiting");
                return;
            }
            popped = ctx.queue.dequeue(&ALL_QUEUES, POP_TIMEOUT) => popped,
        };

        let (queue, payload) = match popped {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "queue dequeue failed, backing off briefly");
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        process_one(ctx, queue, payload).await;
    }
}

async fn process_one(ctx: &PipelineContext, queue: JobKind, payload: Value) {
    let job_id = match payload.get("job_id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok()) {
        Some(id) => id,
        None => {
            tracing::error!(?payload, "payload missing a valid job_id, routing to DLQ");
            let _ = ctx
                .queue
                .dead_letter(queue, "missing or invalid job_id".to_string(), payload, String::new())
                .await;
            return;
        }
    };

    let span = tracing::info_span!("job", job_id = %job_id, kind = ?queue, attempt = tracing::field::Empty);
    process_job(ctx, queue, job_id, payload).instrument(span).await;
}

async fn process_job(ctx: &PipelineContext, queue: JobKind, job_id: Uuid, payload: Value) {
    let job = match ctx.repo.get_by_id(job_id).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(error = %e, "job record not found for popped payload, routing to DLQ");
            let _ = ctx.queue.dead_letter(queue, e.to_string(), payload, String::new()).await;
            return;
        }
    };

    if job.status.is_terminal() {
        tracing::debug!(status = ?job.status, "job already in a terminal state, skipping (idempotent replay)");
        return;
    }

    tracing::Span::current().record("attempt", job.attempt);

    let job = match ctx.repo.update_status(job_id, JobStatus::Created, JobStatus::Processing, None).await {
        Ok(job) => job,
        Err(e) => {
            tracing::debug!(error = %e, "lost the race to claim this job, another worker owns it");
            return;
        }
    };

    let outcome = tokio::time::timeout(DEFAULT_JOB_TIMEOUT, dispatch(ctx, &job)).await;

    match outcome {
        Ok(Ok(output)) => match store_output(ctx, &job, output).await {
            Ok(artifact_id) => {
                if let Err(e) = ctx.repo.update_status(job_id, JobStatus::Processing, JobStatus::Completed, None).await {
                    tracing::error!(error = %e, "job dispatch succeeded but completion transition failed");
                }
                tracing::info!(%artifact_id, "job completed");
            }
            Err(e) => fail_job(ctx, queue, job_id, job.attempt, payload, e.to_string(), e.class().retryable()).await,
        },
        Ok(Err(e)) => {
            let retryable = e.class().retryable();
            fail_job(ctx, queue, job_id, job.attempt, payload, e.to_string(), retryable).await;
        }
        Err(_) => {
            tracing::warn!(timeout_secs = DEFAULT_JOB_TIMEOUT.as_secs(), "job dispatch timed out");
            fail_job(ctx, queue, job_id, job.attempt, payload, "dispatch timed out".to_string(), true).await;
        }
    }
}

async fn fail_job(ctx: &PipelineContext, queue: JobKind, job_id: Uuid, attempt: u32, payload: Value, error: String, retryable: bool) {
    tracing::warn!(%error, retryable, "job dispatch failed");

    if retryable && attempt < MAX_RETRIES {
        let delay = Duration::from_secs_f64(BACKOFF_FACTOR.powi(attempt as i32));
        tokio::time::sleep(delay).await;

        match ctx.repo.update_status(job_id, JobStatus::Processing, JobStatus::Created, Some(error.clone())).await {
            Ok(_) => {
                if let Err(e) = ctx.queue.enqueue(queue, payload).await {
                    tracing::error!(error = %e, "failed to re-enqueue job after marking it retryable");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to transition job back to Created for retry"),
        }
        return;
    }

    if let Err(e) = ctx.queue.dead_letter(queue, error.clone(), payload, String::new()).await {
        tracing::error!(error = %e, "failed to push exhausted job to the dead-letter queue");
    }
    if let Err(e) = ctx.repo.update_status(job_id, JobStatus::Processing, JobStatus::Failed, Some(error)).await {
        tracing::error!(error = %e, "failed to transition exhausted job to Failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use panelcam_core::{JobContext, JobKind};
    use panelcam_pipeline::PipelineSettings;
    use panelcam_queue::InMemoryQueue;
    use panelcam_repo::{InMemoryRepository, NewJob};
    use panelcam_store::InMemoryStore;

    use super::*;

    fn test_context() -> PipelineContext {
        PipelineContext::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryQueue::new()),
            Arc::new(InMemoryStore::new()),
            PipelineSettings::default(),
        )
    }

    #[tokio::test]
    async fn zip_job_with_missing_dependency_fails_without_retry() {
        // DependencyMissing is not a retryable class, so this should go
        // straight to Failed + DLQ rather than back to Created.
        let ctx = test_context();
        let job = ctx.repo.create(NewJob::new(JobContext::Zip { job_ids: vec![Uuid::new_v4()], extra: Default::default() }, None)).await.unwrap();

        process_job(&ctx, JobKind::Zip, job.id, serde_json::json!({"job_id": job.id})).await;

        let updated = ctx.repo.get_by_id(job.id).await.unwrap();
        assert_eq!(updated.status, JobStatus::Failed);
        assert!(updated.error.is_some());
    }

    #[tokio::test]
    async fn payload_without_job_id_goes_to_dlq() {
        let ctx = test_context();
        process_one(&ctx, JobKind::Dxf, serde_json::json!({"nope": true})).await;
    }

    #[tokio::test]
    async fn already_terminal_job_is_skipped() {
        let ctx = test_context();
        let job = ctx.repo.create(NewJob::new(JobContext::Zip { job_ids: vec![], extra: Default::default() }, None)).await.unwrap();
        ctx.repo.update_status(job.id, JobStatus::Created, JobStatus::Processing, None).await.unwrap();
        ctx.repo.update_status(job.id, JobStatus::Processing, JobStatus::Completed, None).await.unwrap();

        process_job(&ctx, JobKind::Zip, job.id, serde_json::json!({"job_id": job.id})).await;

        let updated = ctx.repo.get_by_id(job.id).await.unwrap();
        assert_eq!(updated.status, JobStatus::Completed);
    }
}
