use panelcam_core::{JobContext, JobKind};
use uuid::Uuid;

/// The fields a caller supplies to create a job; `id`/`status`/`attempt`
/// are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub kind: JobKind,
    pub context: JobContext,
    pub idempotency_key: Option<String>,
}

impl NewJob {
    pub fn new(context: JobContext, idempotency_key: Option<String>) -> Self {
        Self { kind: context.kind(), context, idempotency_key }
    }
}

/// Row shape used by the Postgres-backed repository. `context` and `status`
/// are stored as `jsonb`/`text` respectively and converted at the crate
/// boundary rather than leaking `sqlx::FromRow` onto the shared `Job` type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct JobRow {
    pub id: Uuid,
    pub kind: String,
    pub status: String,
    pub attempt: i32,
    pub context: serde_json::Value,
    pub artifact_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
    pub error: Option<String>,
    pub result: Option<serde_json::Value>,
}
