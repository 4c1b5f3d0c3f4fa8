use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the four pipelines a job runs through; also the queue it's
/// enqueued on and the artifact kind it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    Dxf,
    Gcode,
    Drilling,
    Zip,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [JobKind::Dxf, JobKind::Gcode, JobKind::Drilling, JobKind::Zip];

    pub fn queue_name(self) -> &'static str {
        match self {
            Self::Dxf => "dxf",
            Self::Gcode => "gcode",
            Self::Drilling => "drilling",
            Self::Zip => "zip",
        }
    }
}

/// Artifact kind mirrors `JobKind` but is a distinct type: an artifact is
/// what got *produced*, a job is what got *run* — they happen to share a
/// vocabulary, not an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    Dxf,
    Gcode,
    Zip,
    Drilling,
}

impl ArtifactKind {
    pub fn storage_prefix(self) -> &'static str {
        match self {
            Self::Dxf => "dxf",
            Self::Gcode => "gcode",
            Self::Zip => "zip",
            Self::Drilling => "drilling",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Dxf => "dxf",
            Self::Gcode => "gcode",
            Self::Zip => "zip",
            // drilling output is always a zip bundle, one .nc per panel plus README.
            Self::Drilling => "zip",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Dxf => "application/dxf",
            Self::Gcode => "text/plain; charset=utf-8",
            Self::Zip => "application/zip",
            Self::Drilling => "application/zip",
        }
    }

    pub fn storage_key(self, job_id: Uuid) -> String {
        format!("{}/{}.{}", self.storage_prefix(), job_id, self.extension())
    }
}

/// Per-kind job context. Each variant carries its typed fields plus an
/// `extra` catch-all so forward-compatible fields from collaborators don't
/// need a schema migration to pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "job_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobContext {
    Dxf {
        panels: Vec<serde_json::Value>,
        sheet_width: f64,
        sheet_height: f64,
        #[serde(default)]
        optimize: bool,
        #[serde(default)]
        gap_mm: f64,
        #[serde(flatten, default)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
    Gcode {
        dxf_artifact_id: Uuid,
        machine_profile: String,
        #[serde(default)]
        spindle_speed: Option<f64>,
        #[serde(default)]
        feed_rate_cutting: Option<f64>,
        #[serde(default)]
        feed_rate_plunge: Option<f64>,
        #[serde(default)]
        cut_depth: Option<f64>,
        #[serde(default)]
        safe_height: Option<f64>,
        #[serde(default)]
        tool_diameter: Option<f64>,
        #[serde(flatten, default)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
    Drilling {
        order_id: String,
        machine_profile: String,
        output_format: DrillingOutputFormat,
        #[serde(flatten, default)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
    Zip {
        job_ids: Vec<Uuid>,
        #[serde(flatten, default)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
}

impl JobContext {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Dxf { .. } => JobKind::Dxf,
            Self::Gcode { .. } => JobKind::Gcode,
            Self::Drilling { .. } => JobKind::Drilling,
            Self::Zip { .. } => JobKind::Zip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillingOutputFormat {
    Zip,
    Single,
}

/// Job lifecycle state. Transitions are validated by `can_transition_to`
/// so the repository's compare-and-set and in-process tests share one
/// source of truth for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Created, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
                // retry: a failed-but-retryable attempt goes back through the queue
                | (JobStatus::Processing, JobStatus::Created)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub attempt: u32,
    pub context: JobContext,
    pub artifact_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
    pub error: Option<String>,
    /// Kind-specific output metadata attached alongside the artifact at
    /// completion time (packer utilization, placed/unplaced counts...).
    /// Absent until the job completes.
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub storage_key: String,
    pub size_bytes: u64,
    pub checksum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_may_move_to_processing_only() {
        assert!(JobStatus::Created.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Created.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Created.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Processing));
    }

    #[test]
    fn completed_and_failed_are_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn job_context_tag_round_trips_drilling() {
        let ctx = JobContext::Drilling {
            order_id: "ORD-1".to_string(),
            machine_profile: "weihong".to_string(),
            output_format: DrillingOutputFormat::Zip,
            extra: Default::default(),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["job_kind"], "DRILLING");
        let back: JobContext = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), JobKind::Drilling);
    }

    #[test]
    fn artifact_kind_storage_key_matches_convention() {
        let id = Uuid::nil();
        assert_eq!(ArtifactKind::Dxf.storage_key(id), format!("dxf/{id}.dxf"));
        assert_eq!(ArtifactKind::Drilling.storage_key(id), format!("drilling/{id}.zip"));
    }
}
