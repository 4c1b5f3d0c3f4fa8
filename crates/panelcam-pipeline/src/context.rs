use std::sync::Arc;

use panelcam_core::{EffectiveSettings, FactorySettings};
use panelcam_queue::JobQueue;
use panelcam_repo::JobRepository;
use panelcam_store::ArtifactStore;

/// Effective settings that every dispatch branch needs but that don't
/// belong to any one collaborator: retry policy and presign defaults.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub default_presign_ttl_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { max_retries: 3, backoff_factor: 2.0, default_presign_ttl_secs: 900 }
    }
}

/// Dependency-injection handle threaded by reference through
/// `panelcam-pipeline` and `panelcam-worker`. Constructed once in
/// `panelcam-cli`'s `main()`; never a process-wide singleton.
pub struct PipelineContext {
    pub repo: Arc<dyn JobRepository>,
    pub queue: Arc<dyn JobQueue>,
    pub store: Arc<dyn ArtifactStore>,
    pub settings: PipelineSettings,
    /// Tenant-level overrides and the built-in default table, both resolved
    /// against per-job request overrides by `panelcam_core::settings::merge`.
    pub factory: FactorySettings,
    pub defaults: EffectiveSettings,
}

impl PipelineContext {
    pub fn new(
        repo: Arc<dyn JobRepository>,
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ArtifactStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self { repo, queue, store, settings, factory: FactorySettings::default(), defaults: EffectiveSettings::default() }
    }

    pub fn with_factory_settings(mut self, factory: FactorySettings) -> Self {
        self.factory = factory;
        self
    }
}
