pub mod error;
pub mod keys;
pub mod memory;
pub mod s3;
pub mod store;

pub use error::StoreError;
pub use keys::artifact_key;
pub use memory::InMemoryStore;
pub use panelcam_core::ArtifactKind;
pub use s3::{S3ArtifactStore, S3Config};
pub use store::{ArtifactStore, DEFAULT_PRESIGN_TTL};
