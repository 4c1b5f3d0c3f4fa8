pub mod context;
pub mod error;
pub mod handle;
pub mod pipeline;

pub use context::{PipelineContext, PipelineSettings};
pub use error::PipelineError;
pub use handle::{ArtifactDownload, JobHandle, JobView};
pub use pipeline::{
    get_artifact_download, get_job, submit_dxf, submit_drilling, submit_gcode, submit_zip, DxfOptions, GcodeOverrides, SheetSize,
};
