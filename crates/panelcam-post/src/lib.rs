pub mod emitter;
pub mod error;
pub mod machine;
pub mod toolpath;
pub mod translit;

pub use emitter::GCodeEmitter;
pub use error::PostError;
pub use machine::{DialectCodes, DwellUnit, MachineDialect, MachineProfile};
pub use toolpath::{cut_path_from_contour, Motion, Toolpath, ToolpathSegment};
pub use translit::transliterate;
