pub mod error;
pub mod layers;
pub mod writer;

pub use error::DxfError;
pub use writer::{write_part_dxf, write_sheet_dxf};
