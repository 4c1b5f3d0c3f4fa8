pub mod error;
pub mod guillotine;
pub mod maxrects;
pub mod packer;
pub mod shelf;
pub mod types;

pub use error::PackError;
pub use packer::pack;
pub use types::{Algorithm, PackResult, PackablePanel, PackerConfig, PlacedPanel, SheetLayout};
