pub mod calculator;
pub mod error;
pub mod panel;
pub mod spec;

pub use calculator::generate_panels;
pub use error::CalcError;
pub use panel::{DrillPoint, DrillSide, Panel};
pub use spec::{CabinetSpec, CabinetType};
