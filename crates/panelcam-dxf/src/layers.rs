/// Layer names used by the DXF writer. Every emitted drawing carries all
/// five, even if a given job produces no entities on one of them.
pub const CONTOUR: &str = "CONTOUR";
pub const EDGE: &str = "EDGE";
pub const DRILLING: &str = "DRILLING";
pub const TEXT: &str = "TEXT";
pub const SHEET: &str = "SHEET";

pub const ALL: [&str; 5] = [CONTOUR, EDGE, DRILLING, TEXT, SHEET];
