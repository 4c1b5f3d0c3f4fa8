use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinetType {
    Wall,
    Base,
    BaseSink,
    Drawer,
    Tall,
}

/// Input to the Panel Calculator: the carcass dimensions and counts a
/// customer picks in the configurator, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetSpec {
    #[serde(rename = "type")]
    pub cabinet_type: CabinetType,
    pub width_mm: f64,
    pub height_mm: f64,
    pub depth_mm: f64,
    pub thickness_mm: f64,
    #[serde(default)]
    pub shelf_count: u32,
    #[serde(default)]
    pub door_count: u32,
    #[serde(default)]
    pub drawer_count: u32,
}
