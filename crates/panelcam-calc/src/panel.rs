use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillSide {
    Face,
    Edge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillPoint {
    pub x_mm: f64,
    pub y_mm: f64,
    pub diameter_mm: f64,
    pub depth_mm: f64,
    pub side: DrillSide,
    pub hardware_type: String,
}

/// A single cut piece, ready for packing. Edge-band flags are per-side on
/// the panel's own width/height rectangle, not yet placed on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    pub material: String,
    #[serde(default)]
    pub edge_front: bool,
    #[serde(default)]
    pub edge_back: bool,
    #[serde(default)]
    pub edge_top: bool,
    #[serde(default)]
    pub edge_bottom: bool,
    #[serde(default)]
    pub edge_thickness_mm: f64,
    #[serde(default)]
    pub drilling_points: Vec<DrillPoint>,
    #[serde(default)]
    pub notes: String,
}

impl Panel {
    pub fn area_m2(&self) -> f64 {
        (self.width_mm * self.height_mm) / 1_000_000.0
    }
}
