use panelcam_calc::{DrillPoint, Panel};
use panelcam_core::Point2D;
use serde::{Deserialize, Serialize};

/// Sidecar stored alongside every DXF artifact (`<dxf-key>.manifest.json`)
/// so a later `GCODE`/`DRILLING` job can recover per-panel placement and
/// drilling data without re-parsing the DXF drawing itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub name: String,
    pub origin: Point2D,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    pub rotated: bool,
    pub drilling_points: Vec<DrillPoint>,
}

impl PanelPlacement {
    pub fn from_panel_and_rect(panel: &Panel, rect: panelcam_core::Rect, rotated: bool) -> Self {
        Self {
            name: panel.name.clone(),
            origin: rect.origin,
            width_mm: rect.width,
            height_mm: rect.height,
            thickness_mm: panel.thickness_mm,
            rotated,
            drilling_points: panel.drilling_points.clone(),
        }
    }

    /// Reconstruct a minimal `Panel` good enough for `GCodeEmitter`'s
    /// per-panel drilling mode — the fields it doesn't touch are left blank.
    pub fn as_panel(&self) -> Panel {
        Panel {
            name: self.name.clone(),
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            thickness_mm: self.thickness_mm,
            material: String::new(),
            edge_front: false,
            edge_back: false,
            edge_top: false,
            edge_bottom: false,
            edge_thickness_mm: 0.0,
            drilling_points: self.drilling_points.clone(),
            notes: String::new(),
        }
    }
}

pub fn manifest_key(dxf_key: &str) -> String {
    format!("{dxf_key}.manifest.json")
}
