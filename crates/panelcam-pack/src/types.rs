use panelcam_core::{Point2D, Rect};
use serde::{Deserialize, Serialize};

/// Nesting configuration. `gap_mm` is the kerf plus clearance the cutting
/// tool needs between two adjacent parts.
#[derive(Debug, Clone)]
pub struct PackerConfig {
    pub sheet_width_mm: f64,
    pub sheet_length_mm: f64,
    pub gap_mm: f64,
    pub edge_margin_mm: f64,
    pub allow_rotation: bool,
}

/// A panel ready to be placed on a sheet. Distinct from `panelcam_calc::Panel`:
/// the packer only cares about the rectangle and rotation eligibility.
#[derive(Debug, Clone)]
pub struct PackablePanel {
    pub id: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub can_rotate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPanel {
    pub id: String,
    pub rect: Rect,
    pub rotated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet_index: usize,
    pub sheet_rect: Rect,
    pub parts: Vec<PlacedPanel>,
    pub waste_area_mm2: f64,
    pub utilization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Guillotine,
    MaxRects,
    Shelf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackResult {
    pub sheets: Vec<SheetLayout>,
    pub unplaced: Vec<String>,
    pub sheet_count: usize,
    pub overall_utilization: f64,
    pub algorithm_used: Algorithm,
}

pub(crate) fn finalize(
    mut sheets: Vec<SheetLayout>,
    unplaced: Vec<String>,
    sheet_area_mm2: f64,
    algorithm_used: Algorithm,
) -> PackResult {
    let mut total_parts_area = 0.0;
    let mut total_sheet_area = 0.0;
    for sheet in &mut sheets {
        let parts_area: f64 = sheet.parts.iter().map(|p| p.rect.area()).sum();
        sheet.waste_area_mm2 = sheet_area_mm2 - parts_area;
        sheet.utilization = if sheet_area_mm2 > 0.0 {
            parts_area / sheet_area_mm2 * 100.0
        } else {
            0.0
        };
        total_parts_area += parts_area;
        total_sheet_area += sheet_area_mm2;
    }
    let overall_utilization = if total_sheet_area > 0.0 {
        total_parts_area / total_sheet_area * 100.0
    } else {
        0.0
    };

    PackResult {
        sheet_count: sheets.len(),
        sheets,
        unplaced,
        overall_utilization,
        algorithm_used,
    }
}

pub(crate) fn new_sheet_rect(config: &PackerConfig) -> Rect {
    Rect::new(Point2D::origin(), config.sheet_width_mm, config.sheet_length_mm)
}
