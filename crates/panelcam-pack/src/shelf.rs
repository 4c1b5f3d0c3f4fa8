//! Shelf-based First-Fit-Decreasing-Height packer. The naive fallback: fast,
//! predictable, and good enough when the guillotine/max-rects candidates
//! don't clearly win.

use panelcam_core::{Point2D, Rect};

use crate::types::{new_sheet_rect, Algorithm, PackResult, PackablePanel, PackerConfig, PlacedPanel, SheetLayout};

struct Shelf {
    y: f64,
    height: f64,
    x_cursor: f64,
}

pub fn pack_shelf(parts: &[PackablePanel], config: &PackerConfig) -> PackResult {
    let usable_w = config.sheet_width_mm - 2.0 * config.edge_margin_mm;
    let usable_h = config.sheet_length_mm - 2.0 * config.edge_margin_mm;

    let mut sorted: Vec<&PackablePanel> = parts.iter().collect();
    sorted.sort_by(|a, b| {
        b.height_mm
            .partial_cmp(&a.height_mm)
            .unwrap()
            .then(b.width_mm.partial_cmp(&a.width_mm).unwrap())
    });

    let mut sheets: Vec<SheetLayout> = Vec::new();
    let mut sheet_shelves: Vec<Vec<Shelf>> = Vec::new();
    let mut unplaced = Vec::new();

    for part in sorted {
        let (w, h, rotated) = best_orientation(
            part.width_mm,
            part.height_mm,
            usable_w,
            usable_h,
            part.can_rotate && config.allow_rotation,
        );

        if w > usable_w || h > usable_h {
            unplaced.push(part.id.clone());
            continue;
        }

        let mut placed = false;
        for (idx, shelves) in sheet_shelves.iter_mut().enumerate() {
            if let Some(pos) = try_place(shelves, w, h, usable_w, usable_h, config.gap_mm) {
                push_part(&mut sheets[idx], part.id.clone(), pos, w, h, rotated, config);
                placed = true;
                break;
            }
        }

        if !placed {
            let mut shelves = Vec::new();
            if let Some(pos) = try_place(&mut shelves, w, h, usable_w, usable_h, config.gap_mm) {
                let sheet_index = sheets.len();
                sheets.push(SheetLayout {
                    sheet_index,
                    sheet_rect: new_sheet_rect(config),
                    parts: Vec::new(),
                    waste_area_mm2: 0.0,
                    utilization: 0.0,
                });
                sheet_shelves.push(shelves);
                push_part(&mut sheets[sheet_index], part.id.clone(), pos, w, h, rotated, config);
            } else {
                unplaced.push(part.id.clone());
            }
        }
    }

    let sheet_area = config.sheet_width_mm * config.sheet_length_mm;
    crate::types::finalize(sheets, unplaced, sheet_area, Algorithm::Shelf)
}

fn push_part(
    sheet: &mut SheetLayout,
    id: String,
    pos: Point2D,
    w: f64,
    h: f64,
    rotated: bool,
    config: &PackerConfig,
) {
    let rect = Rect::new(
        Point2D::new(config.edge_margin_mm + pos.x, config.edge_margin_mm + pos.y),
        w,
        h,
    );
    sheet.parts.push(PlacedPanel { id, rect, rotated });
}

fn best_orientation(w: f64, h: f64, usable_w: f64, usable_h: f64, can_rotate: bool) -> (f64, f64, bool) {
    if w <= usable_w && h <= usable_h {
        return (w, h, false);
    }
    if can_rotate && h <= usable_w && w <= usable_h {
        return (h, w, true);
    }
    (w, h, false)
}

fn try_place(shelves: &mut Vec<Shelf>, w: f64, h: f64, usable_w: f64, usable_h: f64, gap: f64) -> Option<Point2D> {
    for shelf in shelves.iter_mut() {
        if h <= shelf.height && shelf.x_cursor + w <= usable_w {
            let pos = Point2D::new(shelf.x_cursor, shelf.y);
            shelf.x_cursor += w + gap;
            return Some(pos);
        }
    }

    let y = shelves.last().map(|s| s.y + s.height + gap).unwrap_or(0.0);
    if y + h <= usable_h {
        let pos = Point2D::new(0.0, y);
        shelves.push(Shelf { y, height: h, x_cursor: w + gap });
        return Some(pos);
    }
    None
}
