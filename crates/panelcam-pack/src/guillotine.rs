//! Guillotine packer: every placement splits its free rectangle into at
//! most two new ones with a straight cut, so free rectangles never overlap.
//! Candidate placement is Best Short Side Fit (BSSF); the cut axis is chosen
//! to avoid leaving a sliver (split-area-selection).

use panelcam_core::{Point2D, Rect};

use crate::types::{new_sheet_rect, Algorithm, PackResult, PackablePanel, PackerConfig, PlacedPanel, SheetLayout};

#[derive(Debug, Clone, Copy)]
struct FreeRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

struct Candidate {
    free_idx: usize,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    rotated: bool,
    short_side_leftover: f64,
}

pub fn pack_guillotine(parts: &[PackablePanel], config: &PackerConfig) -> PackResult {
    let usable_w = config.sheet_width_mm - 2.0 * config.edge_margin_mm;
    let usable_h = config.sheet_length_mm - 2.0 * config.edge_margin_mm;

    let mut sorted: Vec<&PackablePanel> = parts.iter().collect();
    sorted.sort_by(|a, b| (b.width_mm * b.height_mm).partial_cmp(&(a.width_mm * a.height_mm)).unwrap());

    let mut sheets: Vec<SheetLayout> = Vec::new();
    let mut sheet_free: Vec<Vec<FreeRect>> = Vec::new();
    let mut unplaced = Vec::new();

    for part in sorted {
        if part.width_mm.max(part.height_mm) > usable_w.max(usable_h) {
            unplaced.push(part.id.clone());
            continue;
        }

        let mut placed = false;
        for (idx, free) in sheet_free.iter_mut().enumerate() {
            if let Some(c) = best_fit(free, part, config.allow_rotation) {
                place_and_split(free, &c, config.gap_mm);
                push_part(&mut sheets[idx], part, &c);
                placed = true;
                break;
            }
        }

        if !placed {
            let mut free = vec![FreeRect { x: 0.0, y: 0.0, w: usable_w, h: usable_h }];
            if let Some(c) = best_fit(&free, part, config.allow_rotation) {
                place_and_split(&mut free, &c, config.gap_mm);
                let sheet_index = sheets.len();
                sheets.push(SheetLayout {
                    sheet_index,
                    sheet_rect: new_sheet_rect(config),
                    parts: Vec::new(),
                    waste_area_mm2: 0.0,
                    utilization: 0.0,
                });
                sheet_free.push(free);
                push_part(&mut sheets[sheet_index], part, &c);
            } else {
                unplaced.push(part.id.clone());
            }
        }
    }

    let sheet_area = config.sheet_width_mm * config.sheet_length_mm;
    crate::types::finalize(sheets, unplaced, sheet_area, Algorithm::Guillotine)
}

fn best_fit(free: &[FreeRect], part: &PackablePanel, allow_rotation: bool) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (idx, f) in free.iter().enumerate() {
        for (w, h, rotated) in orientations(part, allow_rotation) {
            if w <= f.w && h <= f.h {
                let leftover_w = f.w - w;
                let leftover_h = f.h - h;
                let short_side_leftover = leftover_w.min(leftover_h);
                let better = match &best {
                    None => true,
                    Some(b) => short_side_leftover < b.short_side_leftover,
                };
                if better {
                    best = Some(Candidate {
                        free_idx: idx,
                        x: f.x,
                        y: f.y,
                        w,
                        h,
                        rotated,
                        short_side_leftover,
                    });
                }
            }
        }
    }
    best
}

fn orientations(part: &PackablePanel, allow_rotation: bool) -> Vec<(f64, f64, bool)> {
    let mut out = vec![(part.width_mm, part.height_mm, false)];
    if part.can_rotate && allow_rotation {
        out.push((part.height_mm, part.width_mm, true));
    }
    out
}

/// Place the candidate and replace its free rect with the guillotine split.
/// Splits along whichever axis leaves a single larger leftover rect rather
/// than two thin slivers.
fn place_and_split(free: &mut Vec<FreeRect>, c: &Candidate, gap: f64) {
    let f = free.remove(c.free_idx);
    let leftover_w = f.w - c.w - gap;
    let leftover_h = f.h - c.h - gap;

    if leftover_w < leftover_h {
        if leftover_w > 0.0 {
            free.push(FreeRect { x: f.x + c.w + gap, y: f.y, w: leftover_w, h: c.h });
        }
        if leftover_h > 0.0 {
            free.push(FreeRect { x: f.x, y: f.y + c.h + gap, w: f.w, h: leftover_h });
        }
    } else {
        if leftover_h > 0.0 {
            free.push(FreeRect { x: f.x, y: f.y + c.h + gap, w: c.w, h: leftover_h });
        }
        if leftover_w > 0.0 {
            free.push(FreeRect { x: f.x + c.w + gap, y: f.y, w: leftover_w, h: f.h });
        }
    }
}

fn push_part(sheet: &mut SheetLayout, part: &PackablePanel, c: &Candidate) {
    sheet.parts.push(PlacedPanel {
        id: part.id.clone(),
        rect: Rect::new(Point2D::new(c.x, c.y), c.w, c.h),
        rotated: c.rotated,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PackerConfig {
        PackerConfig {
            sheet_width_mm: 2800.0,
            sheet_length_mm: 2070.0,
            gap_mm: 4.0,
            edge_margin_mm: 10.0,
            allow_rotation: false,
        }
    }

    #[test]
    fn single_part_fits_on_one_sheet() {
        let parts = vec![PackablePanel { id: "a".into(), width_mm: 300.0, height_mm: 400.0, can_rotate: false }];
        let result = pack_guillotine(&parts, &config());
        assert_eq!(result.sheet_count, 1);
        assert!(result.unplaced.is_empty());
    }

    #[test]
    fn oversized_part_is_unplaced() {
        let parts = vec![PackablePanel { id: "huge".into(), width_mm: 5000.0, height_mm: 5000.0, can_rotate: false }];
        let result = pack_guillotine(&parts, &config());
        assert_eq!(result.sheet_count, 0);
        assert_eq!(result.unplaced.len(), 1);
    }

    #[test]
    fn placed_parts_never_overlap() {
        let parts = vec![
            PackablePanel { id: "a".into(), width_mm: 1000.0, height_mm: 600.0, can_rotate: false },
            PackablePanel { id: "b".into(), width_mm: 1000.0, height_mm: 600.0, can_rotate: false },
            PackablePanel { id: "c".into(), width_mm: 1500.0, height_mm: 900.0, can_rotate: false },
        ];
        let result = pack_guillotine(&parts, &config());
        for sheet in &result.sheets {
            for i in 0..sheet.parts.len() {
                for j in (i + 1)..sheet.parts.len() {
                    assert!(!sheet.parts[i].rect.overlaps(&sheet.parts[j].rect, 0.0));
                }
            }
        }
    }
}
