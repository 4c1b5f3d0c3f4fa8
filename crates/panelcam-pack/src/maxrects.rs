//! Max-Rects packer (Best Short Side Fit variant): free rectangles are
//! allowed to overlap, which keeps more placement options open than
//! guillotine at the cost of a pruning pass after every placement.

use panelcam_core::{Point2D, Rect};

use crate::types::{new_sheet_rect, Algorithm, PackResult, PackablePanel, PackerConfig, PlacedPanel, SheetLayout};

#[derive(Debug, Clone, Copy)]
struct FreeRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl FreeRect {
    fn contains(&self, other: &FreeRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }

    fn intersects(&self, other: &FreeRect) -> bool {
        self.x < other.x + other.w && self.x + self.w > other.x && self.y < other.y + other.h && self.y + self.h > other.y
    }
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

pub fn pack_maxrects(parts: &[PackablePanel], config: &PackerConfig) -> PackResult {
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
                place_and_prune(free, &c, config.gap_mm);
                push_part(&mut sheets[idx], part, &c);
                placed = true;
                break;
            }
        }

        if !placed {
            let mut free = vec![FreeRect { x: 0.0, y: 0.0, w: usable_w, h: usable_h }];
            if let Some(c) = best_fit(&free, part, config.allow_rotation) {
                place_and_prune(&mut free, &c, config.gap_mm);
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
    crate::types::finalize(sheets, unplaced, sheet_area, Algorithm::MaxRects)
}

fn best_fit(free: &[FreeRect], part: &PackablePanel, allow_rotation: bool) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (idx, f) in free.iter().enumerate() {
        for (w, h, rotated) in orientations(part, allow_rotation) {
            if w <= f.w && h <= f.h {
                let short_side_leftover = (f.w - w).min(f.h - h);
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

/// Split every free rect that intersects the placed rect into up to four
/// leftover rects, then prune any rect fully contained in another.
fn place_and_prune(free: &mut Vec<FreeRect>, c: &Candidate, gap: f64) {
    let placed = FreeRect { x: c.x, y: c.y, w: c.w + gap, h: c.h + gap };

    let mut next = Vec::with_capacity(free.len());
    for f in free.drain(..) {
        if !f.intersects(&placed) {
            next.push(f);
            continue;
        }

        if placed.x > f.x {
            next.push(FreeRect { x: f.x, y: f.y, w: placed.x - f.x, h: f.h });
        }
        if placed.x + placed.w < f.x + f.w {
            next.push(FreeRect {
                x: placed.x + placed.w,
                y: f.y,
                w: f.x + f.w - (placed.x + placed.w),
                h: f.h,
            });
        }
        if placed.y > f.y {
            next.push(FreeRect { x: f.x, y: f.y, w: f.w, h: placed.y - f.y });
        }
        if placed.y + placed.h < f.y + f.h {
            next.push(FreeRect {
                x: f.x,
                y: placed.y + placed.h,
                w: f.w,
                h: f.y + f.h - (placed.y + placed.h),
            });
        }
    }

    next.retain(|r| r.w > 1e-6 && r.h > 1e-6);

    let mut pruned: Vec<FreeRect> = Vec::with_capacity(next.len());
    for (i, r) in next.iter().enumerate() {
        let contained = next.iter().enumerate().any(|(j, other)| {
            i != j && other.contains(r) && !(r.contains(other) && i < j)
        });
        if !contained {
            pruned.push(*r);
        }
    }

    *free = pruned;
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
            allow_rotation: true,
        }
    }

    #[test]
    fn multiple_parts_placed_on_one_sheet_without_overlap() {
        let parts = vec![
            PackablePanel { id: "a".into(), width_mm: 600.0, height_mm: 400.0, can_rotate: false },
            PackablePanel { id: "b".into(), width_mm: 600.0, height_mm: 400.0, can_rotate: false },
            PackablePanel { id: "c".into(), width_mm: 900.0, height_mm: 300.0, can_rotate: true },
        ];
        let result = pack_maxrects(&parts, &config());
        assert!(result.unplaced.is_empty());
        for sheet in &result.sheets {
            for i in 0..sheet.parts.len() {
                for j in (i + 1)..sheet.parts.len() {
                    assert!(!sheet.parts[i].rect.overlaps(&sheet.parts[j].rect, 0.0));
                }
            }
        }
    }

    #[test]
    fn rotation_allows_otherwise_unplaceable_part() {
        let parts = vec![PackablePanel { id: "long".into(), width_mm: 2070.0, height_mm: 500.0, can_rotate: true }];
        let config = PackerConfig {
            sheet_width_mm: 600.0,
            sheet_length_mm: 2100.0,
            gap_mm: 0.0,
            edge_margin_mm: 0.0,
            allow_rotation: true,
        };
        let result = pack_maxrects(&parts, &config);
        assert_eq!(result.sheet_count, 1);
        assert!(result.sheets[0].parts[0].rotated);
    }
}
