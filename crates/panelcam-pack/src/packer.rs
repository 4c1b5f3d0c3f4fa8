//! Packer (C3): runs all three nesting strategies and keeps the best
//! result — fewest unplaced parts first, then fewest sheets, then highest
//! utilization.

use crate::error::PackError;
use crate::guillotine::pack_guillotine;
use crate::maxrects::pack_maxrects;
use crate::shelf::pack_shelf;
use crate::types::{PackResult, PackablePanel, PackerConfig};

pub fn pack(parts: &[PackablePanel], config: &PackerConfig) -> Result<PackResult, PackError> {
    if config.sheet_width_mm <= 0.0 || config.sheet_length_mm <= 0.0 {
        return Err(PackError::InvalidConfig("sheet dimensions must be positive".into()));
    }
    if config.gap_mm < 0.0 {
        return Err(PackError::InvalidConfig("gap_mm must not be negative".into()));
    }

    let candidates = [
        pack_guillotine(parts, config),
        pack_maxrects(parts, config),
        pack_shelf(parts, config),
    ];

    let best = candidates
        .into_iter()
        .min_by(|a, b| {
            a.unplaced
                .len()
                .cmp(&b.unplaced.len())
                .then(a.sheet_count.cmp(&b.sheet_count))
                .then(b.overall_utilization.partial_cmp(&a.overall_utilization).unwrap())
        })
        .expect("three candidates always produced");

    Ok(best)
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
    fn picks_a_candidate_that_places_everything_when_possible() {
        let parts = vec![
            PackablePanel { id: "side_l".into(), width_mm: 284.0, height_mm: 720.0, can_rotate: false },
            PackablePanel { id: "side_r".into(), width_mm: 284.0, height_mm: 720.0, can_rotate: false },
            PackablePanel { id: "top".into(), width_mm: 568.0, height_mm: 284.0, can_rotate: false },
            PackablePanel { id: "bottom".into(), width_mm: 568.0, height_mm: 284.0, can_rotate: false },
        ];
        let result = pack(&parts, &config()).unwrap();
        assert!(result.unplaced.is_empty());
        assert_eq!(result.sheet_count, 1);
    }

    #[test]
    fn rejects_non_positive_sheet_dimensions() {
        let parts: Vec<PackablePanel> = Vec::new();
        let bad = PackerConfig { sheet_width_mm: 0.0, ..config() };
        assert!(pack(&parts, &bad).is_err());
    }

    #[test]
    fn oversized_part_is_reported_unplaced_not_an_error() {
        let parts = vec![PackablePanel { id: "huge".into(), width_mm: 9000.0, height_mm: 9000.0, can_rotate: false }];
        let result = pack(&parts, &config()).unwrap();
        assert_eq!(result.unplaced, vec!["huge".to_string()]);
    }
}
