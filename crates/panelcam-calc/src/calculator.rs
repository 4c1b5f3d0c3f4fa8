//! Panel Calculator (C2): turns a `CabinetSpec` into a flat panel list plus
//! any warnings worth surfacing to the customer before cutting.

use panelcam_core::EffectiveSettings;

use crate::error::CalcError;
use crate::panel::{DrillPoint, DrillSide, Panel};
use crate::spec::{CabinetSpec, CabinetType};

const EDGE_BAND_THICKNESS_MM: f64 = 0.4;
const DEFAULT_MATERIAL: &str = "ЛДСП 16";
const CONFIRMAT_DEPTH_MM: f64 = 50.0;
const SYSTEM32_DIAMETER_MM: f64 = 5.0;
const SYSTEM32_DEPTH_MM: f64 = 13.0;
const SYSTEM32_ROW_PITCH_MM: f64 = 32.0;
const HDF_BACK_THICKNESS_MM: f64 = 3.0;
const TALL_WALL_MOUNT_HEIGHT_MM: f64 = 2000.0;

pub fn generate_panels(
    spec: &CabinetSpec,
    settings: &EffectiveSettings,
) -> Result<(Vec<Panel>, Vec<String>), CalcError> {
    validate(spec)?;

    let mut panels = match spec.cabinet_type {
        CabinetType::Wall => wall_panels(spec, settings),
        CabinetType::Tall => tall_panels(spec, settings),
        CabinetType::Base => base_panels(spec, settings),
        CabinetType::BaseSink => base_sink_panels(spec, settings),
        CabinetType::Drawer => drawer_panels(spec, settings),
    };

    drill_sides(&mut panels, spec, settings);

    let warnings = warnings_for(spec, settings);
    Ok((panels, warnings))
}

fn validate(spec: &CabinetSpec) -> Result<(), CalcError> {
    if spec.width_mm <= 0.0 || spec.height_mm <= 0.0 || spec.depth_mm <= 0.0 {
        return Err(CalcError::InvalidSpec("dimensions must be positive".into()));
    }
    if spec.thickness_mm <= 0.0 {
        return Err(CalcError::InvalidSpec("thickness_mm must be positive".into()));
    }
    if spec.width_mm <= 2.0 * spec.thickness_mm {
        return Err(CalcError::InvalidSpec(
            "width_mm too small for two side panels at this thickness".into(),
        ));
    }
    if spec.depth_mm <= spec.thickness_mm {
        return Err(CalcError::InvalidSpec(
            "depth_mm too small for a back rabbet at this thickness".into(),
        ));
    }
    Ok(())
}

fn inner_width(spec: &CabinetSpec) -> f64 {
    spec.width_mm - 2.0 * spec.thickness_mm
}

/// Side panels sit in a back rabbet one thickness deep, so their own
/// depth-direction dimension is one thickness short of the carcass depth.
fn side_depth(spec: &CabinetSpec) -> f64 {
    spec.depth_mm - spec.thickness_mm
}

fn blank_panel(name: impl Into<String>, width_mm: f64, height_mm: f64, thickness_mm: f64) -> Panel {
    Panel {
        name: name.into(),
        width_mm,
        height_mm,
        thickness_mm,
        material: DEFAULT_MATERIAL.into(),
        edge_front: false,
        edge_back: false,
        edge_top: false,
        edge_bottom: false,
        edge_thickness_mm: EDGE_BAND_THICKNESS_MM,
        drilling_points: Vec::new(),
        notes: String::new(),
    }
}

fn side_panel(name: &str, depth: f64, height: f64, thickness: f64) -> Panel {
    let mut p = blank_panel(name, depth, height, thickness);
    p.edge_front = true;
    p.notes = format!("паз под заднюю стенку, глубина {thickness:.0} мм");
    p
}

fn horizontal_panel(name: &str, width: f64, depth: f64, thickness: f64) -> Panel {
    let mut p = blank_panel(name, width, depth, thickness);
    p.edge_front = true;
    p
}

fn shelves(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    let depth = side_depth(spec);
    let width = inner_width(spec) - 2.0 * settings.shelf_gap_mm;
    (0..spec.shelf_count)
        .map(|i| horizontal_panel(&format!("Полка {}", i + 1), width, depth, spec.thickness_mm))
        .collect()
}

fn tie_beam(name: &str, spec: &CabinetSpec, height_mm: f64) -> Panel {
    blank_panel(name, inner_width(spec), height_mm, spec.thickness_mm)
}

fn wall_panels(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    let depth = side_depth(spec);
    let mut panels = vec![
        side_panel("Боковина левая", depth, spec.height_mm, spec.thickness_mm),
        side_panel("Боковина правая", depth, spec.height_mm, spec.thickness_mm),
        horizontal_panel("Верх", inner_width(spec), depth, spec.thickness_mm),
        horizontal_panel("Низ", inner_width(spec), depth, spec.thickness_mm),
    ];
    panels.extend(shelves(spec, settings));
    panels
}

fn tall_panels(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    // Same carcass shape as a wall cabinet, just taller and wall-mount-flagged.
    wall_panels(spec, settings)
}

fn base_panels(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    let depth = side_depth(spec);
    let mut panels = vec![
        side_panel("Боковина левая", depth, spec.height_mm, spec.thickness_mm),
        side_panel("Боковина правая", depth, spec.height_mm, spec.thickness_mm),
        horizontal_panel("Низ", inner_width(spec), depth, spec.thickness_mm),
        tie_beam("Царга передняя", spec, settings.tie_beam_height_mm),
        tie_beam("Царга задняя", spec, settings.tie_beam_height_mm),
    ];
    panels.extend(shelves(spec, settings));
    panels
}

fn base_sink_panels(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    let depth = side_depth(spec);
    vec![
        side_panel("Боковина левая", depth, spec.height_mm, spec.thickness_mm),
        side_panel("Боковина правая", depth, spec.height_mm, spec.thickness_mm),
        tie_beam("Царга передняя верхняя", spec, settings.tie_beam_height_mm),
        tie_beam("Царга задняя верхняя", spec, settings.tie_beam_height_mm),
        tie_beam("Царга передняя нижняя", spec, settings.tie_beam_height_mm),
        tie_beam("Царга задняя нижняя", spec, settings.tie_beam_height_mm),
    ]
}

fn drawer_panels(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<Panel> {
    let depth = side_depth(spec);
    let mut panels = vec![
        side_panel("Боковина левая", depth, spec.height_mm, spec.thickness_mm),
        side_panel("Боковина правая", depth, spec.height_mm, spec.thickness_mm),
        horizontal_panel("Низ", inner_width(spec), depth, spec.thickness_mm),
        tie_beam("Царга передняя", spec, settings.tie_beam_height_mm),
        tie_beam("Царга задняя", spec, settings.tie_beam_height_mm),
    ];

    let drawer_count = spec.drawer_count.max(1);
    let front_height = spec.height_mm / drawer_count as f64;
    let internal_width = inner_width(spec) - settings.drawer_gap_mm;
    let box_height = (front_height - settings.drawer_gap_mm).max(1.0);
    let box_depth = (depth - settings.drawer_gap_mm).max(1.0);

    for i in 0..drawer_count {
        let n = i + 1;
        let mut front = blank_panel(
            format!("Фасад ящика {n}"),
            inner_width(spec),
            front_height,
            spec.thickness_mm,
        );
        front.edge_front = true;
        front.edge_back = true;
        front.edge_top = true;
        front.edge_bottom = true;
        panels.push(front);

        panels.push(blank_panel(
            format!("Боковина ящика {n} левая"),
            box_depth,
            box_height,
            spec.thickness_mm,
        ));
        panels.push(blank_panel(
            format!("Боковина ящика {n} правая"),
            box_depth,
            box_height,
            spec.thickness_mm,
        ));
        panels.push(blank_panel(
            format!("Стенка ящика {n} передняя"),
            internal_width,
            box_height,
            spec.thickness_mm,
        ));
        panels.push(blank_panel(
            format!("Стенка ящика {n} задняя"),
            internal_width,
            box_height,
            spec.thickness_mm,
        ));
        panels.push(blank_panel(
            format!("Дно ящика {n}"),
            internal_width,
            box_depth,
            HDF_BACK_THICKNESS_MM,
        ));
    }

    panels
}

/// Positions along a span for a two-hole confirmat joint, falling back to a
/// single centered hole when the span is too short for the usual offset.
fn confirmat_positions(span_mm: f64, offset_mm: f64) -> Vec<f64> {
    if span_mm >= 2.0 * offset_mm + 1.0 {
        vec![offset_mm, span_mm - offset_mm]
    } else {
        vec![span_mm / 2.0]
    }
}

fn system32_rows(height_mm: f64, thickness_mm: f64) -> Vec<f64> {
    let margin = thickness_mm * 2.0;
    let mut rows = Vec::new();
    let mut y = margin;
    while y <= height_mm - margin {
        rows.push(y);
        y += SYSTEM32_ROW_PITCH_MM;
    }
    rows
}

/// Adds confirmat joinery between fixed horizontal panels and the sides,
/// plus system-32 shelf-pin columns on the sides themselves.
fn drill_sides(panels: &mut [Panel], spec: &CabinetSpec, settings: &EffectiveSettings) {
    let depth = side_depth(spec);
    let is_carcass_with_shelves = matches!(
        spec.cabinet_type,
        CabinetType::Wall | CabinetType::Base | CabinetType::Drawer | CabinetType::Tall
    );

    for panel in panels.iter_mut() {
        let is_horizontal = matches!(
            panel.name.as_str(),
            "Верх" | "Низ" | "Царга передняя" | "Царга задняя"
        );
        if is_horizontal {
            for y in confirmat_positions(depth, settings.confirmat_front_offset_mm) {
                panel.drilling_points.push(DrillPoint {
                    x_mm: 0.0,
                    y_mm: y,
                    diameter_mm: 8.0,
                    depth_mm: CONFIRMAT_DEPTH_MM,
                    side: DrillSide::Edge,
                    hardware_type: "confirmat".into(),
                });
                panel.drilling_points.push(DrillPoint {
                    x_mm: panel.width_mm,
                    y_mm: y,
                    diameter_mm: 8.0,
                    depth_mm: CONFIRMAT_DEPTH_MM,
                    side: DrillSide::Edge,
                    hardware_type: "confirmat".into(),
                });
            }
        }

        if panel.name.starts_with("Боковина") && !panel.name.contains("ящика") {
            let face_depth = (spec.thickness_mm - 4.0).max(3.0);
            for x in confirmat_positions(depth, settings.confirmat_front_offset_mm) {
                panel.drilling_points.push(DrillPoint {
                    x_mm: x,
                    y_mm: spec.thickness_mm / 2.0,
                    diameter_mm: 8.0,
                    depth_mm: face_depth,
                    side: DrillSide::Face,
                    hardware_type: "confirmat".into(),
                });
                if spec.cabinet_type == CabinetType::Wall || spec.cabinet_type == CabinetType::Tall {
                    panel.drilling_points.push(DrillPoint {
                        x_mm: x,
                        y_mm: panel.height_mm - spec.thickness_mm / 2.0,
                        diameter_mm: 8.0,
                        depth_mm: face_depth,
                        side: DrillSide::Face,
                        hardware_type: "confirmat".into(),
                    });
                }
            }

            if is_carcass_with_shelves && spec.shelf_count > 0 {
                for x in [settings.system32_front_offset_mm, depth - settings.system32_front_offset_mm] {
                    for y in system32_rows(panel.height_mm, spec.thickness_mm) {
                        panel.drilling_points.push(DrillPoint {
                            x_mm: x,
                            y_mm: y,
                            diameter_mm: SYSTEM32_DIAMETER_MM,
                            depth_mm: SYSTEM32_DEPTH_MM,
                            side: DrillSide::Face,
                            hardware_type: "system32_pin".into(),
                        });
                    }
                }
            }
        }
    }
}

fn warnings_for(spec: &CabinetSpec, settings: &EffectiveSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    if spec.shelf_count > 0 {
        let span = inner_width(spec);
        if span > settings.max_shelf_span_mm {
            warnings.push(format!(
                "shelf span {:.0}mm exceeds max_shelf_span_mm {:.0}mm; shelf may sag, consider a vertical divider",
                span, settings.max_shelf_span_mm
            ));
        }
    }

    match spec.cabinet_type {
        CabinetType::BaseSink => {
            warnings.push(
                "base_sink cabinet: plumbing cutout required, verify pipe positions on site".into(),
            );
        }
        CabinetType::Tall if spec.height_mm > TALL_WALL_MOUNT_HEIGHT_MM => {
            warnings.push(format!(
                "tall cabinet height {:.0}mm exceeds {:.0}mm, wall mounting is mandatory",
                spec.height_mm, TALL_WALL_MOUNT_HEIGHT_MM
            ));
        }
        _ => {}
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EffectiveSettings {
        EffectiveSettings::default()
    }

    fn wall_spec(width: f64, height: f64, depth: f64, shelf_count: u32) -> CabinetSpec {
        CabinetSpec {
            cabinet_type: CabinetType::Wall,
            width_mm: width,
            height_mm: height,
            depth_mm: depth,
            thickness_mm: 16.0,
            shelf_count,
            door_count: 1,
            drawer_count: 0,
        }
    }

    #[test]
    fn wall_cabinet_produces_six_named_panels() {
        let spec = wall_spec(600.0, 720.0, 300.0, 2);
        let (panels, warnings) = generate_panels(&spec, &settings()).unwrap();

        assert_eq!(panels.len(), 6);
        assert!(warnings.is_empty());

        let names: Vec<&str> = panels.iter().map(|p| p.name.as_str()).collect();
        for expected in [
            "Боковина левая",
            "Боковина правая",
            "Верх",
            "Низ",
            "Полка 1",
            "Полка 2",
        ] {
            assert!(names.contains(&expected), "missing panel {expected}");
        }

        let side = panels.iter().find(|p| p.name == "Боковина левая").unwrap();
        assert!((side.width_mm - 284.0).abs() < 1e-9);
        assert!((side.height_mm - 720.0).abs() < 1e-9);

        let top = panels.iter().find(|p| p.name == "Верх").unwrap();
        assert!((top.width_mm - 568.0).abs() < 1e-9);
        assert!((top.height_mm - 284.0).abs() < 1e-9);

        let shelf = panels.iter().find(|p| p.name == "Полка 1").unwrap();
        assert!((shelf.width_mm - 568.0).abs() < 1e-9);
    }

    #[test]
    fn wide_shelf_triggers_sag_warning_naming_the_span() {
        let spec = wall_spec(800.0, 720.0, 300.0, 1);
        let (_, warnings) = generate_panels(&spec, &settings()).unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("768"));
        assert!(warnings[0].contains("max_shelf_span_mm"));
    }

    #[test]
    fn base_sink_always_warns_about_plumbing() {
        let spec = CabinetSpec {
            cabinet_type: CabinetType::BaseSink,
            width_mm: 600.0,
            height_mm: 720.0,
            depth_mm: 560.0,
            thickness_mm: 16.0,
            shelf_count: 0,
            door_count: 2,
            drawer_count: 0,
        };
        let (panels, warnings) = generate_panels(&spec, &settings()).unwrap();

        assert!(!panels.iter().any(|p| p.name == "Низ"));
        assert!(warnings.iter().any(|w| w.contains("plumbing")));
    }

    #[test]
    fn tall_cabinet_over_2000mm_requires_wall_mount() {
        let spec = CabinetSpec {
            cabinet_type: CabinetType::Tall,
            width_mm: 600.0,
            height_mm: 2200.0,
            depth_mm: 560.0,
            thickness_mm: 16.0,
            shelf_count: 3,
            door_count: 2,
            drawer_count: 0,
        };
        let (_, warnings) = generate_panels(&spec, &settings()).unwrap();
        assert!(warnings.iter().any(|w| w.contains("wall mounting is mandatory")));
    }

    #[test]
    fn drawer_cabinet_emits_a_full_box_per_drawer() {
        let spec = CabinetSpec {
            cabinet_type: CabinetType::Drawer,
            width_mm: 600.0,
            height_mm: 720.0,
            depth_mm: 560.0,
            thickness_mm: 16.0,
            shelf_count: 0,
            door_count: 0,
            drawer_count: 3,
        };
        let (panels, _) = generate_panels(&spec, &settings()).unwrap();

        let fronts = panels.iter().filter(|p| p.name.starts_with("Фасад ящика")).count();
        assert_eq!(fronts, 3);
        let bottoms = panels.iter().filter(|p| p.name.starts_with("Дно ящика")).count();
        assert_eq!(bottoms, 3);
    }

    #[test]
    fn sides_carry_confirmat_and_system32_drilling() {
        let spec = wall_spec(600.0, 720.0, 300.0, 2);
        let (panels, _) = generate_panels(&spec, &settings()).unwrap();
        let side = panels.iter().find(|p| p.name == "Боковина левая").unwrap();
        assert!(side
            .drilling_points
            .iter()
            .any(|d| d.hardware_type == "confirmat"));
        assert!(side
            .drilling_points
            .iter()
            .any(|d| d.hardware_type == "system32_pin"));
    }

    #[test]
    fn rejects_width_too_small_for_two_sides() {
        let spec = wall_spec(20.0, 720.0, 300.0, 0);
        assert!(generate_panels(&spec, &settings()).is_err());
    }
}
