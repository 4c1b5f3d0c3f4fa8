//! DXF Writer (C4): renders a nested sheet layout (or a single panel) to a
//! DXF drawing with contour, edge-band, drilling, text, and sheet layers.

use dxf::entities::{Circle, Entity, EntityType, LwPolyline, MText};
use dxf::enums::AcadVersion;
use dxf::{Drawing, LwPolylineVertex, Point};

use panelcam_calc::{DrillSide, Panel};
use panelcam_core::{Point2D, Rect};
use panelcam_pack::SheetLayout;

use crate::error::DxfError;
use crate::layers;

fn new_drawing() -> Drawing {
    let mut drawing = Drawing::new();
    drawing.header.version = AcadVersion::R2000;
    for name in layers::ALL {
        let layer = dxf::tables::Layer {
            name: name.to_string(),
            color: match name {
                layers::CONTOUR => dxf::Color::from_index(7),
                layers::EDGE => dxf::Color::from_index(1),
                layers::DRILLING => dxf::Color::from_index(5),
                layers::TEXT => dxf::Color::from_index(3),
                _ => dxf::Color::by_layer(),
            },
            ..Default::default()
        };
        drawing.add_layer(layer);
    }
    drawing
}

fn add_rect(drawing: &mut Drawing, rect: &Rect, layer: &str) {
    let x0 = rect.origin.x;
    let y0 = rect.origin.y;
    let x1 = x0 + rect.width;
    let y1 = y0 + rect.height;

    let mut lwp = LwPolyline::default();
    lwp.set_is_closed(true);
    lwp.vertices = vec![
        LwPolylineVertex { x: x0, y: y0, ..Default::default() },
        LwPolylineVertex { x: x1, y: y0, ..Default::default() },
        LwPolylineVertex { x: x1, y: y1, ..Default::default() },
        LwPolylineVertex { x: x0, y: y1, ..Default::default() },
    ];

    let mut entity = Entity::new(EntityType::LwPolyline(lwp));
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

fn add_line(drawing: &mut Drawing, a: (f64, f64), b: (f64, f64), layer: &str) {
    let mut lwp = LwPolyline::default();
    lwp.vertices = vec![
        LwPolylineVertex { x: a.0, y: a.1, ..Default::default() },
        LwPolylineVertex { x: b.0, y: b.1, ..Default::default() },
    ];
    let mut entity = Entity::new(EntityType::LwPolyline(lwp));
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

fn add_circle(drawing: &mut Drawing, center: (f64, f64), radius: f64, layer: &str) {
    let circle = Circle {
        center: Point::new(center.0, center.1, 0.0),
        radius,
        ..Default::default()
    };
    let mut entity = Entity::new(EntityType::Circle(circle));
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

fn add_text(drawing: &mut Drawing, text: &str, x: f64, y: f64, height: f64) {
    let mtext = MText {
        text: text.to_string(),
        insertion_point: Point::new(x, y, 0.0),
        initial_text_height: height,
        ..Default::default()
    };
    let mut entity = Entity::new(EntityType::MText(mtext));
    entity.common.layer = layers::TEXT.to_string();
    drawing.add_entity(entity);
}

/// Map a drill point's panel-local coordinates into sheet coordinates,
/// accounting for a 90-degree rotation applied by the packer.
fn local_to_sheet(panel: &Panel, rect: &Rect, rotated: bool, x_mm: f64, y_mm: f64) -> (f64, f64) {
    if !rotated {
        (rect.origin.x + x_mm, rect.origin.y + y_mm)
    } else {
        (rect.origin.x + y_mm, rect.origin.y + (panel.width_mm - x_mm))
    }
}

fn add_edge_marks(drawing: &mut Drawing, panel: &Panel, rect: &Rect, rotated: bool) {
    let (w, h) = if rotated { (rect.height, rect.width) } else { (rect.width, rect.height) };
    let x0 = rect.origin.x;
    let y0 = rect.origin.y;

    let edges: [(bool, (f64, f64), (f64, f64)); 4] = [
        (panel.edge_front, (x0, y0), (x0 + w, y0)),
        (panel.edge_back, (x0, y0 + h), (x0 + w, y0 + h)),
        (panel.edge_bottom, (x0, y0), (x0, y0 + h)),
        (panel.edge_top, (x0 + w, y0), (x0 + w, y0 + h)),
    ];

    for (present, a, b) in edges {
        if present {
            add_line(drawing, a, b, layers::EDGE);
        }
    }
}

fn add_drilling(drawing: &mut Drawing, panel: &Panel, rect: &Rect, rotated: bool) {
    for d in &panel.drilling_points {
        let (x, y) = local_to_sheet(panel, rect, rotated, d.x_mm, d.y_mm);
        let radius = d.diameter_mm / 2.0;
        let layer = match d.side {
            DrillSide::Face | DrillSide::Edge => layers::DRILLING,
        };
        add_circle(drawing, (x, y), radius, layer);
    }
}

fn drawing_to_bytes(drawing: &Drawing) -> Result<Vec<u8>, DxfError> {
    let mut buf = Vec::new();
    drawing.save(&mut buf).map_err(|e| DxfError::Write(e.to_string()))?;
    Ok(buf)
}

/// Header text block placed above the sheet boundary: size, panel count,
/// utilization, and how many pieces from the order didn't fit.
fn add_header_block(drawing: &mut Drawing, layout: &SheetLayout, unplaced_count: usize) {
    let text = format!(
        "Sheet {:.0}x{:.0}mm  Panels: {}  Utilization: {:.1}%  Unplaced: {}",
        layout.sheet_rect.width,
        layout.sheet_rect.height,
        layout.parts.len(),
        layout.utilization,
        unplaced_count,
    );
    let x = layout.sheet_rect.origin.x;
    let y = layout.sheet_rect.origin.y + layout.sheet_rect.height + 40.0;
    add_text(drawing, &text, x, y, 20.0);
}

/// Render a full nested sheet: boundary, every placed panel's contour,
/// edge-band marks, drilling, a name label, and a header stats block.
/// `unplaced_count` is the number of panels from the same packing run that
/// couldn't be placed on any sheet.
pub fn write_sheet_dxf(layout: &SheetLayout, panels: &[Panel], unplaced_count: usize) -> Result<Vec<u8>, DxfError> {
    let mut drawing = new_drawing();
    add_rect(&mut drawing, &layout.sheet_rect, layers::SHEET);
    add_header_block(&mut drawing, layout, unplaced_count);

    for placed in &layout.parts {
        let panel = panels
            .iter()
            .find(|p| p.name == placed.id)
            .ok_or_else(|| DxfError::MissingPanel(placed.id.clone()))?;

        add_rect(&mut drawing, &placed.rect, layers::CONTOUR);
        add_edge_marks(&mut drawing, panel, &placed.rect, placed.rotated);
        add_drilling(&mut drawing, panel, &placed.rect, placed.rotated);

        let cx = placed.rect.origin.x + placed.rect.width / 2.0;
        let cy = placed.rect.origin.y + placed.rect.height / 2.0;
        add_text(&mut drawing, &panel.name, cx, cy, 10.0);
    }

    drawing_to_bytes(&drawing)
}

/// Render a single panel in isolation, placed at the origin.
pub fn write_part_dxf(panel: &Panel) -> Result<Vec<u8>, DxfError> {
    let mut drawing = new_drawing();
    let rect = Rect::new(Point2D::origin(), panel.width_mm, panel.height_mm);

    add_rect(&mut drawing, &rect, layers::CONTOUR);
    add_edge_marks(&mut drawing, panel, &rect, false);
    add_drilling(&mut drawing, panel, &rect, false);
    add_text(&mut drawing, &panel.name, rect.width / 2.0, rect.height / 2.0, 10.0);

    drawing_to_bytes(&drawing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxf::entities::EntityType;
    use panelcam_calc::DrillPoint;
    use panelcam_pack::PlacedPanel;

    fn sample_panel(name: &str) -> Panel {
        Panel {
            name: name.into(),
            width_mm: 568.0,
            height_mm: 284.0,
            thickness_mm: 16.0,
            material: "ЛДСП 16".into(),
            edge_front: true,
            edge_back: false,
            edge_top: false,
            edge_bottom: false,
            edge_thickness_mm: 0.4,
            drilling_points: vec![DrillPoint {
                x_mm: 37.0,
                y_mm: 37.0,
                diameter_mm: 8.0,
                depth_mm: 50.0,
                side: DrillSide::Edge,
                hardware_type: "confirmat".into(),
            }],
            notes: String::new(),
        }
    }

    #[test]
    fn single_part_round_trips_through_a_temp_file() {
        let panel = sample_panel("Верх");
        let bytes = write_part_dxf(&panel).unwrap();
        assert!(!bytes.is_empty());

        let tmp = std::env::temp_dir().join("panelcam_test_part.dxf");
        std::fs::write(&tmp, &bytes).unwrap();
        let drawing = Drawing::load_file(&tmp).unwrap();
        let _ = std::fs::remove_file(&tmp);

        let entities: Vec<_> = drawing.entities().collect();
        assert!(entities.iter().any(|e| matches!(&e.specific, EntityType::LwPolyline(_))));
        assert!(entities.iter().any(|e| matches!(&e.specific, EntityType::Circle(_))));
        assert!(entities.iter().any(|e| matches!(&e.specific, EntityType::MText(_))));
    }

    #[test]
    fn sheet_layout_emits_one_contour_per_part() {
        let panel_a = sample_panel("a");
        let panel_b = sample_panel("b");
        let layout = SheetLayout {
            sheet_index: 0,
            sheet_rect: Rect::new(Point2D::origin(), 2800.0, 2070.0),
            parts: vec![
                PlacedPanel { id: "a".into(), rect: Rect::new(Point2D::new(0.0, 0.0), 568.0, 284.0), rotated: false },
                PlacedPanel { id: "b".into(), rect: Rect::new(Point2D::new(600.0, 0.0), 568.0, 284.0), rotated: false },
            ],
            waste_area_mm2: 0.0,
            utilization: 0.0,
        };

        let bytes = write_sheet_dxf(&layout, &[panel_a, panel_b], 3).unwrap();

        let tmp = std::env::temp_dir().join("panelcam_test_sheet.dxf");
        std::fs::write(&tmp, &bytes).unwrap();
        let drawing = Drawing::load_file(&tmp).unwrap();
        let _ = std::fs::remove_file(&tmp);

        let lwp_count = drawing
            .entities()
            .filter(|e| matches!(&e.specific, EntityType::LwPolyline(_)))
            .count();
        // 1 sheet boundary + 2 part contours + 2 front-edge marks = 5
        assert_eq!(lwp_count, 5);

        let header = drawing.entities().find_map(|e| match &e.specific {
            EntityType::MText(m) if m.text.starts_with("Sheet ") => Some(m.text.clone()),
            _ => None,
        });
        assert!(header.is_some_and(|t| t.contains("Unplaced: 3")));
    }

    #[test]
    fn missing_panel_for_a_placed_part_is_an_error() {
        let layout = SheetLayout {
            sheet_index: 0,
            sheet_rect: Rect::new(Point2D::origin(), 2800.0, 2070.0),
            parts: vec![PlacedPanel {
                id: "ghost".into(),
                rect: Rect::new(Point2D::new(0.0, 0.0), 100.0, 100.0),
                rotated: false,
            }],
            waste_area_mm2: 0.0,
            utilization: 0.0,
        };
        assert!(write_sheet_dxf(&layout, &[], 0).is_err());
    }
}
