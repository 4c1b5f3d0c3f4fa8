use std::fmt::Write as _;

use panelcam_calc::{DrillPoint, DrillSide, Panel};

use crate::error::PostError;
use crate::machine::MachineProfile;
use crate::toolpath::{Motion, Toolpath};
use crate::translit::transliterate;

/// Emits G-code from toolpaths and drilling points using a machine profile.
pub struct GCodeEmitter<'a> {
    profile: &'a MachineProfile,
}

impl<'a> GCodeEmitter<'a> {
    pub fn new(profile: &'a MachineProfile) -> Self {
        Self { profile }
    }

    fn header(&self, out: &mut String) {
        writeln!(out, "{}", self.profile.comment(&format!("Machine: {}", self.profile.name))).unwrap();
        writeln!(out, "G21").unwrap();
        writeln!(out, "G90").unwrap();
        writeln!(out, "G17").unwrap();
        writeln!(out, "G40").unwrap();
        writeln!(out, "G49").unwrap();
        writeln!(out, "G54").unwrap();
    }

    fn footer(&self, out: &mut String) {
        let dp = self.profile.decimal_places as usize;
        writeln!(out).unwrap();
        writeln!(out, "{}", self.profile.codes.spindle_off).unwrap();
        writeln!(out, "G00 Z{:.*}", dp, self.profile.safe_height_mm).unwrap();
        writeln!(out, "G00 X0.0000 Y0.0000").unwrap();
        writeln!(out, "{}", self.profile.codes.program_end).unwrap();
        writeln!(out, "%").unwrap();
    }

    /// Prefix every non-blank line with `N<n>`, stepping by the profile's
    /// increment. Leaves the output untouched if the dialect doesn't number.
    fn number_lines(&self, body: &str) -> String {
        let Some(increment) = self.profile.codes.line_number_increment else {
            return body.to_string();
        };
        let mut out = String::with_capacity(body.len() + body.lines().count() * 6);
        let mut n = increment;
        for line in body.lines() {
            if line.is_empty() || line == "%" {
                writeln!(out, "{line}").unwrap();
            } else {
                writeln!(out, "N{n} {line}").unwrap();
                n += increment;
            }
        }
        out
    }

    fn tool_change(&self, out: &mut String, tool_number: u32, rpm: f64) {
        let dp = self.profile.decimal_places as usize;
        writeln!(out, "{}", self.profile.comment(&format!("Tool change: T{tool_number}"))).unwrap();
        writeln!(out, "{}", self.profile.codes.spindle_off).unwrap();
        writeln!(out, "G00 Z{:.*}", dp, self.profile.safe_height_mm).unwrap();
        writeln!(out, "T{tool_number} {}", self.profile.codes.tool_change_suffix).unwrap();
        writeln!(out, "G43 H{tool_number}").unwrap();
        writeln!(out, "S{} {}", rpm as u32, self.profile.codes.spindle_on_cw).unwrap();
    }

    /// Emit the "cut path" source mode: a reparsed DXF contour cut, followed
    /// by any drilling points on the panel grouped by (diameter, side).
    pub fn emit_cut_path(
        &self,
        panel: &Panel,
        toolpath: &Toolpath,
        cut_depth_mm: f64,
        step_down_mm: f64,
        tool_diameter_mm: f64,
    ) -> Result<String, PostError> {
        check_feed_rate(toolpath.feed_rate)?;
        check_tool_vs_panel(panel, tool_diameter_mm)?;
        check_cut_depth_vs_thickness(panel, cut_depth_mm)?;
        check_step_down(step_down_mm, tool_diameter_mm)?;

        let dp = self.profile.decimal_places as usize;
        let mut out = String::with_capacity(4096);
        self.header(&mut out);
        self.tool_change(&mut out, toolpath.tool_number, toolpath.rpm);

        let mut current_feed: Option<f64> = None;
        let mut last_motion: Option<Motion> = None;

        for seg in &toolpath.segments {
            match seg.motion {
                Motion::Rapid => {
                    if last_motion != Some(Motion::Rapid) {
                        write!(out, "G00 ").unwrap();
                    }
                    writeln!(out, "X{:.*} Y{:.*} Z{:.*}", dp, seg.endpoint.x, dp, seg.endpoint.y, dp, seg.z).unwrap();
                    last_motion = Some(Motion::Rapid);
                }
                Motion::SpindleOnDwell { dwell_ms } => {
                    writeln!(out, "{}", self.profile.codes.dwell_unit.dwell_line(dwell_ms)).unwrap();
                    last_motion = Some(seg.motion);
                }
                Motion::Linear => {
                    let feed = if seg.z < 0.0 { toolpath.plunge_rate } else { toolpath.feed_rate };
                    if !matches!(last_motion, Some(Motion::Linear)) {
                        write!(out, "G01 ").unwrap();
                    }
                    write!(out, "X{:.*} Y{:.*} Z{:.*}", dp, seg.endpoint.x, dp, seg.endpoint.y, dp, seg.z).unwrap();
                    if current_feed != Some(feed) {
                        write!(out, " F{:.*}", dp.min(1), feed).unwrap();
                        current_feed = Some(feed);
                    }
                    writeln!(out).unwrap();
                    last_motion = Some(Motion::Linear);
                }
                Motion::ArcCw { i, j } => {
                    write!(out, "G02 X{:.*} Y{:.*} Z{:.*} I{:.*} J{:.*}", dp, seg.endpoint.x, dp, seg.endpoint.y, dp, seg.z, dp, i, dp, j).unwrap();
                    if current_feed != Some(toolpath.feed_rate) {
                        write!(out, " F{:.*}", dp.min(1), toolpath.feed_rate).unwrap();
                        current_feed = Some(toolpath.feed_rate);
                    }
                    writeln!(out).unwrap();
                    last_motion = Some(seg.motion);
                }
                Motion::ArcCcw { i, j } => {
                    write!(out, "G03 X{:.*} Y{:.*} Z{:.*} I{:.*} J{:.*}", dp, seg.endpoint.x, dp, seg.endpoint.y, dp, seg.z, dp, i, dp, j).unwrap();
                    if current_feed != Some(toolpath.feed_rate) {
                        write!(out, " F{:.*}", dp.min(1), toolpath.feed_rate).unwrap();
                        current_feed = Some(toolpath.feed_rate);
                    }
                    writeln!(out).unwrap();
                    last_motion = Some(seg.motion);
                }
            }
        }

        if !panel.drilling_points.is_empty() {
            writeln!(out).unwrap();
            writeln!(out, "{}", self.profile.comment("Drilling")).unwrap();
            self.emit_drill_groups(&mut out, panel, toolpath.rpm)?;
        }

        self.footer(&mut out);
        Ok(self.number_lines(&out))
    }

    /// Emit the "drilling" source mode: canned cycles over the panel's
    /// drilling points, grouped by `(diameter, side)`, ignoring cut
    /// geometry entirely. Used for boring machines fed an already-cut panel.
    pub fn emit_drilling(&self, panel: &Panel, tool_diameter_mm: f64, rpm: f64) -> Result<String, PostError> {
        check_tool_vs_panel(panel, tool_diameter_mm)?;
        check_peck_depth(panel)?;

        let mut out = String::with_capacity(1024);
        self.header(&mut out);
        writeln!(out, "{}", self.profile.comment(&transliterate(&panel.name))).unwrap();
        self.emit_drill_groups(&mut out, panel, rpm)?;
        self.footer(&mut out);
        Ok(self.number_lines(&out))
    }

    fn emit_drill_groups(&self, out: &mut String, panel: &Panel, rpm: f64) -> Result<(), PostError> {
        let dp = self.profile.decimal_places as usize;
        let groups = group_drilling_points(&panel.drilling_points);
        for (tool_idx, group) in groups.iter().enumerate() {
            self.tool_change(out, (tool_idx + 1) as u32, rpm);
            writeln!(out, "{}", self.profile.codes.dwell_unit.dwell_line(500.0)).unwrap();

            for (i, point) in group.points.iter().enumerate() {
                if i == 0 {
                    writeln!(
                        out,
                        "{} X{:.*} Y{:.*} Z{:.*} R{:.*} F{:.*}",
                        self.profile.codes.drilling_cycle,
                        dp, point.x_mm,
                        dp, point.y_mm,
                        dp, -point.depth_mm,
                        dp, self.profile.codes.retract_height_mm,
                        dp.min(1), self.profile.default_feed_rate_plunge,
                    )
                    .unwrap();
                } else {
                    writeln!(out, "X{:.*} Y{:.*}", dp, point.x_mm, dp, point.y_mm).unwrap();
                }
            }
            writeln!(out, "G80").unwrap();
        }
        Ok(())
    }
}

struct DrillGroup<'a> {
    diameter_mm: f64,
    #[allow(dead_code)]
    side: DrillSide,
    points: Vec<&'a DrillPoint>,
}

fn group_drilling_points(points: &[DrillPoint]) -> Vec<DrillGroup<'_>> {
    let mut groups: Vec<DrillGroup> = Vec::new();
    for point in points {
        if let Some(group) = groups
            .iter_mut()
            .find(|g| (g.diameter_mm - point.diameter_mm).abs() < 1e-6 && g.side == point.side)
        {
            group.points.push(point);
        } else {
            groups.push(DrillGroup { diameter_mm: point.diameter_mm, side: point.side, points: vec![point] });
        }
    }
    groups
}

fn check_feed_rate(feed_rate: f64) -> Result<(), PostError> {
    if feed_rate <= 0.0 {
        return Err(PostError::InvalidMachining(format!("feed rate must be positive, got {feed_rate}")));
    }
    Ok(())
}

fn check_tool_vs_panel(panel: &Panel, tool_diameter_mm: f64) -> Result<(), PostError> {
    let smallest_side = panel.width_mm.min(panel.height_mm);
    if tool_diameter_mm >= smallest_side {
        return Err(PostError::InvalidMachining(format!(
            "tool diameter {tool_diameter_mm:.1}mm is not smaller than panel '{}' smallest side {smallest_side:.1}mm",
            panel.name
        )));
    }
    Ok(())
}

fn check_cut_depth_vs_thickness(panel: &Panel, cut_depth_mm: f64) -> Result<(), PostError> {
    if cut_depth_mm < panel.thickness_mm {
        return Err(PostError::InvalidMachining(format!(
            "cut depth {cut_depth_mm:.1}mm is less than panel '{}' thickness {:.1}mm",
            panel.name, panel.thickness_mm
        )));
    }
    Ok(())
}

fn check_step_down(step_down_mm: f64, tool_diameter_mm: f64) -> Result<(), PostError> {
    if step_down_mm > tool_diameter_mm {
        return Err(PostError::InvalidMachining(format!(
            "step-down {step_down_mm:.1}mm exceeds tool diameter {tool_diameter_mm:.1}mm"
        )));
    }
    Ok(())
}

fn check_peck_depth(panel: &Panel) -> Result<(), PostError> {
    for point in &panel.drilling_points {
        if point.side == DrillSide::Face && point.depth_mm >= panel.thickness_mm {
            return Err(PostError::InvalidMachining(format!(
                "peck depth {:.1}mm is not less than panel '{}' thickness {:.1}mm",
                point.depth_mm, panel.name, panel.thickness_mm
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::MachineProfile;
    use crate::toolpath::cut_path_from_contour;
    use panelcam_calc::DrillPoint;
    use panelcam_core::Point2D;

    fn sample_panel() -> Panel {
        Panel {
            name: "Боковина левая".to_string(),
            width_mm: 568.0,
            height_mm: 284.0,
            thickness_mm: 16.0,
            material: "ЛДСП 16".to_string(),
            edge_front: true,
            edge_back: false,
            edge_top: false,
            edge_bottom: false,
            edge_thickness_mm: 0.4,
            drilling_points: vec![
                DrillPoint { x_mm: 10.0, y_mm: 10.0, diameter_mm: 5.0, depth_mm: 13.0, side: DrillSide::Face, hardware_type: "system32".to_string() },
                DrillPoint { x_mm: 10.0, y_mm: 42.0, diameter_mm: 5.0, depth_mm: 13.0, side: DrillSide::Face, hardware_type: "system32".to_string() },
                DrillPoint { x_mm: 8.0, y_mm: 10.0, diameter_mm: 8.0, depth_mm: 50.0, side: DrillSide::Edge, hardware_type: "confirmat".to_string() },
            ],
            notes: String::new(),
        }
    }

    #[test]
    fn weihong_cut_path_emits_exactly_one_dwell_after_spindle_on() {
        let profile = MachineProfile::weihong();
        let emitter = GCodeEmitter::new(&profile);
        let panel = Panel { drilling_points: vec![], ..sample_panel() };
        let tp = cut_path_from_contour(Point2D::new(0.0, 0.0), 568.0, 284.0, 16.0, 8.0, 10.0, 1, 18000.0, 6000.0, 1500.0);
        let gcode = emitter.emit_cut_path(&panel, &tp, 16.0, 8.0, 6.0).unwrap();

        let m03_idx = gcode.find("M03").expect("spindle-on code present");
        let dwell_positions: Vec<_> = gcode.match_indices("G04 P500").collect();
        assert_eq!(dwell_positions.len(), 1, "exactly one dwell expected");
        assert!(dwell_positions[0].0 > m03_idx, "dwell must follow the first M03");
    }

    #[test]
    fn cut_path_drilling_closes_with_g80() {
        let profile = MachineProfile::weihong();
        let emitter = GCodeEmitter::new(&profile);
        let panel = sample_panel();
        let tp = cut_path_from_contour(Point2D::new(0.0, 0.0), 568.0, 284.0, 16.0, 8.0, 10.0, 1, 18000.0, 6000.0, 1500.0);
        let gcode = emitter.emit_cut_path(&panel, &tp, 16.0, 8.0, 6.0).unwrap();
        assert!(gcode.contains("G80"));
    }

    #[test]
    fn drilling_groups_by_diameter_and_side_with_shorthand_repeats() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let gcode = emitter.emit_drilling(&sample_panel(), 4.0, 3000.0).unwrap();
        assert!(gcode.contains("Bokovina levaya"));
        // Two groups -> two tool changes -> two G80 closes.
        assert_eq!(gcode.matches("G80").count(), 2);
        assert_eq!(gcode.matches("T1 ").count() + gcode.matches("T2 ").count(), 2);
    }

    #[test]
    fn syntec_drilling_numbers_every_non_blank_line() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let gcode = emitter.emit_drilling(&sample_panel(), 4.0, 3000.0).unwrap();
        for line in gcode.lines().filter(|l| !l.is_empty()) {
            assert!(line.starts_with('N'), "expected numbered line, got {line:?}");
        }
        assert!(gcode.contains("N10 "));
    }

    #[test]
    fn weihong_drilling_is_unnumbered() {
        let profile = MachineProfile::weihong();
        let emitter = GCodeEmitter::new(&profile);
        let gcode = emitter.emit_drilling(&sample_panel(), 4.0, 3000.0).unwrap();
        assert!(!gcode.lines().any(|l| l.starts_with('N') && l.chars().nth(1).is_some_and(|c| c.is_ascii_digit())));
    }

    #[test]
    fn drilling_rejects_tool_not_smaller_than_panel() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let err = emitter.emit_drilling(&sample_panel(), 600.0, 3000.0).unwrap_err();
        assert!(matches!(err, PostError::InvalidMachining(_)));
    }

    #[test]
    fn drilling_rejects_face_peck_depth_at_or_over_thickness() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let mut panel = sample_panel();
        panel.drilling_points[0].depth_mm = 16.0;
        let err = emitter.emit_drilling(&panel, 4.0, 3000.0).unwrap_err();
        assert!(matches!(err, PostError::InvalidMachining(_)));
    }

    #[test]
    fn cut_path_rejects_depth_shallower_than_thickness() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let panel = Panel { drilling_points: vec![], ..sample_panel() };
        let tp = cut_path_from_contour(Point2D::new(0.0, 0.0), 568.0, 284.0, 10.0, 8.0, 10.0, 1, 18000.0, 6000.0, 1500.0);
        let err = emitter.emit_cut_path(&panel, &tp, 10.0, 8.0, 6.0).unwrap_err();
        assert!(matches!(err, PostError::InvalidMachining(_)));
    }

    #[test]
    fn cut_path_rejects_step_down_over_tool_diameter() {
        let profile = MachineProfile::syntec();
        let emitter = GCodeEmitter::new(&profile);
        let panel = Panel { drilling_points: vec![], ..sample_panel() };
        let tp = cut_path_from_contour(Point2D::new(0.0, 0.0), 568.0, 284.0, 16.0, 20.0, 10.0, 1, 18000.0, 6000.0, 1500.0);
        let err = emitter.emit_cut_path(&panel, &tp, 16.0, 20.0, 6.0).unwrap_err();
        assert!(matches!(err, PostError::InvalidMachining(_)));
    }
}
