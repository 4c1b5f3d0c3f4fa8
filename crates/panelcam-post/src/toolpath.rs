use panelcam_core::Point2D;

/// A complete toolpath for one operation on one panel.
#[derive(Debug, Clone, Default)]
pub struct Toolpath {
    pub tool_number: u32,
    pub rpm: f64,
    pub feed_rate: f64,
    pub plunge_rate: f64,
    pub segments: Vec<ToolpathSegment>,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolpathSegment {
    pub motion: Motion,
    pub endpoint: Point2D,
    /// Z height at the endpoint. Negative = into material, 0 = surface.
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// G00: rapid move.
    Rapid,
    /// G01: linear feed.
    Linear,
    /// G02: clockwise arc, I/J relative to segment start.
    ArcCw { i: f64, j: f64 },
    /// G03: counter-clockwise arc.
    ArcCcw { i: f64, j: f64 },
    /// Spindle on (dialect-specific M-code) followed by a dwell, rendered
    /// in the profile's native unit (ms on weihong, s elsewhere).
    SpindleOnDwell { dwell_ms: f64 },
}

/// Reparse a closed rectangular contour (as produced by the Packer/DXF
/// writer) into a cutting toolpath: rise to safe height, rapid to the
/// first vertex, spindle on + dwell, plunge in `step_down_mm` increments,
/// cut the perimeter, rise to safe height.
#[allow(clippy::too_many_arguments)]
pub fn cut_path_from_contour(
    origin: Point2D,
    width: f64,
    height: f64,
    cut_depth_mm: f64,
    step_down_mm: f64,
    safe_height_mm: f64,
    tool_number: u32,
    rpm: f64,
    feed_rate_cutting: f64,
    feed_rate_plunge: f64,
) -> Toolpath {
    let corners = [
        origin,
        Point2D::new(origin.x + width, origin.y),
        Point2D::new(origin.x + width, origin.y + height),
        Point2D::new(origin.x, origin.y + height),
        origin,
    ];

    let mut segments = vec![ToolpathSegment {
        motion: Motion::Rapid,
        endpoint: corners[0],
        z: safe_height_mm,
    }];

    segments.push(ToolpathSegment {
        motion: Motion::SpindleOnDwell { dwell_ms: 500.0 },
        endpoint: corners[0],
        z: safe_height_mm,
    });

    let step = if step_down_mm > 0.0 { step_down_mm } else { cut_depth_mm.max(1.0) };
    let mut depth = step.min(cut_depth_mm);
    loop {
        segments.push(ToolpathSegment {
            motion: Motion::Linear,
            endpoint: corners[0],
            z: -depth,
        });
        if depth >= cut_depth_mm {
            break;
        }
        depth = (depth + step).min(cut_depth_mm);
    }

    for corner in &corners[1..] {
        segments.push(ToolpathSegment {
            motion: Motion::Linear,
            endpoint: *corner,
            z: -cut_depth_mm,
        });
    }
    segments.push(ToolpathSegment {
        motion: Motion::Rapid,
        endpoint: corners[corners.len() - 1],
        z: safe_height_mm,
    });

    Toolpath { tool_number, rpm, feed_rate: feed_rate_cutting, plunge_rate: feed_rate_plunge, segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_path_closes_the_contour() {
        let tp = cut_path_from_contour(
            Point2D::new(10.0, 10.0),
            568.0,
            284.0,
            16.0,
            8.0,
            10.0,
            1,
            18000.0,
            6000.0,
            1500.0,
        );
        let first = tp.segments.first().unwrap();
        let last = tp.segments.last().unwrap();
        assert_eq!(first.endpoint.x, last.endpoint.x);
        assert_eq!(first.endpoint.y, last.endpoint.y);
    }

    #[test]
    fn cut_path_steps_down_in_increments() {
        let tp = cut_path_from_contour(
            Point2D::new(0.0, 0.0),
            100.0,
            100.0,
            16.0,
            8.0,
            10.0,
            1,
            18000.0,
            6000.0,
            1500.0,
        );
        let plunge_depths: Vec<f64> = tp
            .segments
            .iter()
            .filter(|s| s.motion == Motion::Linear && s.endpoint == Point2D::new(0.0, 0.0))
            .map(|s| s.z)
            .collect();
        assert_eq!(plunge_depths, vec![-8.0, -16.0]);
    }

    #[test]
    fn cut_path_starts_with_spindle_on_dwell() {
        let tp = cut_path_from_contour(
            Point2D::new(0.0, 0.0),
            100.0,
            100.0,
            16.0,
            8.0,
            10.0,
            1,
            18000.0,
            6000.0,
            1500.0,
        );
        assert!(matches!(tp.segments[1].motion, Motion::SpindleOnDwell { .. }));
    }
}
