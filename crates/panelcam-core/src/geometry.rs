use serde::{Deserialize, Serialize};

/// A 2D point, millimeters, origin at a panel's or sheet's bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle. Origin is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point2D,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(origin: Point2D, width: f64, height: f64) -> Self {
        Self { origin, width, height }
    }

    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self { origin: Point2D::origin(), width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.height
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.origin.x + self.width / 2.0, self.origin.y + self.height / 2.0)
    }

    /// Corners in order bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.origin,
            Point2D::new(self.max_x(), self.min_y()),
            Point2D::new(self.max_x(), self.max_y()),
            Point2D::new(self.min_x(), self.max_y()),
        ]
    }

    pub fn fits_inside(&self, other: &Rect) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    pub fn fits_inside_rotated(&self, other: &Rect) -> bool {
        self.height <= other.width && self.width <= other.height
    }

    /// True if this rect and `other`, each expanded by `margin/2` on every
    /// side, overlap. Used by the packer's no-overlap invariant check with
    /// `margin` set to the packing gap (kerf).
    pub fn overlaps(&self, other: &Rect, margin: f64) -> bool {
        let half = margin / 2.0;
        let a_min_x = self.min_x() - half;
        let a_max_x = self.max_x() + half;
        let a_min_y = self.min_y() - half;
        let a_max_y = self.max_y() + half;
        let b_min_x = other.min_x() - half;
        let b_max_x = other.max_x() + half;
        let b_min_y = other.min_y() - half;
        let b_max_y = other.max_y() + half;
        a_min_x < b_max_x && b_min_x < a_max_x && a_min_y < b_max_y && b_min_y < a_max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn rect_area() {
        let r = Rect::from_dimensions(600.0, 720.0);
        assert!((r.area() - 432_000.0).abs() < 1e-9);
    }

    #[test]
    fn rect_corners() {
        let r = Rect::new(Point2D::new(1.0, 2.0), 10.0, 5.0);
        let c = r.corners();
        assert_eq!(c[0], Point2D::new(1.0, 2.0));
        assert_eq!(c[2], Point2D::new(11.0, 7.0));
    }

    #[test]
    fn rect_overlap_detects_touching_with_margin() {
        let a = Rect::from_dimensions(10.0, 10.0);
        let b = Rect::new(Point2D::new(10.5, 0.0), 10.0, 10.0);
        assert!(!a.overlaps(&b, 0.0));
        assert!(a.overlaps(&b, 2.0));
    }

    #[test]
    fn rect_fits_inside_rotated() {
        let panel = Rect::from_dimensions(720.0, 284.0);
        let sheet = Rect::from_dimensions(300.0, 800.0);
        assert!(!panel.fits_inside(&sheet));
        assert!(panel.fits_inside_rotated(&sheet));
    }
}
