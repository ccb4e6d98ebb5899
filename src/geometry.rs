//! Deck-space geometry: points, rectangles and the circle tests movement uses.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Point of the rectangle nearest to `p` (`p` itself when inside).
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2 {
            x: p.x.clamp(self.x, self.x + self.w),
            y: p.y.clamp(self.y, self.y + self.h),
        }
    }
}

pub fn point_in_circle(point: Vec2, center: Vec2, radius: f64) -> bool {
    point.distance(center) < radius
}

/// A circle overlaps a rectangle when the rectangle's closest point lies
/// strictly inside the radius.
pub fn circle_hits_rect(center: Vec2, radius: f64, rect: &Rect) -> bool {
    rect.closest_point(center).distance(center) < radius
}

pub fn circle_hits_any(center: Vec2, radius: f64, rects: &[Rect]) -> bool {
    rects.iter().any(|r| circle_hits_rect(center, radius, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_clamps_outside_and_keeps_inside() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert_eq!(r.closest_point(Vec2::new(0.0, 15.0)), Vec2::new(10.0, 15.0));
        assert_eq!(r.closest_point(Vec2::new(40.0, 40.0)), Vec2::new(30.0, 20.0));
        assert_eq!(r.closest_point(Vec2::new(15.0, 12.0)), Vec2::new(15.0, 12.0));
    }

    #[test]
    fn circle_touching_edge_is_not_a_hit() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Exactly radius away from the right edge
        assert!(!circle_hits_rect(Vec2::new(25.0, 5.0), 15.0, &r));
        assert!(circle_hits_rect(Vec2::new(24.9, 5.0), 15.0, &r));
    }

    #[test]
    fn point_in_circle_is_strict() {
        let c = Vec2::new(0.0, 0.0);
        assert!(point_in_circle(Vec2::new(39.9, 0.0), c, 40.0));
        assert!(!point_in_circle(Vec2::new(40.0, 0.0), c, 40.0));
    }
}
