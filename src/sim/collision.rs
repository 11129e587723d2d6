//! Collision detection for axis-aligned boxes and spike triangles
//!
//! Spikes use a sampled test: the four corners of the player box against the
//! triangle, plus the triangle apex against the box. Deep overlaps that miss
//! all five samples are not reported; the levels are authored around that.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Denominators below this are treated as a degenerate triangle
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Axis-aligned rectangle (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Corners in order: top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ]
    }

    /// Edge-inclusive point containment
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Spike triangle inscribed in this box: bottom-left, top-center, bottom-right
    pub fn spike_triangle(&self) -> [Vec2; 3] {
        [
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.left() + self.size.x / 2.0, self.top()),
            Vec2::new(self.right(), self.bottom()),
        ]
    }
}

/// Strict overlap test; boxes that only share an edge do not collide
#[inline]
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Barycentric point-in-triangle test, edges inclusive
///
/// A collinear triangle has no interior and never contains anything.
pub fn point_in_triangle(p: Vec2, t1: Vec2, t2: Vec2, t3: Vec2) -> bool {
    let denominator = (t2.y - t3.y) * (t1.x - t3.x) + (t3.x - t2.x) * (t1.y - t3.y);
    if denominator.abs() < DEGENERATE_EPSILON {
        return false;
    }

    let a = ((t2.y - t3.y) * (p.x - t3.x) + (t3.x - t2.x) * (p.y - t3.y)) / denominator;
    let b = ((t3.y - t1.y) * (p.x - t3.x) + (t1.x - t3.x) * (p.y - t3.y)) / denominator;
    let c = 1.0 - a - b;

    (0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b) && (0.0..=1.0).contains(&c)
}

/// Check a box against the spike triangle inscribed in `spike`
pub fn triangle_collision(rect: &Rect, spike: &Rect) -> bool {
    let [t1, apex, t3] = spike.spike_triangle();

    if rect
        .corners()
        .iter()
        .any(|&corner| point_in_triangle(corner, t1, apex, t3))
    {
        return true;
    }

    // Box swallowing the tip touches no corner sample
    rect.contains_point(apex)
}

/// True when the player's feet are at or just below the obstacle top while
/// not rising
pub fn is_landing_on_top(player: &Rect, velocity_y: f32, obstacle: &Rect, tolerance: f32) -> bool {
    let feet = player.bottom();
    feet >= obstacle.top() && feet <= obstacle.top() + tolerance && velocity_y >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spike() -> Rect {
        Rect::new(200.0, 360.0, 40.0, 40.0)
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!rect_overlap(&a, &Rect::new(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!rect_overlap(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!rect_overlap(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_point_in_triangle_edges_inclusive() {
        let [t1, t2, t3] = spike().spike_triangle();
        // Vertices and base edge are inside
        assert!(point_in_triangle(t1, t1, t2, t3));
        assert!(point_in_triangle(t2, t1, t2, t3));
        assert!(point_in_triangle(Vec2::new(220.0, 400.0), t1, t2, t3));
        // Top corners of the bounding box are outside
        assert!(!point_in_triangle(Vec2::new(200.0, 360.0), t1, t2, t3));
        assert!(!point_in_triangle(Vec2::new(240.0, 360.0), t1, t2, t3));
    }

    #[test]
    fn test_degenerate_triangle_never_contains() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(5.0, 5.0);
        let c = Vec2::new(10.0, 10.0);
        assert!(!point_in_triangle(Vec2::new(5.0, 5.0), a, b, c));
        assert!(!point_in_triangle(a, a, a, a));
    }

    #[test]
    fn test_rect_centered_on_apex_collides() {
        let apex = spike().spike_triangle()[1];
        let rect = Rect::new(apex.x - 20.0, apex.y - 20.0, 40.0, 40.0);
        assert!(triangle_collision(&rect, &spike()));
    }

    #[test]
    fn test_rect_above_spike_misses() {
        let rect = Rect::new(200.0, 300.0, 40.0, 40.0);
        assert!(!triangle_collision(&rect, &spike()));
    }

    #[test]
    fn test_apex_branch_catches_corner_near_miss() {
        // Wide box whose bottom edge dips 2 units past the tip: both bottom
        // corners sit outside the triangle's sloped sides
        let rect = Rect::new(190.0, 322.0, 60.0, 40.0);
        for corner in rect.corners() {
            let [t1, t2, t3] = spike().spike_triangle();
            assert!(!point_in_triangle(corner, t1, t2, t3));
        }
        assert!(triangle_collision(&rect, &spike()));
    }

    #[test]
    fn test_corner_inside_spike_collides() {
        // Player bottom-right corner inside the left slope region near the base
        let rect = Rect::new(180.0, 355.0, 40.0, 40.0);
        assert!(triangle_collision(&rect, &spike()));
    }

    #[test]
    fn test_box_beside_spike_slope_misses() {
        // Overlaps the bounding box only in the empty top-left corner
        let rect = Rect::new(170.0, 330.0, 35.0, 35.0);
        assert!(rect_overlap(&rect, &spike()));
        assert!(!triangle_collision(&rect, &spike()));
    }

    #[test]
    fn test_landing_on_top() {
        let platform = Rect::new(200.0, 360.0, 40.0, 40.0);
        let feet_at = |y: f32| Rect::new(200.0, y - 40.0, 40.0, 40.0);

        assert!(is_landing_on_top(&feet_at(360.0), 0.0, &platform, 15.0));
        assert!(is_landing_on_top(&feet_at(375.0), 4.0, &platform, 15.0));
        // Too deep
        assert!(!is_landing_on_top(&feet_at(376.0), 4.0, &platform, 15.0));
        // Still rising
        assert!(!is_landing_on_top(&feet_at(365.0), -2.0, &platform, 15.0));
        // Above the surface
        assert!(!is_landing_on_top(&feet_at(359.0), 2.0, &platform, 15.0));
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..200.0, 0.0f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_rect_overlap_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(rect_overlap(&a, &b), rect_overlap(&b, &a));
        }

        #[test]
        fn prop_box_holding_apex_always_collides(
            spike in arb_rect().prop_filter("non-degenerate", |r| r.size.x > 1.0 && r.size.y > 1.0),
            dx in 0.0f32..0.9,
            dy in 0.0f32..0.9,
            w in 1.0f32..100.0,
            h in 1.0f32..100.0,
        ) {
            let apex = spike.spike_triangle()[1];
            let rect = Rect::new(apex.x - dx * w, apex.y - dy * h, w, h);
            prop_assert!(triangle_collision(&rect, &spike));
        }

        #[test]
        fn prop_box_above_spike_never_collides(
            spike in arb_rect().prop_filter("non-degenerate", |r| r.size.x > 1.0 && r.size.y > 1.0),
            gap in 0.0f32..100.0,
            h in 1.0f32..100.0,
        ) {
            let rect = Rect::new(spike.pos.x, spike.top() - gap - h - 0.01, spike.size.x, h);
            prop_assert!(!triangle_collision(&rect, &spike));
        }
    }
}
