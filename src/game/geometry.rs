use nalgebra::{Point2, Vector2};
use crate::game::config::Footprint;

/// Axis-aligned box on the ground plane (x lateral, y forward). Height never takes part
/// in collision, so boxes are two dimensional.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl Aabb {
    pub fn new(min: Point2<f32>, max: Point2<f32>) -> Self {
        Aabb { min, max }
    }

    pub fn from_center(center: Point2<f32>, footprint: Footprint) -> Self {
        let half = Vector2::new(footprint.length / 2.0, footprint.width / 2.0);
        Aabb { min: center - half, max: center + half }
    }

    pub fn area(&self) -> f32 {
        let size = self.max - self.min;
        size.x.max(0.0) * size.y.max(0.0)
    }

    /// Strict overlap: boxes that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn intersection_area(&self, other: &Aabb) -> f32 {
        let dx = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let dy = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        if dx <= 0.0 || dy <= 0.0 {
            return 0.0;
        }
        dx * dy
    }

    /// Share of this box's own area covered by `other`, in `[0, 1]`.
    pub fn overlap_ratio(&self, other: &Aabb) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / area
    }
}
