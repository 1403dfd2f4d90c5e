//! Axis-aligned bounding boxes.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use rigcheck_spatial::Aabb;
///
/// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let b = Aabb::new(Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0));
/// assert!(!a.intersects(&b));
/// assert!((a.distance(&b) - 2.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates an AABB from two corners, reordering them if necessary.
    #[must_use]
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an AABB centered at `center` with the given half-extents.
    #[must_use]
    pub fn from_center(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Creates an AABB centered at the origin.
    #[must_use]
    pub fn from_half_extents(half_extents: Vector3<f32>) -> Self {
        Self::from_center(Point3::origin(), half_extents)
    }

    #[must_use]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn half_extents(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }

    /// Full size (dimensions) of the box.
    #[must_use]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Whether a point lies inside. Boundary points count as inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Whether this box intersects `other`. Touching boxes intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Distance between the closest points of the two boxes; zero when they
    /// intersect.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let gap = Vector3::from_fn(|i, _| {
            (other.min[i] - self.max[i])
                .max(self.min[i] - other.max[i])
                .max(0.0)
        });
        gap.norm()
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Component-wise scale about the local origin.
    #[must_use]
    pub fn scaled(&self, scale: &Vector3<f32>) -> Self {
        Self::new(
            Point3::from(self.min.coords.component_mul(scale)),
            Point3::from(self.max.coords.component_mul(scale)),
        )
    }

    /// Bounds of this box after a rigid transform.
    #[must_use]
    pub fn transformed(&self, pose: &Isometry3<f32>) -> Self {
        let center = pose * self.center();
        let rotation = pose.rotation.to_rotation_matrix();
        let half = rotation.matrix().abs() * self.half_extents();
        Self::from_center(center, half)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn unit_box_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_center(Point3::new(x, y, z), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn new_reorders_corners() {
        let aabb = Aabb::new(Point3::new(1.0, 2.0, 3.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn size_center_volume() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(aabb.volume(), 48.0);
    }

    #[test]
    fn contains_boundary() {
        let aabb = unit_box_at(0.0, 0.0, 0.0);
        assert!(aabb.contains(&Point3::new(0.5, 0.0, 0.0)));
        assert!(!aabb.contains(&Point3::new(0.51, 0.0, 0.0)));
    }

    #[test]
    fn touching_boxes_intersect() {
        assert!(unit_box_at(0.0, 0.0, 0.0).intersects(&unit_box_at(1.0, 0.0, 0.0)));
        assert!(!unit_box_at(0.0, 0.0, 0.0).intersects(&unit_box_at(1.01, 0.0, 0.0)));
    }

    #[test]
    fn distance_is_zero_when_intersecting() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(0.5, 0.5, 0.0);
        assert!(a.intersects(&b));
        assert!(a.distance(&b).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_along_one_axis() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(3.0, 0.0, 0.0);
        assert_relative_eq!(a.distance(&b), 2.0);
        assert_relative_eq!(b.distance(&a), 2.0);
    }

    #[test]
    fn distance_to_diagonal_corner() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 2.0, 0.0);
        assert_relative_eq!(a.distance(&b), 2.0_f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn union_covers_both() {
        let u = unit_box_at(0.0, 0.0, 0.0).union(&unit_box_at(2.0, 0.0, 0.0));
        assert_eq!(u.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(u.max, Point3::new(2.5, 0.5, 0.5));
    }

    #[test]
    fn scaled_handles_negative_factors() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let scaled = aabb.scaled(&Vector3::new(2.0, -1.0, 1.0));
        assert_eq!(scaled.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(scaled.max, Point3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn transformed_translation() {
        let pose = Isometry3::from_parts(Translation3::new(1.0, 2.0, 3.0), UnitQuaternion::identity());
        let t = unit_box_at(0.0, 0.0, 0.0).transformed(&pose);
        assert_relative_eq!(t.center(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(t.size(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn transformed_rotation_grows_bounds() {
        let aabb = Aabb::from_half_extents(Vector3::new(1.0, 0.1, 0.1));
        let pose = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2),
        );
        let t = aabb.transformed(&pose);
        assert_relative_eq!(t.half_extents(), Vector3::new(0.1, 1.0, 0.1), epsilon = 1e-5);
    }
}
