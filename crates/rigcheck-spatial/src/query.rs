//! The spatial query seam and its parry-backed implementation.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::parry::query;
use rapier3d::parry::shape::SharedShape;

use crate::aabb::Aabb;
use crate::shape::Shape;

// ---------------------------------------------------------------------------
// SpatialQueryProvider
// ---------------------------------------------------------------------------

/// Overlap and proximity queries used by the validation checks.
pub trait SpatialQueryProvider {
    /// Penetration depth if the two placed shapes overlap, `None` otherwise.
    ///
    /// Touching shapes (zero depth) do not overlap.
    fn overlap(
        &self,
        a: &Shape,
        pose_a: &Isometry3<f32>,
        b: &Shape,
        pose_b: &Isometry3<f32>,
    ) -> Option<f32>;

    /// Whether two bounding volumes intersect.
    fn bounds_intersect(&self, a: &Aabb, b: &Aabb) -> bool {
        a.intersects(b)
    }

    /// Distance between the closest points of two bounding volumes.
    fn closest_point_distance(&self, a: &Aabb, b: &Aabb) -> f32 {
        a.distance(b)
    }
}

impl<T: SpatialQueryProvider + ?Sized> SpatialQueryProvider for &T {
    fn overlap(
        &self,
        a: &Shape,
        pose_a: &Isometry3<f32>,
        b: &Shape,
        pose_b: &Isometry3<f32>,
    ) -> Option<f32> {
        (**self).overlap(a, pose_a, b, pose_b)
    }

    fn bounds_intersect(&self, a: &Aabb, b: &Aabb) -> bool {
        (**self).bounds_intersect(a, b)
    }

    fn closest_point_distance(&self, a: &Aabb, b: &Aabb) -> f32 {
        (**self).closest_point_distance(a, b)
    }
}

impl<T: SpatialQueryProvider + ?Sized> SpatialQueryProvider for Box<T> {
    fn overlap(
        &self,
        a: &Shape,
        pose_a: &Isometry3<f32>,
        b: &Shape,
        pose_b: &Isometry3<f32>,
    ) -> Option<f32> {
        (**self).overlap(a, pose_a, b, pose_b)
    }

    fn bounds_intersect(&self, a: &Aabb, b: &Aabb) -> bool {
        (**self).bounds_intersect(a, b)
    }

    fn closest_point_distance(&self, a: &Aabb, b: &Aabb) -> f32 {
        (**self).closest_point_distance(a, b)
    }
}

// ---------------------------------------------------------------------------
// ContactQuery
// ---------------------------------------------------------------------------

/// Exact narrow phase backed by parry's contact queries.
///
/// Every primitive keeps its true surface: cylinders stay round and
/// capsules are never widened to boxes. `Shape::Bounds` is a box by
/// definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactQuery;

impl SpatialQueryProvider for ContactQuery {
    fn overlap(
        &self,
        a: &Shape,
        pose_a: &Isometry3<f32>,
        b: &Shape,
        pose_b: &Isometry3<f32>,
    ) -> Option<f32> {
        if !a.is_well_formed() || !b.is_well_formed() {
            return None;
        }
        // Broad phase.
        if !a.world_aabb(pose_a).intersects(&b.world_aabb(pose_b)) {
            return None;
        }
        let (shape_a, local_a) = to_parry(a);
        let (shape_b, local_b) = to_parry(b);
        let contact = query::contact(
            &(pose_a * local_a),
            &*shape_a,
            &(pose_b * local_b),
            &*shape_b,
            0.0,
        )
        .ok()
        .flatten()?;
        let depth = -contact.dist;
        (depth > 0.0).then_some(depth)
    }
}

/// The parry shape for `shape` and its placement in the shape's frame.
///
/// Parry cylinders run along Y; ours run along Z like URDF.
fn to_parry(shape: &Shape) -> (SharedShape, Isometry3<f32>) {
    match *shape {
        Shape::Sphere { radius } => (SharedShape::ball(radius), Isometry3::identity()),
        Shape::Box { half_extents: h } => (SharedShape::cuboid(h.x, h.y, h.z), Isometry3::identity()),
        Shape::Capsule {
            radius,
            half_height,
        } => (SharedShape::capsule_z(half_height, radius), Isometry3::identity()),
        Shape::Cylinder {
            radius,
            half_height,
        } => (
            SharedShape::cylinder(half_height, radius),
            Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
            ),
        ),
        Shape::Bounds(aabb) => {
            let h = aabb.half_extents();
            let c = aabb.center();
            (
                SharedShape::cuboid(h.x, h.y, h.z),
                Isometry3::translation(c.x, c.y, c.z),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
        Isometry3::translation(x, y, z)
    }

    fn unit_cube() -> Shape {
        Shape::cuboid(Vector3::new(1.0, 1.0, 1.0))
    }

    fn drum() -> Shape {
        Shape::Cylinder {
            radius: 0.5,
            half_height: 0.5,
        }
    }

    fn rod() -> Shape {
        Shape::Capsule {
            radius: 0.1,
            half_height: 0.5,
        }
    }

    // -- Sphere pairs --

    #[test]
    fn sphere_sphere_overlap_depth() {
        let q = ContactQuery;
        let depth = q
            .overlap(&Shape::sphere(0.5), &at(0.0, 0.0, 0.0), &Shape::sphere(0.5), &at(0.8, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn sphere_sphere_touching_is_not_overlap() {
        let q = ContactQuery;
        assert!(q
            .overlap(&Shape::sphere(0.5), &at(0.0, 0.0, 0.0), &Shape::sphere(0.5), &at(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn sphere_box_face_contact() {
        let q = ContactQuery;
        let depth = q
            .overlap(&Shape::sphere(0.2), &at(0.6, 0.0, 0.0), &unit_cube(), &at(0.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn sphere_center_inside_box() {
        let q = ContactQuery;
        let depth = q
            .overlap(&unit_cube(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.1), &at(0.3, 0.0, 0.0))
            .unwrap();
        // 0.2 to the +x face plus the radius.
        assert_relative_eq!(depth, 0.3, epsilon = 1e-5);
    }

    #[test]
    fn sphere_capsule_side_contact() {
        let q = ContactQuery;
        let depth = q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.1), &at(0.15, 0.0, 0.3))
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-5);
    }

    // -- Capsules --

    #[test]
    fn parallel_capsules() {
        let q = ContactQuery;
        let depth = q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &rod(), &at(0.15, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-5);
        assert!(q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &rod(), &at(0.25, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn crossed_capsules() {
        let q = ContactQuery;
        let rotated = Isometry3::from_parts(
            Translation3::new(0.15, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        );
        let depth = q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &rod(), &rotated)
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-4);
    }

    #[test]
    fn capsule_clear_of_box_edge() {
        // The box edge at (0.08, 0.08) is 0.113 from the capsule axis, beyond
        // its 0.1 radius, although the capsule's bounding box reaches it.
        let q = ContactQuery;
        assert!(q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.58, 0.58, 0.0))
            .is_none());
        let depth = q
            .overlap(&rod(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.55, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-4);
    }

    // -- Boxes --

    #[test]
    fn box_box_axis_aligned_overlap() {
        let q = ContactQuery;
        let depth = q
            .overlap(&unit_cube(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.9, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn box_box_separated() {
        let q = ContactQuery;
        assert!(q
            .overlap(&unit_cube(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(1.5, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn rotated_box_separated_by_face_axis() {
        // A 45 degree box whose AABB overlaps but whose faces do not.
        let q = ContactQuery;
        let rotated = Isometry3::from_parts(
            Translation3::new(1.2, 1.2, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_4),
        );
        assert!(q
            .overlap(&unit_cube(), &at(0.0, 0.0, 0.0), &unit_cube(), &rotated)
            .is_none());
    }

    #[test]
    fn bounds_shape_is_its_offset_box() {
        let q = ContactQuery;
        let bounds = Shape::Bounds(Aabb::new(Point3::new(1.0, -0.5, -0.5), Point3::new(2.0, 0.5, 0.5)));
        assert!(q
            .overlap(&bounds, &at(0.0, 0.0, 0.0), &Shape::sphere(0.3), &at(0.0, 0.0, 0.0))
            .is_none());
        let depth = q
            .overlap(&bounds, &at(0.0, 0.0, 0.0), &Shape::sphere(0.3), &at(0.8, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.1, epsilon = 1e-5);
    }

    // -- Cylinders --

    #[test]
    fn sphere_beside_cylinder_corner_is_clear() {
        // Inside the cylinder's bounding box but 0.086 from its round side.
        let q = ContactQuery;
        assert!(q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.05), &at(0.45, 0.45, 0.0))
            .is_none());
    }

    #[test]
    fn sphere_against_cylinder_side() {
        let q = ContactQuery;
        let depth = q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.1), &at(0.3, 0.3, 0.0))
            .unwrap();
        // Center 0.4243 from the axis: 0.0757 to the side plus the radius.
        assert_relative_eq!(depth, 0.6 - 0.18_f32.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn cylinder_axis_is_local_z() {
        let q = ContactQuery;
        let depth = q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.1), &at(0.0, 0.0, 0.55))
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-4);
        assert!(q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &Shape::sphere(0.1), &at(0.0, 0.0, 0.65))
            .is_none());
    }

    #[test]
    fn cylinder_clear_of_box_corner() {
        // Box corner at (0.4, 0.4) lies 0.566 from the axis.
        let q = ContactQuery;
        assert!(q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.9, 0.9, 0.0))
            .is_none());
        let depth = q
            .overlap(&drum(), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.95, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(depth, 0.05, epsilon = 1e-4);
    }

    // -- Guards --

    #[test]
    fn malformed_shape_never_overlaps() {
        let q = ContactQuery;
        assert!(q
            .overlap(&Shape::sphere(f32::NAN), &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn overlap_is_symmetric() {
        let q = ContactQuery;
        let capsule = Shape::Capsule {
            radius: 0.2,
            half_height: 0.3,
        };
        let ab = q.overlap(&capsule, &at(0.0, 0.0, 0.0), &unit_cube(), &at(0.6, 0.0, 0.0));
        let ba = q.overlap(&unit_cube(), &at(0.6, 0.0, 0.0), &capsule, &at(0.0, 0.0, 0.0));
        assert_relative_eq!(ab.unwrap(), 0.1, epsilon = 1e-4);
        assert_relative_eq!(ab.unwrap(), ba.unwrap(), epsilon = 1e-4);
    }

    // -- Bounds queries --

    #[test]
    fn default_bounds_queries_delegate_to_aabb() {
        let q = ContactQuery;
        let a = Aabb::from_center(Point3::origin(), Vector3::repeat(0.5));
        let b = Aabb::from_center(Point3::new(2.0, 0.0, 0.0), Vector3::repeat(0.5));
        assert!(!q.bounds_intersect(&a, &b));
        assert_relative_eq!(q.closest_point_distance(&a, &b), 1.0);
    }

    #[test]
    fn boxed_provider_forwards() {
        let q: Box<dyn SpatialQueryProvider> = Box::new(ContactQuery);
        assert!(q
            .overlap(&Shape::sphere(1.0), &at(0.0, 0.0, 0.0), &Shape::sphere(1.0), &at(1.0, 0.0, 0.0))
            .is_some());
    }
}
