//! Terse constructors for robot descriptions.

use nalgebra::{Isometry3, Point3, Vector3};
use rigcheck_model::{ColliderDescription, JointDescription, JointKind, LinkDescription};
use rigcheck_spatial::{Aabb, Shape};

/// Pure translation.
pub fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
    Isometry3::translation(x, y, z)
}

/// A link whose renderable bounds and single box collider coincide: a box
/// of `size` centered at `center` in the link frame.
pub fn box_link(name: &str, size: [f32; 3], center: [f32; 3]) -> LinkDescription {
    let size = Vector3::from(size);
    let center = Point3::from(center);
    LinkDescription::new(name)
        .with_bounds(Aabb::from_center(center, size * 0.5))
        .with_collider(
            ColliderDescription::new(Shape::cuboid(size)).with_offset(at(center.x, center.y, center.z)),
        )
}

/// Same as [`box_link`], attached to `parent` at `origin`.
pub fn child_box(
    name: &str,
    parent: &str,
    origin: [f32; 3],
    size: [f32; 3],
    center: [f32; 3],
) -> LinkDescription {
    box_link(name, size, center)
        .with_parent(parent)
        .with_origin(at(origin[0], origin[1], origin[2]))
}

/// Revolute joint about `axis` limited to ±90 degrees.
pub fn revolute(name: &str, part: &str, axis: [f32; 3]) -> JointDescription {
    JointDescription::new(name, JointKind::Revolute, part)
        .with_axis(Vector3::from(axis))
        .with_limits(-90.0, 90.0)
}

pub fn fixed(name: &str, part: &str) -> JointDescription {
    JointDescription::new(name, JointKind::Fixed, part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_link_bounds_match_collider() {
        let link = box_link("b", [0.2, 0.4, 0.6], [0.0, 0.0, 0.3]);
        let bounds = link.bounds.unwrap();
        assert_relative_eq!(bounds.min, Point3::new(-0.1, -0.2, 0.0));
        assert_relative_eq!(bounds.max, Point3::new(0.1, 0.2, 0.6));
        let collider = &link.colliders[0];
        assert_relative_eq!(collider.offset.translation.vector, Vector3::new(0.0, 0.0, 0.3));
        assert_relative_eq!(collider.shape.local_aabb().size(), Vector3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn child_box_has_parent_and_origin() {
        let link = child_box("c", "p", [1.0, 0.0, 0.0], [0.1; 3], [0.0; 3]);
        assert_eq!(link.parent.as_deref(), Some("p"));
        assert_relative_eq!(link.origin.translation.vector, Vector3::new(1.0, 0.0, 0.0));
    }
}
