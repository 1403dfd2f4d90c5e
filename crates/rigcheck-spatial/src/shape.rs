//! Collision shapes in their local frame.

use nalgebra::{Isometry3, Vector3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;

/// A solid collision shape.
///
/// Capsules and cylinders are aligned with the local Z axis, matching URDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vector3<f32> },
    Capsule { radius: f32, half_height: f32 },
    Cylinder { radius: f32, half_height: f32 },
    /// Geometry known only by its local bounds (e.g. an unloaded mesh).
    Bounds(Aabb),
}

impl Shape {
    pub const fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from its full size.
    pub fn cuboid(size: Vector3<f32>) -> Self {
        Self::Box {
            half_extents: size.abs() * 0.5,
        }
    }

    /// Bounds of the shape in its own frame.
    pub fn local_aabb(&self) -> Aabb {
        match *self {
            Self::Sphere { radius } => Aabb::from_half_extents(Vector3::repeat(radius)),
            Self::Box { half_extents } => Aabb::from_half_extents(half_extents),
            Self::Capsule {
                radius,
                half_height,
            } => Aabb::from_half_extents(Vector3::new(radius, radius, half_height + radius)),
            Self::Cylinder {
                radius,
                half_height,
            } => Aabb::from_half_extents(Vector3::new(radius, radius, half_height)),
            Self::Bounds(aabb) => aabb,
        }
    }

    /// Bounds of the shape placed at `pose`.
    pub fn world_aabb(&self, pose: &Isometry3<f32>) -> Aabb {
        self.local_aabb().transformed(pose)
    }

    /// The shape with a per-axis scale applied.
    ///
    /// Round cross-sections stay round: the radius follows the larger of the
    /// two transverse factors (the largest factor overall for spheres).
    pub fn scaled(&self, scale: &Vector3<f32>) -> Self {
        let s = scale.abs();
        match *self {
            Self::Sphere { radius } => Self::Sphere {
                radius: radius * s.max(),
            },
            Self::Box { half_extents } => Self::Box {
                half_extents: half_extents.component_mul(&s),
            },
            Self::Capsule {
                radius,
                half_height,
            } => Self::Capsule {
                radius: radius * s.x.max(s.y),
                half_height: half_height * s.z,
            },
            Self::Cylinder {
                radius,
                half_height,
            } => Self::Cylinder {
                radius: radius * s.x.max(s.y),
                half_height: half_height * s.z,
            },
            Self::Bounds(aabb) => Self::Bounds(aabb.scaled(scale)),
        }
    }

    /// Whether every dimension is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        let aabb = self.local_aabb();
        let size = aabb.size();
        aabb.min.iter().chain(aabb.max.iter()).all(|v| v.is_finite())
            && size.iter().all(|v| *v >= 0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
