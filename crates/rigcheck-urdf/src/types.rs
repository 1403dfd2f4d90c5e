//! In-memory URDF representation.
//!
//! These types mirror URDF concepts with Rust-native types and keep the
//! file's declaration order, independent of the XML parsing layer.

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

use rigcheck_spatial::{Aabb, Shape};

use crate::error::UrdfError;

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis, with position limits.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
    /// Ball joint.
    Spherical,
    /// Unconstrained 6-DOF joint.
    Floating,
    /// Translation in a plane.
    Planar,
}

impl JointType {
    /// Whether this joint type has actuatable degrees of freedom.
    pub const fn is_actuated(self) -> bool {
        matches!(
            self,
            Self::Revolute | Self::Continuous | Self::Prismatic | Self::Spherical
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Revolute => "revolute",
            Self::Continuous => "continuous",
            Self::Prismatic => "prismatic",
            Self::Fixed => "fixed",
            Self::Spherical => "spherical",
            Self::Floating => "floating",
            Self::Planar => "planar",
        }
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Limits on a joint's motion, effort, and velocity.
#[derive(Debug, Clone, Default)]
pub struct JointLimits {
    /// Lower position limit (rad or m). `None` means unbounded.
    pub lower: Option<f32>,
    /// Upper position limit (rad or m). `None` means unbounded.
    pub upper: Option<f32>,
    /// Maximum effort (Nm or N).
    pub effort: f32,
    /// Maximum velocity (rad/s or m/s).
    pub velocity: f32,
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A 3D pose specified as position + roll-pitch-yaw.
#[derive(Debug, Clone, Default)]
pub struct Origin {
    /// Translation `[x, y, z]` in meters.
    pub xyz: [f32; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f32; 3],
}

impl Origin {
    pub fn to_isometry(&self) -> Isometry3<f32> {
        let translation = Translation3::new(self.xyz[0], self.xyz[1], self.xyz[2]);
        let rotation = Rotation3::from_matrix_unchecked(rotation_matrix_from_rpy(
            self.rpy[0],
            self.rpy[1],
            self.rpy[2],
        ));
        Isometry3::from_parts(translation, UnitQuaternion::from_rotation_matrix(&rotation))
    }
}

/// Rotation matrix from roll-pitch-yaw (extrinsic XYZ, i.e. `Rz * Ry * Rx`).
fn rotation_matrix_from_rpy(roll: f32, pitch: f32, yaw: f32) -> Matrix3<f32> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Geometric shape used for visual or collision elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32 },
    Box { size: [f32; 3] },
    Cylinder { radius: f32, length: f32 },
    Capsule { radius: f32, length: f32 },
    Mesh { filename: String, scale: [f32; 3] },
}

impl Geometry {
    /// Solid shape for primitive geometry; meshes have no known extent.
    pub fn to_shape(&self) -> Option<Shape> {
        self.to_shape_with(|_| Err(())).ok()
    }

    /// Solid shape, with `mesh_extent` supplying the unscaled vertex bounds
    /// of a mesh file. A mesh becomes [`Shape::Bounds`] of its scaled extent.
    pub fn to_shape_with<E>(
        &self,
        mesh_extent: impl FnOnce(&str) -> Result<Aabb, E>,
    ) -> Result<Shape, E> {
        match self {
            Self::Sphere { radius } => Ok(Shape::sphere(*radius)),
            Self::Box { size } => Ok(Shape::cuboid(Vector3::from(*size))),
            Self::Cylinder { radius, length } => Ok(Shape::Cylinder {
                radius: *radius,
                half_height: length * 0.5,
            }),
            Self::Capsule { radius, length } => Ok(Shape::Capsule {
                radius: *radius,
                half_height: length * 0.5,
            }),
            Self::Mesh { filename, scale } => {
                let extent = mesh_extent(filename)?;
                Ok(Shape::Bounds(extent.scaled(&Vector3::from(*scale))))
            }
        }
    }

    pub const fn is_mesh(&self) -> bool {
        matches!(self, Self::Mesh { .. })
    }
}

// ---------------------------------------------------------------------------
// Visual / Collision
// ---------------------------------------------------------------------------

/// A visual element of a link.
#[derive(Debug, Clone)]
pub struct Visual {
    pub origin: Origin,
    pub geometry: Geometry,
}

/// A collision element of a link.
#[derive(Debug, Clone)]
pub struct Collision {
    pub origin: Origin,
    pub geometry: Geometry,
}

/// Bounds of one placed element in the link frame.
fn element_bounds(origin: &Origin, shape: Option<Shape>) -> Option<Aabb> {
    shape.map(|shape| shape.world_aabb(&origin.to_isometry()))
}

// ---------------------------------------------------------------------------
// LinkData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF link.
#[derive(Debug, Clone)]
pub struct LinkData {
    pub name: String,
    pub visuals: Vec<Visual>,
    pub collisions: Vec<Collision>,
}

impl LinkData {
    /// Create a link with only a name (no geometry).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visuals: Vec::new(),
            collisions: Vec::new(),
        }
    }

    /// Union of the visual bounds, falling back to collision bounds when the
    /// link has no visual primitives.
    pub fn renderable_bounds(&self) -> Option<Aabb> {
        self.renderable_bounds_with(Geometry::to_shape)
    }

    /// [`renderable_bounds`](Self::renderable_bounds) with `shape_of`
    /// deciding each element's shape, so meshes can count once measured.
    pub fn renderable_bounds_with(
        &self,
        mut shape_of: impl FnMut(&Geometry) -> Option<Shape>,
    ) -> Option<Aabb> {
        let visual = self
            .visuals
            .iter()
            .filter_map(|v| element_bounds(&v.origin, shape_of(&v.geometry)))
            .reduce(|a, b| a.union(&b));
        if visual.is_some() {
            return visual;
        }
        self.collisions
            .iter()
            .filter_map(|c| element_bounds(&c.origin, shape_of(&c.geometry)))
            .reduce(|a, b| a.union(&b))
    }
}

// ---------------------------------------------------------------------------
// JointData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF joint.
#[derive(Debug, Clone)]
pub struct JointData {
    pub name: String,
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint origin relative to parent link.
    pub origin: Origin,
    /// Joint axis (default `[0, 0, 1]`).
    pub axis: [f32; 3],
    pub limits: JointLimits,
}

// ---------------------------------------------------------------------------
// UrdfRobot
// ---------------------------------------------------------------------------

/// Complete in-memory representation of a URDF robot.
#[derive(Debug, Clone)]
pub struct UrdfRobot {
    pub name: String,
    /// Links in declaration order.
    pub links: Vec<LinkData>,
    /// Joints in declaration order.
    pub joints: Vec<JointData>,
    /// Name of the root link (the first one never referenced as a child).
    pub root_link: String,
}

impl UrdfRobot {
    pub fn link(&self, name: &str) -> Result<&LinkData, UrdfError> {
        self.links
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| UrdfError::MissingLink(name.into()))
    }

    pub fn joint(&self, name: &str) -> Result<&JointData, UrdfError> {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| UrdfError::MissingJoint(name.into()))
    }

    /// The joint whose child is `link`.
    pub fn parent_joint(&self, link: &str) -> Option<&JointData> {
        self.joints.iter().find(|j| j.child == link)
    }

    /// Iterate over actuatable joints.
    pub fn actuated_joints(&self) -> impl Iterator<Item = &JointData> {
        self.joints.iter().filter(|j| j.joint_type.is_actuated())
    }

    /// Number of actuatable degrees of freedom.
    pub fn dof(&self) -> usize {
        self.actuated_joints().count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
