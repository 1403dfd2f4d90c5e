//! URDF XML parsing using `urdf-rs`.
//!
//! Converts `urdf_rs` types into the crate's [`UrdfRobot`] representation.

// All conversions from urdf-rs f64 to f32 are intentional truncations.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;
use std::path::Path;

use crate::error::UrdfError;
use crate::types::{
    Collision, Geometry, JointData, JointLimits, JointType, LinkData, Origin, UrdfRobot, Visual,
};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a URDF file from disk into a [`UrdfRobot`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<UrdfRobot, UrdfError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| UrdfError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a URDF XML string into a [`UrdfRobot`].
pub fn parse_string(xml: &str) -> Result<UrdfRobot, UrdfError> {
    let robot = urdf_rs::read_from_string(xml).map_err(|e| UrdfError::Parse(e.to_string()))?;
    convert_robot(&robot)
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn convert_robot(robot: &urdf_rs::Robot) -> Result<UrdfRobot, UrdfError> {
    let links: Vec<LinkData> = robot.links.iter().map(convert_link).collect();
    let joints: Vec<JointData> = robot.joints.iter().map(convert_joint).collect();

    // Root link = the first link that is never a child of any joint.
    let child_links: HashSet<&str> = joints.iter().map(|j| j.child.as_str()).collect();
    let root_link = links
        .iter()
        .find(|l| !child_links.contains(l.name.as_str()))
        .ok_or(UrdfError::NoRootLink)?
        .name
        .clone();

    Ok(UrdfRobot {
        name: robot.name.clone(),
        links,
        joints,
        root_link,
    })
}

fn convert_link(link: &urdf_rs::Link) -> LinkData {
    LinkData {
        name: link.name.clone(),
        visuals: link.visual.iter().map(convert_visual).collect(),
        collisions: link.collision.iter().map(convert_collision).collect(),
    }
}

fn convert_joint(joint: &urdf_rs::Joint) -> JointData {
    JointData {
        name: joint.name.clone(),
        joint_type: convert_joint_type(&joint.joint_type),
        parent: joint.parent.link.clone(),
        child: joint.child.link.clone(),
        origin: convert_pose(&joint.origin),
        axis: vec3_to_f32(&joint.axis.xyz),
        limits: convert_limits(&joint.limit),
    }
}

const fn convert_joint_type(jt: &urdf_rs::JointType) -> JointType {
    match jt {
        urdf_rs::JointType::Revolute => JointType::Revolute,
        urdf_rs::JointType::Continuous => JointType::Continuous,
        urdf_rs::JointType::Prismatic => JointType::Prismatic,
        urdf_rs::JointType::Fixed => JointType::Fixed,
        urdf_rs::JointType::Floating => JointType::Floating,
        urdf_rs::JointType::Planar => JointType::Planar,
        urdf_rs::JointType::Spherical => JointType::Spherical,
    }
}

fn convert_limits(limit: &urdf_rs::JointLimit) -> JointLimits {
    // urdf-rs defaults lower/upper to 0.0 for joints without limits.
    // Both zero is read as "no position limits".
    let has_limits = (limit.lower - limit.upper).abs() > f64::EPSILON;
    JointLimits {
        lower: has_limits.then_some(limit.lower as f32),
        upper: has_limits.then_some(limit.upper as f32),
        effort: limit.effort as f32,
        velocity: limit.velocity as f32,
    }
}

fn convert_pose(pose: &urdf_rs::Pose) -> Origin {
    Origin {
        xyz: vec3_to_f32(&pose.xyz),
        rpy: vec3_to_f32(&pose.rpy),
    }
}

fn convert_visual(visual: &urdf_rs::Visual) -> Visual {
    Visual {
        origin: convert_pose(&visual.origin),
        geometry: convert_geometry(&visual.geometry),
    }
}

fn convert_collision(collision: &urdf_rs::Collision) -> Collision {
    Collision {
        origin: convert_pose(&collision.origin),
        geometry: convert_geometry(&collision.geometry),
    }
}

fn convert_geometry(geom: &urdf_rs::Geometry) -> Geometry {
    match geom {
        urdf_rs::Geometry::Sphere { radius } => Geometry::Sphere {
            radius: *radius as f32,
        },
        urdf_rs::Geometry::Box { size } => Geometry::Box {
            size: vec3_to_f32(size),
        },
        urdf_rs::Geometry::Cylinder { radius, length } => Geometry::Cylinder {
            radius: *radius as f32,
            length: *length as f32,
        },
        urdf_rs::Geometry::Capsule { radius, length } => Geometry::Capsule {
            radius: *radius as f32,
            length: *length as f32,
        },
        urdf_rs::Geometry::Mesh { filename, scale } => Geometry::Mesh {
            filename: filename.clone(),
            scale: scale.as_ref().map_or([1.0, 1.0, 1.0], |s| vec3_to_f32(s)),
        },
    }
}

const fn vec3_to_f32(v: &[f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
