//! Conversion from [`UrdfRobot`] to the model's [`RobotDescription`].
//!
//! Each URDF joint becomes the origin of its child link plus a
//! [`JointDescription`]. Rotational limits are converted to degrees;
//! prismatic limits stay in meters. Mesh geometry is measured through a
//! [`MeshLoader`]; a mesh that cannot be read is left out and named on its
//! link.

use std::collections::{HashMap, HashSet, VecDeque};

use nalgebra::Vector3;
use tracing::warn;

use rigcheck_model::{
    ColliderDescription, JointDescription, JointKind, LinkDescription, RobotDescription,
};

use crate::error::UrdfError;
use crate::mesh::MeshLoader;
use crate::types::{Geometry, JointData, JointType, LinkData, UrdfRobot};

/// Builds a description with links in breadth-first order from the root.
/// Relative mesh paths are read from the working directory.
pub fn to_description(robot: &UrdfRobot) -> Result<RobotDescription, UrdfError> {
    to_description_with(robot, &mut MeshLoader::default())
}

/// [`to_description`] with mesh files read through `meshes`.
pub fn to_description_with(
    robot: &UrdfRobot,
    meshes: &mut MeshLoader,
) -> Result<RobotDescription, UrdfError> {
    let mut children: HashMap<&str, Vec<&JointData>> = HashMap::new();
    let mut parented: HashSet<&str> = HashSet::new();
    for joint in &robot.joints {
        robot.link(&joint.parent)?;
        robot.link(&joint.child)?;
        if !parented.insert(joint.child.as_str()) {
            return Err(UrdfError::MultipleParents(joint.child.clone()));
        }
        children.entry(joint.parent.as_str()).or_default().push(joint);
    }

    let mut description = RobotDescription::new(robot.name.clone());
    let root = robot.link(&robot.root_link)?;
    description.links.push(convert_link(root, None, meshes)?);

    let mut queue = VecDeque::from([root.name.as_str()]);
    while let Some(parent) = queue.pop_front() {
        for &joint in children.get(parent).into_iter().flatten() {
            let kind = joint_kind(joint)?;
            let child = robot.link(&joint.child)?;
            description.links.push(convert_link(child, Some(joint), meshes)?);
            description.joints.push(convert_joint(joint, kind));
            queue.push_back(child.name.as_str());
        }
    }

    if let Some(orphan) = robot
        .links
        .iter()
        .find(|l| description.link(&l.name).is_none())
    {
        return Err(UrdfError::Disconnected(orphan.name.clone()));
    }
    Ok(description)
}

fn joint_kind(joint: &JointData) -> Result<JointKind, UrdfError> {
    match joint.joint_type {
        JointType::Revolute => Ok(JointKind::Revolute),
        JointType::Continuous => Ok(JointKind::Continuous),
        JointType::Prismatic => Ok(JointKind::Prismatic),
        JointType::Fixed => Ok(JointKind::Fixed),
        JointType::Spherical => Ok(JointKind::Spherical),
        JointType::Floating | JointType::Planar => Err(UrdfError::UnsupportedJointType(format!(
            "{} ({})",
            joint.joint_type.label(),
            joint.name
        ))),
    }
}

fn convert_joint(joint: &JointData, kind: JointKind) -> JointDescription {
    let to_model_units = |v: f32| if kind.is_prismatic() { v } else { v.to_degrees() };
    let mut description = JointDescription::new(joint.name.clone(), kind, joint.child.clone())
        .with_axis(Vector3::from(joint.axis))
        .with_caps(joint.limits.effort, joint.limits.velocity);
    if let (Some(lower), Some(upper)) = (joint.limits.lower, joint.limits.upper) {
        description = description.with_limits(to_model_units(lower), to_model_units(upper));
    }
    description
}

fn convert_link(
    link: &LinkData,
    joint: Option<&JointData>,
    meshes: &mut MeshLoader,
) -> Result<LinkDescription, UrdfError> {
    let mut description = LinkDescription::new(link.name.clone());
    if let Some(joint) = joint {
        description = description
            .with_parent(joint.parent.clone())
            .with_origin(joint.origin.to_isometry());
    }

    for element in link.visuals.iter().map(|v| &v.geometry) {
        check_geometry(&link.name, element)?;
    }
    for collision in &link.collisions {
        check_geometry(&link.name, &collision.geometry)?;
    }

    let mut unreadable: Vec<String> = Vec::new();
    let mut shape_of = |geometry: &Geometry| match meshes.shape_of(geometry) {
        Ok(shape) => Some(shape),
        Err(err) => {
            if let Geometry::Mesh { filename, .. } = geometry {
                if !unreadable.contains(filename) {
                    warn!(link = %link.name, %err, "skipping unreadable mesh");
                    unreadable.push(filename.clone());
                }
            }
            None
        }
    };

    for collision in &link.collisions {
        if let Some(shape) = shape_of(&collision.geometry) {
            description = description.with_collider(
                ColliderDescription::new(shape).with_offset(collision.origin.to_isometry()),
            );
        }
    }
    if let Some(bounds) = link.renderable_bounds_with(&mut shape_of) {
        description = description.with_bounds(bounds);
    }
    for filename in unreadable {
        description = description.with_unreadable_mesh(filename);
    }
    Ok(description)
}

fn check_geometry(link: &str, geometry: &Geometry) -> Result<(), UrdfError> {
    let dims: Vec<f32> = match geometry {
        Geometry::Sphere { radius } => vec![*radius],
        Geometry::Box { size } => size.to_vec(),
        Geometry::Cylinder { radius, length } | Geometry::Capsule { radius, length } => {
            vec![*radius, *length]
        }
        Geometry::Mesh { scale, .. } => scale.to_vec(),
    };
    if dims.iter().all(|d| d.is_finite() && *d >= 0.0) {
        Ok(())
    } else {
        Err(UrdfError::InvalidGeometry(format!(
            "link '{link}' has a negative or non-finite dimension"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
