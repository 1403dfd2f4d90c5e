//! The discovered robot: links ordered parents-first, joints, colliders and
//! forward kinematics over the current joint state.

use std::collections::{HashMap, HashSet, VecDeque};

use nalgebra::{Isometry3, Translation3, Vector3};

use rigcheck_core::types::{JointId, JointSetting, PartId, PartRef};
use rigcheck_spatial::{Aabb, Shape};

use crate::adjacency::Hierarchy;
use crate::error::DescriptionError;
use crate::joint::JointActuator;
use crate::link::LinkGeometry;
use crate::source::RobotDescription;

#[allow(clippy::cast_possible_truncation)]
const fn part_id(index: usize) -> PartId {
    PartId(index as u32)
}

#[allow(clippy::cast_possible_truncation)]
const fn joint_id(index: usize) -> JointId {
    JointId(index as u32)
}

// ---------------------------------------------------------------------------
// Collider
// ---------------------------------------------------------------------------

/// A collision shape owned by exactly one link.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub owner: PartId,
    pub shape: Shape,
    /// Placement in the owner's frame, before link scaling.
    pub offset: Isometry3<f32>,
}

// ---------------------------------------------------------------------------
// PoseSnapshot
// ---------------------------------------------------------------------------

/// World poses of every link, taken at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSnapshot {
    poses: Vec<Isometry3<f32>>,
}

impl PoseSnapshot {
    /// Pose of a link; identity for unknown ids.
    pub fn pose(&self, part: PartId) -> Isometry3<f32> {
        self.poses
            .get(part.index())
            .copied()
            .unwrap_or_else(Isometry3::identity)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RobotModel
// ---------------------------------------------------------------------------

/// The joint/link/collider graph of one robot.
///
/// Topology is fixed at construction; only joint and link state changes.
/// `links()[0]` is the root and every link appears after its parent.
#[derive(Debug, Clone)]
pub struct RobotModel {
    name: String,
    links: Vec<LinkGeometry>,
    joints: Vec<JointActuator>,
    colliders: Vec<Collider>,
    link_index: HashMap<String, PartId>,
    joint_index: HashMap<String, JointId>,
    /// Joint moving each link, indexed by part.
    joint_of_part: Vec<Option<JointId>>,
}

impl RobotModel {
    /// Builds the model from a description, capturing every joint's
    /// baseline angle.
    pub fn from_description(description: &RobotDescription) -> Result<Self, DescriptionError> {
        let order = link_order(description)?;

        // Description index -> part id.
        let mut part_of_desc = vec![PartId(0); description.links.len()];
        for (position, &desc_index) in order.iter().enumerate() {
            part_of_desc[desc_index] = part_id(position);
        }
        let link_index: HashMap<String, PartId> = description
            .links
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), part_of_desc[i]))
            .collect();

        let mut links = Vec::with_capacity(order.len());
        let mut colliders = Vec::new();
        for &desc_index in &order {
            let desc = &description.links[desc_index];
            let id = part_of_desc[desc_index];
            let parent = desc
                .parent
                .as_ref()
                .and_then(|p| link_index.get(p).copied());
            links.push(LinkGeometry::new(
                id,
                desc.name.clone(),
                parent,
                desc.origin,
                desc.bounds,
                desc.local_scale,
            )
            .with_unreadable_meshes(desc.unreadable_meshes.clone()));
            colliders.extend(desc.colliders.iter().map(|c| Collider {
                owner: id,
                shape: c.shape.clone(),
                offset: c.offset,
            }));
        }

        let mut joints = Vec::with_capacity(description.joints.len());
        let mut joint_index = HashMap::new();
        let mut joint_of_part: Vec<Option<JointId>> = vec![None; links.len()];
        for (i, desc) in description.joints.iter().enumerate() {
            let id = joint_id(i);
            if joint_index.insert(desc.name.clone(), id).is_some() {
                return Err(DescriptionError::DuplicateJoint(desc.name.clone()));
            }
            let part = *link_index
                .get(&desc.part)
                .ok_or_else(|| DescriptionError::UnknownJointPart {
                    joint: desc.name.clone(),
                    part: desc.part.clone(),
                })?;
            if part.index() == 0 {
                return Err(DescriptionError::RootJoint {
                    joint: desc.name.clone(),
                    part: desc.part.clone(),
                });
            }
            if let Some(existing) = joint_of_part[part.index()] {
                return Err(DescriptionError::SharedJointPart {
                    part: desc.part.clone(),
                    first: description.joints[existing.index()].name.clone(),
                    second: desc.name.clone(),
                });
            }
            joint_of_part[part.index()] = Some(id);

            let mut joint =
                JointActuator::new(id, desc.name.clone(), desc.kind, part, desc.axis, desc.limits)
                    .with_caps(desc.max_effort, desc.max_velocity);
            joint.capture_baseline(desc.initial_angle);
            joints.push(joint);
        }

        Ok(Self {
            name: description.name.clone(),
            links,
            joints,
            colliders,
            link_index,
            joint_index,
            joint_of_part,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &LinkGeometry {
        &self.links[0]
    }

    pub fn links(&self) -> &[LinkGeometry] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [LinkGeometry] {
        &mut self.links
    }

    pub fn joints(&self) -> &[JointActuator] {
        &self.joints
    }

    pub fn joints_mut(&mut self) -> &mut [JointActuator] {
        &mut self.joints
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    // -- Lookup --

    pub fn link(&self, id: PartId) -> Option<&LinkGeometry> {
        self.links.get(id.index())
    }

    pub fn link_mut(&mut self, id: PartId) -> Option<&mut LinkGeometry> {
        self.links.get_mut(id.index())
    }

    pub fn joint(&self, id: JointId) -> Option<&JointActuator> {
        self.joints.get(id.index())
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut JointActuator> {
        self.joints.get_mut(id.index())
    }

    pub fn link_id(&self, name: &str) -> Option<PartId> {
        self.link_index.get(name).copied()
    }

    pub fn joint_id(&self, name: &str) -> Option<JointId> {
        self.joint_index.get(name).copied()
    }

    pub fn link_by_name(&self, name: &str) -> Option<&LinkGeometry> {
        self.link_id(name).and_then(|id| self.link(id))
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&JointActuator> {
        self.joint_id(name).and_then(|id| self.joint(id))
    }

    /// The joint that moves `part`, if any.
    pub fn joint_for_part(&self, part: PartId) -> Option<&JointActuator> {
        self.joint_of_part
            .get(part.index())
            .copied()
            .flatten()
            .and_then(|id| self.joint(id))
    }

    /// Reference to a part for defect reporting.
    pub fn part_ref(&self, part: PartId) -> PartRef {
        self.link(part).map_or_else(
            || PartRef::new(part, part.to_string()),
            LinkGeometry::part_ref,
        )
    }

    /// Marks `part` and every link below it.
    pub fn subtree_mask(&self, part: PartId) -> Vec<bool> {
        let mut mask = vec![false; self.links.len()];
        for link in &self.links {
            let index = link.id().index();
            mask[index] = link.id() == part || link.parent().is_some_and(|p| mask[p.index()]);
        }
        mask
    }

    pub fn joint_configuration(&self) -> Vec<JointSetting> {
        self.joints
            .iter()
            .map(|j| JointSetting {
                name: j.name().to_string(),
                angle: j.current_angle(),
            })
            .collect()
    }

    // -- Kinematics --

    /// World pose of every link at the current joint state.
    pub fn pose_snapshot(&self) -> PoseSnapshot {
        let mut poses: Vec<Isometry3<f32>> = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let parent_pose = link
                .parent()
                .and_then(|p| poses.get(p.index()).copied())
                .unwrap_or_else(Isometry3::identity);
            let mut pose = parent_pose * link.origin();
            if let Some(joint) = self.joint_for_part(link.id()) {
                pose *= joint.motion();
            }
            poses.push(pose);
        }
        PoseSnapshot { poses }
    }

    /// Collider shape and world pose with its owner's scale applied.
    pub fn collider_world(
        &self,
        snapshot: &PoseSnapshot,
        collider: &Collider,
    ) -> (Shape, Isometry3<f32>) {
        let scale = self
            .link(collider.owner)
            .map_or_else(|| Vector3::repeat(1.0), LinkGeometry::effective_scale);
        let offset = Isometry3::from_parts(
            Translation3::from(collider.offset.translation.vector.component_mul(&scale)),
            collider.offset.rotation,
        );
        (
            collider.shape.scaled(&scale),
            snapshot.pose(collider.owner) * offset,
        )
    }

    /// World bounds of a link's renderable geometry.
    pub fn link_world_aabb(&self, snapshot: &PoseSnapshot, part: PartId) -> Option<Aabb> {
        let bounds = self.link(part)?.scaled_bounds()?;
        Some(bounds.transformed(&snapshot.pose(part)))
    }

    /// Whether the link owns at least one collider.
    pub fn has_colliders(&self, part: PartId) -> bool {
        self.colliders.iter().any(|c| c.owner == part)
    }
}

impl Hierarchy for RobotModel {
    fn parent(&self, part: PartId) -> Option<PartId> {
        self.link(part).and_then(LinkGeometry::parent)
    }
}

/// Breadth-first link order from the single root; children keep their
/// description order.
fn link_order(description: &RobotDescription) -> Result<Vec<usize>, DescriptionError> {
    if description.links.is_empty() {
        return Err(DescriptionError::Empty(description.name.clone()));
    }

    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(description.links.len());
    for (i, link) in description.links.iter().enumerate() {
        if by_name.insert(link.name.as_str(), i).is_some() {
            return Err(DescriptionError::DuplicateLink(link.name.clone()));
        }
    }

    let mut root: Option<usize> = None;
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); description.links.len()];
    for (i, link) in description.links.iter().enumerate() {
        match &link.parent {
            None => {
                if let Some(existing) = root {
                    return Err(DescriptionError::MultipleRoots(
                        description.links[existing].name.clone(),
                        link.name.clone(),
                    ));
                }
                root = Some(i);
            }
            Some(parent) => {
                let &p = by_name.get(parent.as_str()).ok_or_else(|| {
                    DescriptionError::UnknownParent {
                        link: link.name.clone(),
                        parent: parent.clone(),
                    }
                })?;
                children[p].push(i);
            }
        }
    }
    let root = root.ok_or(DescriptionError::NoRoot)?;

    let mut order = Vec::with_capacity(description.links.len());
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root]);
    while let Some(i) = queue.pop_front() {
        if !visited.insert(i) {
            continue;
        }
        order.push(i);
        queue.extend(children[i].iter().copied());
    }

    if let Some(missing) = (0..description.links.len()).find(|i| !visited.contains(i)) {
        return Err(DescriptionError::Disconnected(
            description.links[missing].name.clone(),
        ));
    }
    Ok(order)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
