//! Structure sources and the plain description records they yield.
//!
//! A [`StructureSource`] is polled during discovery until it produces a
//! [`RobotDescription`]. The description is pure data: discovery validates
//! it and builds the typed [`RobotModel`](crate::RobotModel) from it.

use nalgebra::{Isometry3, Vector3};
use serde::{Deserialize, Serialize};

use rigcheck_spatial::{Aabb, Shape};

use crate::joint::JointKind;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Failure reported by a structure source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("structure source '{source_name}' failed: {message}")]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StructureSource
// ---------------------------------------------------------------------------

/// Something that can locate a robot's structure.
///
/// `locate` returns `Ok(None)` while the structure is not available yet;
/// discovery keeps polling until it appears or the deadline passes.
pub trait StructureSource {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError>;
}

impl<T: StructureSource + ?Sized> StructureSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError> {
        (**self).locate()
    }
}

impl<T: StructureSource + ?Sized> StructureSource for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError> {
        (**self).locate()
    }
}

/// In-memory source.
///
/// Yields its description once `ready_after` polls have come back empty,
/// which lets callers model a structure that appears late. A source built
/// with [`StaticSource::never`] never yields.
#[derive(Debug, Clone)]
pub struct StaticSource {
    description: Option<RobotDescription>,
    ready_after: u32,
    polls: u32,
}

impl StaticSource {
    pub const fn new(description: RobotDescription) -> Self {
        Self {
            description: Some(description),
            ready_after: 0,
            polls: 0,
        }
    }

    pub const fn never() -> Self {
        Self {
            description: None,
            ready_after: 0,
            polls: 0,
        }
    }

    /// Return nothing for the first `polls` calls to `locate`.
    #[must_use]
    pub const fn ready_after(mut self, polls: u32) -> Self {
        self.ready_after = polls;
        self
    }

    /// Number of times `locate` has been called.
    pub const fn polls(&self) -> u32 {
        self.polls
    }
}

impl StructureSource for StaticSource {
    fn name(&self) -> &str {
        self.description.as_ref().map_or("static", |d| d.name.as_str())
    }

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError> {
        self.polls = self.polls.saturating_add(1);
        if self.polls <= self.ready_after {
            return Ok(None);
        }
        Ok(self.description.clone())
    }
}

// ---------------------------------------------------------------------------
// Descriptions
// ---------------------------------------------------------------------------

/// A robot as reported by a structure source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDescription {
    pub name: String,
    pub links: Vec<LinkDescription>,
    pub joints: Vec<JointDescription>,
}

impl RobotDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            joints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    #[must_use]
    pub fn with_joint(mut self, joint: JointDescription) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn link(&self, name: &str) -> Option<&LinkDescription> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn joint(&self, name: &str) -> Option<&JointDescription> {
        self.joints.iter().find(|j| j.name == name)
    }
}

/// One rigid link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    /// Parent link name; `None` for the root.
    pub parent: Option<String>,
    /// Pose relative to the parent link (the joint frame for jointed links).
    pub origin: Isometry3<f32>,
    /// Local renderable bounds, if the link has visible geometry.
    pub bounds: Option<Aabb>,
    pub colliders: Vec<ColliderDescription>,
    pub local_scale: Vector3<f32>,
    /// Mesh files the link references but that could not be read.
    #[serde(default)]
    pub unreadable_meshes: Vec<String>,
}

impl LinkDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            origin: Isometry3::identity(),
            bounds: None,
            colliders: Vec::new(),
            local_scale: Vector3::repeat(1.0),
            unreadable_meshes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Isometry3<f32>) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_collider(mut self, collider: ColliderDescription) -> Self {
        self.colliders.push(collider);
        self
    }

    #[must_use]
    pub const fn with_local_scale(mut self, scale: Vector3<f32>) -> Self {
        self.local_scale = scale;
        self
    }

    #[must_use]
    pub fn with_unreadable_mesh(mut self, filename: impl Into<String>) -> Self {
        self.unreadable_meshes.push(filename.into());
        self
    }
}

/// A collision shape owned by a link, placed relative to the link frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderDescription {
    pub shape: Shape,
    pub offset: Isometry3<f32>,
}

impl ColliderDescription {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Isometry3::identity(),
        }
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: Isometry3<f32>) -> Self {
        self.offset = offset;
        self
    }
}

/// One joint. It moves the link named by `part` relative to that link's
/// parent; angles and limits are in degrees (model units for prismatic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    pub kind: JointKind,
    pub part: String,
    pub axis: Vector3<f32>,
    /// `None` for unlimited joints.
    pub limits: Option<(f32, f32)>,
    pub max_effort: f32,
    pub max_velocity: f32,
    pub initial_angle: f32,
}

impl JointDescription {
    pub fn new(name: impl Into<String>, kind: JointKind, part: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            part: part.into(),
            axis: Vector3::z(),
            limits: None,
            max_effort: 0.0,
            max_velocity: 0.0,
            initial_angle: 0.0,
        }
    }

    #[must_use]
    pub const fn with_axis(mut self, axis: Vector3<f32>) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some((lower, upper));
        self
    }

    #[must_use]
    pub const fn with_caps(mut self, max_effort: f32, max_velocity: f32) -> Self {
        self.max_effort = max_effort;
        self.max_velocity = max_velocity;
        self
    }

    #[must_use]
    pub const fn with_initial_angle(mut self, angle: f32) -> Self {
        self.initial_angle = angle;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_links() -> RobotDescription {
        RobotDescription::new("arm")
            .with_link(LinkDescription::new("base"))
            .with_link(LinkDescription::new("upper").with_parent("base"))
            .with_joint(JointDescription::new("shoulder", JointKind::Revolute, "upper"))
    }

    #[test]
    fn static_source_yields_immediately() {
        let mut source = StaticSource::new(two_links());
        assert_eq!(source.name(), "arm");
        assert!(source.locate().unwrap().is_some());
        assert_eq!(source.polls(), 1);
    }

    #[test]
    fn static_source_can_appear_late() {
        let mut source = StaticSource::new(two_links()).ready_after(2);
        assert!(source.locate().unwrap().is_none());
        assert!(source.locate().unwrap().is_none());
        assert!(source.locate().unwrap().is_some());
    }

    #[test]
    fn never_source_stays_empty() {
        let mut source = StaticSource::never();
        for _ in 0..5 {
            assert!(source.locate().unwrap().is_none());
        }
    }

    #[test]
    fn boxed_source_forwards() {
        let mut source: Box<dyn StructureSource> = Box::new(StaticSource::new(two_links()));
        assert_eq!(source.name(), "arm");
        assert!(source.locate().unwrap().is_some());
    }

    #[test]
    fn lookups_by_name() {
        let desc = two_links();
        assert_eq!(desc.link("upper").unwrap().parent.as_deref(), Some("base"));
        assert_eq!(desc.joint("shoulder").unwrap().part, "upper");
        assert!(desc.link("missing").is_none());
    }

    #[test]
    fn source_error_display() {
        let e = SourceError::new("file", "gone");
        assert_eq!(e.to_string(), "structure source 'file' failed: gone");
    }
}
