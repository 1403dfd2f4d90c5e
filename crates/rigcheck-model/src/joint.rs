//! Joint actuation: angle clamping and the normalized position mapping.

use std::fmt;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

use rigcheck_core::types::{JointId, PartId};

/// Ranges narrower than this are treated as degenerate.
pub const DEGENERATE_RANGE: f32 = 1e-4;

// ---------------------------------------------------------------------------
// JointKind
// ---------------------------------------------------------------------------

/// Mechanical joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    Fixed,
    Revolute,
    Prismatic,
    Continuous,
    /// Actuated about its primary axis only.
    Spherical,
}

impl JointKind {
    pub const fn is_movable(self) -> bool {
        !matches!(self, Self::Fixed)
    }

    pub const fn is_prismatic(self) -> bool {
        matches!(self, Self::Prismatic)
    }

    /// Range used when the joint reports no limits.
    pub const fn default_range(self) -> (f32, f32) {
        match self {
            Self::Fixed => (0.0, 0.0),
            Self::Prismatic => (-1.0, 1.0),
            Self::Revolute | Self::Continuous | Self::Spherical => (-180.0, 180.0),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Revolute => "revolute",
            Self::Prismatic => "prismatic",
            Self::Continuous => "continuous",
            Self::Spherical => "spherical",
        }
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// JointActuator
// ---------------------------------------------------------------------------

/// One joint of the robot, with its limits and current state.
///
/// Angles are in degrees; for prismatic joints they are displacements in
/// model units. Until [`capture_baseline`](Self::capture_baseline) runs the
/// actuator is undiscovered and ignores every command.
#[derive(Debug, Clone)]
pub struct JointActuator {
    id: JointId,
    name: String,
    kind: JointKind,
    part: PartId,
    axis: UnitVector3<f32>,
    lower_limit: f32,
    upper_limit: f32,
    max_effort: f32,
    max_velocity: f32,
    current_angle: f32,
    original_angle: f32,
    normalized_position: f32,
    drive_target: Option<f32>,
    discovered: bool,
}

impl JointActuator {
    /// Creates an undiscovered actuator.
    ///
    /// Missing limits fall back to [`JointKind::default_range`]; fixed
    /// joints are always `0..0`. Inverted limits are reordered.
    pub fn new(
        id: JointId,
        name: impl Into<String>,
        kind: JointKind,
        part: PartId,
        axis: Vector3<f32>,
        limits: Option<(f32, f32)>,
    ) -> Self {
        let (lower, upper) = match (kind, limits) {
            (JointKind::Fixed, _) | (_, None) => kind.default_range(),
            (_, Some((a, b))) if a.is_finite() && b.is_finite() => (a.min(b), a.max(b)),
            (_, Some(_)) => kind.default_range(),
        };
        let axis = UnitVector3::try_new(axis, f32::EPSILON).unwrap_or_else(Vector3::z_axis);
        Self {
            id,
            name: name.into(),
            kind,
            part,
            axis,
            lower_limit: lower,
            upper_limit: upper,
            max_effort: 0.0,
            max_velocity: 0.0,
            current_angle: 0.0,
            original_angle: 0.0,
            normalized_position: 0.5,
            drive_target: None,
            discovered: false,
        }
    }

    /// Informational effort and velocity caps.
    #[must_use]
    pub const fn with_caps(mut self, max_effort: f32, max_velocity: f32) -> Self {
        self.max_effort = max_effort;
        self.max_velocity = max_velocity;
        self
    }

    /// Completes discovery: sets the current angle (clamped) and records it
    /// as the original angle. Later calls are ignored.
    pub fn capture_baseline(&mut self, angle: f32) {
        if self.discovered {
            return;
        }
        let angle = if angle.is_nan() { 0.0 } else { angle };
        self.current_angle = self.clamp(angle);
        self.original_angle = self.current_angle;
        self.normalized_position = self.normalize(self.current_angle);
        self.discovered = true;
    }

    // -- Accessors --

    pub const fn id(&self) -> JointId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> JointKind {
        self.kind
    }

    /// The part this joint moves.
    pub const fn part(&self) -> PartId {
        self.part
    }

    pub const fn axis(&self) -> &UnitVector3<f32> {
        &self.axis
    }

    pub const fn lower_limit(&self) -> f32 {
        self.lower_limit
    }

    pub const fn upper_limit(&self) -> f32 {
        self.upper_limit
    }

    pub const fn max_effort(&self) -> f32 {
        self.max_effort
    }

    pub const fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub const fn current_angle(&self) -> f32 {
        self.current_angle
    }

    pub const fn original_angle(&self) -> f32 {
        self.original_angle
    }

    pub const fn normalized_position(&self) -> f32 {
        self.normalized_position
    }

    /// Last target sent to the drive, `None` before the first command.
    pub const fn drive_target(&self) -> Option<f32> {
        self.drive_target
    }

    pub const fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn is_degenerate(&self) -> bool {
        (self.upper_limit - self.lower_limit).abs() < DEGENERATE_RANGE
    }

    // -- Commands --

    /// Clamps `angle` into the limit range and applies it. NaN is ignored.
    pub fn set_angle(&mut self, angle: f32) {
        if !self.discovered || angle.is_nan() {
            return;
        }
        let clamped = self.clamp(angle);
        self.current_angle = clamped;
        self.normalized_position = self.normalize(clamped);
        self.drive_target = Some(clamped);
    }

    /// Sets the angle from a position in `[0, 1]` over the limit range.
    pub fn set_normalized_position(&mut self, position: f32) {
        if position.is_nan() {
            return;
        }
        let p = position.clamp(0.0, 1.0);
        self.set_angle(self.lower_limit + p * (self.upper_limit - self.lower_limit));
    }

    pub fn set_to_min(&mut self) {
        self.set_angle(self.lower_limit);
    }

    pub fn set_to_max(&mut self) {
        self.set_angle(self.upper_limit);
    }

    pub fn set_to_mid(&mut self) {
        self.set_normalized_position(0.5);
    }

    pub fn reset_to_original(&mut self) {
        self.set_angle(self.original_angle);
    }

    /// Returns to `angle` after a temporary excursion, leaving the drive
    /// target as it was before (`None` if never commanded).
    pub fn restore(&mut self, angle: f32, drive_target: Option<f32>) {
        self.set_angle(angle);
        self.drive_target = drive_target;
    }

    /// Motion of the child frame at the current angle.
    pub fn motion(&self) -> Isometry3<f32> {
        joint_transform(&self.axis, self.kind, self.current_angle)
    }

    fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.lower_limit, self.upper_limit)
    }

    fn normalize(&self, angle: f32) -> f32 {
        if self.is_degenerate() {
            0.5
        } else {
            ((angle - self.lower_limit) / (self.upper_limit - self.lower_limit)).clamp(0.0, 1.0)
        }
    }
}

/// Transform produced by moving a joint to `angle` (degrees, or model units
/// for prismatic joints).
pub fn joint_transform(axis: &UnitVector3<f32>, kind: JointKind, angle: f32) -> Isometry3<f32> {
    match kind {
        JointKind::Fixed => Isometry3::identity(),
        JointKind::Prismatic => {
            let t = axis.into_inner() * angle;
            Isometry3::from_parts(Translation3::from(t), UnitQuaternion::identity())
        }
        JointKind::Revolute | JointKind::Continuous | JointKind::Spherical => {
            let rotation = UnitQuaternion::from_axis_angle(axis, angle.to_radians());
            Isometry3::from_parts(Translation3::identity(), rotation)
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

    fn revolute(lower: f32, upper: f32) -> JointActuator {
        let mut joint = JointActuator::new(
            JointId(0),
            "elbow",
            JointKind::Revolute,
            PartId(1),
            Vector3::z(),
            Some((lower, upper)),
        );
        joint.capture_baseline(0.0);
        joint
    }

    // -- Limits --

    #[test]
    fn unlimited_ranges_by_kind() {
        let j = JointActuator::new(JointId(0), "j", JointKind::Continuous, PartId(1), Vector3::z(), None);
        assert_eq!((j.lower_limit(), j.upper_limit()), (-180.0, 180.0));
        let j = JointActuator::new(JointId(0), "j", JointKind::Prismatic, PartId(1), Vector3::x(), None);
        assert_eq!((j.lower_limit(), j.upper_limit()), (-1.0, 1.0));
        let j = JointActuator::new(
            JointId(0),
            "j",
            JointKind::Fixed,
            PartId(1),
            Vector3::z(),
            Some((-10.0, 10.0)),
        );
        assert_eq!((j.lower_limit(), j.upper_limit()), (0.0, 0.0));
    }

    #[test]
    fn inverted_limits_are_reordered() {
        let j = revolute(90.0, -90.0);
        assert_eq!((j.lower_limit(), j.upper_limit()), (-90.0, 90.0));
    }

    #[test]
    fn zero_axis_falls_back_to_z() {
        let j = JointActuator::new(JointId(0), "j", JointKind::Revolute, PartId(1), Vector3::zeros(), None);
        assert_relative_eq!(j.axis().into_inner(), Vector3::z());
    }

    // -- Angle commands --

    #[test]
    fn set_angle_clamps_and_normalizes() {
        let mut j = revolute(-90.0, 90.0);
        j.set_angle(45.0);
        assert_relative_eq!(j.current_angle(), 45.0);
        assert_relative_eq!(j.normalized_position(), 0.75);
        assert_eq!(j.drive_target(), Some(45.0));

        j.set_angle(500.0);
        assert_relative_eq!(j.current_angle(), 90.0);
        assert_relative_eq!(j.normalized_position(), 1.0);

        j.set_angle(-500.0);
        assert_relative_eq!(j.current_angle(), -90.0);
        assert_relative_eq!(j.normalized_position(), 0.0);
    }

    #[test]
    fn nan_angle_is_ignored() {
        let mut j = revolute(-90.0, 90.0);
        j.set_angle(30.0);
        j.set_angle(f32::NAN);
        j.set_normalized_position(f32::NAN);
        assert_relative_eq!(j.current_angle(), 30.0);
    }

    #[test]
    fn normalized_round_trip() {
        let mut j = revolute(-45.0, 135.0);
        for p in [0.0, 0.1, 0.25, 0.5, 0.9, 1.0] {
            j.set_normalized_position(p);
            assert_relative_eq!(j.normalized_position(), p, epsilon = 1e-5);
        }
        j.set_normalized_position(1.7);
        assert_relative_eq!(j.current_angle(), 135.0);
    }

    #[test]
    fn degenerate_range_stays_at_half() {
        let mut j = revolute(10.0, 10.00001);
        assert!(j.is_degenerate());
        j.set_angle(50.0);
        assert_relative_eq!(j.normalized_position(), 0.5);
        j.set_normalized_position(0.0);
        assert_relative_eq!(j.normalized_position(), 0.5);
    }

    #[test]
    fn min_mid_max() {
        let mut j = revolute(-30.0, 90.0);
        j.set_to_min();
        assert_relative_eq!(j.current_angle(), -30.0);
        j.set_to_max();
        assert_relative_eq!(j.current_angle(), 90.0);
        j.set_to_mid();
        assert_relative_eq!(j.current_angle(), 30.0);
    }

    // -- Discovery baseline --

    #[test]
    fn restore_keeps_prior_drive_target() {
        let mut j = JointActuator::new(
            JointId(0),
            "j",
            JointKind::Revolute,
            PartId(1),
            Vector3::z(),
            Some((-90.0, 90.0)),
        );
        j.capture_baseline(10.0);
        j.set_to_max();
        j.restore(10.0, None);
        assert_relative_eq!(j.current_angle(), 10.0);
        assert!(j.drive_target().is_none());

        j.set_angle(-30.0);
        j.set_to_min();
        j.restore(-30.0, Some(-30.0));
        assert_eq!(j.drive_target(), Some(-30.0));
    }

    #[test]
    fn commands_before_discovery_are_ignored() {
        let mut j = JointActuator::new(
            JointId(0),
            "j",
            JointKind::Revolute,
            PartId(1),
            Vector3::z(),
            Some((-90.0, 90.0)),
        );
        j.set_angle(45.0);
        j.set_to_max();
        assert!(!j.is_discovered());
        assert_relative_eq!(j.current_angle(), 0.0);
        assert!(j.drive_target().is_none());
    }

    #[test]
    fn baseline_is_captured_once() {
        let mut j = JointActuator::new(
            JointId(0),
            "j",
            JointKind::Revolute,
            PartId(1),
            Vector3::z(),
            Some((-90.0, 90.0)),
        );
        j.capture_baseline(120.0);
        assert_relative_eq!(j.original_angle(), 90.0);
        j.capture_baseline(-10.0);
        assert_relative_eq!(j.original_angle(), 90.0);

        j.set_angle(0.0);
        j.reset_to_original();
        assert_relative_eq!(j.current_angle(), 90.0);
    }

    // -- Motion --

    #[test]
    fn revolute_motion_rotates_about_axis() {
        let mut j = revolute(-180.0, 180.0);
        j.set_angle(90.0);
        let p = j.motion() * Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn prismatic_motion_translates() {
        let mut j = JointActuator::new(
            JointId(0),
            "slide",
            JointKind::Prismatic,
            PartId(1),
            Vector3::x(),
            Some((0.0, 0.5)),
        );
        j.capture_baseline(0.0);
        j.set_angle(0.25);
        let p = j.motion() * Point3::origin();
        assert_relative_eq!(p, Point3::new(0.25, 0.0, 0.0));
    }
}
