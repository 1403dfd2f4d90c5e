//! Defect taxonomy and the immutable defect value produced by each pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;
use crate::types::PartRef;

// ---------------------------------------------------------------------------
// DefectKind
// ---------------------------------------------------------------------------

/// Category of a geometric defect.
///
/// `UnreachableConfiguration` and `ScaleMismatch` are reserved: no check
/// produces them yet, but consumers should render them when they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectKind {
    SelfCollision,
    GeometryGap,
    UnreachableConfiguration,
    ScaleMismatch,
    JointLimitCollision,
    MissingMesh,
    InvalidScale,
}

impl DefectKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SelfCollision,
        Self::GeometryGap,
        Self::UnreachableConfiguration,
        Self::ScaleMismatch,
        Self::JointLimitCollision,
        Self::MissingMesh,
        Self::InvalidScale,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::SelfCollision => "SelfCollision",
            Self::GeometryGap => "GeometryGap",
            Self::UnreachableConfiguration => "UnreachableConfiguration",
            Self::ScaleMismatch => "ScaleMismatch",
            Self::JointLimitCollision => "JointLimitCollision",
            Self::MissingMesh => "MissingMesh",
            Self::InvalidScale => "InvalidScale",
        }
    }
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How serious a defect is. Ordered `Info < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

// ---------------------------------------------------------------------------
// Defect
// ---------------------------------------------------------------------------

/// One finding of a validation pass.
///
/// Built once with the `with_*` methods and never mutated afterwards; each
/// pass produces a fresh list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub kind: DefectKind,
    pub severity: Severity,
    pub message: String,
    /// Zero, one or two affected parts.
    pub affected: Vec<PartRef>,
    /// Penetration depth in meters, 0 when not applicable.
    pub penetration_depth: f32,
    /// Measured separation in meters (gap defects), 0 otherwise.
    pub separation: f32,
    pub joint_name: Option<String>,
    pub joint_angle: Option<f32>,
    pub timestamp: Timestamp,
}

impl Defect {
    pub fn new(kind: DefectKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            affected: Vec::new(),
            penetration_depth: 0.0,
            separation: 0.0,
            joint_name: None,
            joint_angle: None,
            timestamp: Timestamp::ZERO,
        }
    }

    #[must_use]
    pub fn with_part(mut self, part: PartRef) -> Self {
        debug_assert!(self.affected.len() < 2, "a defect names at most two parts");
        self.affected.push(part);
        self
    }

    #[must_use]
    pub fn with_parts(self, a: PartRef, b: PartRef) -> Self {
        self.with_part(a).with_part(b)
    }

    #[must_use]
    pub const fn with_penetration(mut self, depth: f32) -> Self {
        self.penetration_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_separation(mut self, distance: f32) -> Self {
        self.separation = distance;
        self
    }

    #[must_use]
    pub fn with_joint(mut self, name: impl Into<String>, angle: f32) -> Self {
        self.joint_name = Some(name.into());
        self.joint_angle = Some(angle);
        self
    }

    #[must_use]
    pub const fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether `name` is one of the affected parts.
    pub fn involves(&self, name: &str) -> bool {
        self.affected.iter().any(|p| p.name == name)
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// DefectCounts
// ---------------------------------------------------------------------------

/// Per-severity tally of a defect list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefectCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl DefectCounts {
    pub fn tally<'a>(defects: impl IntoIterator<Item = &'a Defect>) -> Self {
        defects
            .into_iter()
            .fold(Self::default(), |mut counts, defect| {
                match defect.severity {
                    Severity::Error => counts.errors += 1,
                    Severity::Warning => counts.warnings += 1,
                    Severity::Info => counts.infos += 1,
                }
                counts
            })
    }

    pub const fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    pub const fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartId;

    fn part(id: u32, name: &str) -> PartRef {
        PartRef::new(PartId(id), name)
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn builder_sets_fields() {
        let d = Defect::new(DefectKind::SelfCollision, Severity::Error, "overlap")
            .with_parts(part(1, "a"), part(4, "b"))
            .with_penetration(0.02)
            .at(Timestamp::from_secs(1.5));
        assert_eq!(d.affected.len(), 2);
        assert!(d.involves("a"));
        assert!(d.involves("b"));
        assert!(!d.involves("c"));
        assert!((d.penetration_depth - 0.02).abs() < f32::EPSILON);
        assert_eq!(d.timestamp.millis(), 1500);
        assert!(d.joint_name.is_none());
    }

    #[test]
    fn with_joint_sets_name_and_angle() {
        let d = Defect::new(DefectKind::GeometryGap, Severity::Warning, "gap")
            .with_joint("elbow", 45.0)
            .with_separation(0.2);
        assert_eq!(d.joint_name.as_deref(), Some("elbow"));
        assert_eq!(d.joint_angle, Some(45.0));
        assert!((d.separation - 0.2).abs() < f32::EPSILON);
        assert!(d.penetration_depth.abs() < f32::EPSILON);
    }

    #[test]
    fn display_includes_severity_and_kind() {
        let d = Defect::new(DefectKind::InvalidScale, Severity::Warning, "too small");
        assert_eq!(d.to_string(), "[WARNING] InvalidScale: too small");
    }

    #[test]
    fn tally_counts_by_severity() {
        let defects = [
            Defect::new(DefectKind::SelfCollision, Severity::Error, ""),
            Defect::new(DefectKind::SelfCollision, Severity::Warning, ""),
            Defect::new(DefectKind::GeometryGap, Severity::Warning, ""),
            Defect::new(DefectKind::MissingMesh, Severity::Info, ""),
        ];
        let counts = DefectCounts::tally(&defects);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 2);
        assert_eq!(counts.infos, 1);
        assert_eq!(counts.total(), 4);
        assert!(!counts.is_clean());
    }

    #[test]
    fn info_only_is_clean() {
        let defects = [Defect::new(DefectKind::MissingMesh, Severity::Info, "")];
        assert!(DefectCounts::tally(&defects).is_clean());
    }

    #[test]
    fn all_kinds_have_distinct_labels() {
        let mut labels: Vec<_> = DefectKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DefectKind::ALL.len());
    }
}
