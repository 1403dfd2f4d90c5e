//! Scripted stand-ins for the spatial query and structure source seams.

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Isometry3;
use rigcheck_model::{RobotDescription, SourceError, StructureSource};
use rigcheck_spatial::{Aabb, Shape, SpatialQueryProvider};

// ---------------------------------------------------------------------------
// ScriptedQuery
// ---------------------------------------------------------------------------

/// Answers every query with fixed values and counts overlap calls.
///
/// With an overlap scripted, every collider pair the engine asks about
/// "collides", which isolates the pair filtering (adjacency, de-duplication)
/// from real geometry.
#[derive(Debug, Default)]
pub struct ScriptedQuery {
    overlap: Option<f32>,
    separation: Option<f32>,
    overlap_calls: AtomicUsize,
}

impl ScriptedQuery {
    /// Every shape pair overlaps by `depth`; all bounds intersect.
    pub fn overlapping(depth: f32) -> Self {
        Self {
            overlap: Some(depth),
            ..Self::default()
        }
    }

    /// No shape pair overlaps; all bounds intersect.
    pub fn clear() -> Self {
        Self::default()
    }

    /// Bounds never intersect and are `distance` apart.
    #[must_use]
    pub fn with_separation(mut self, distance: f32) -> Self {
        self.separation = Some(distance);
        self
    }

    /// Number of narrow-phase queries answered so far.
    pub fn overlap_calls(&self) -> usize {
        self.overlap_calls.load(Ordering::Relaxed)
    }
}

impl SpatialQueryProvider for ScriptedQuery {
    fn overlap(
        &self,
        _a: &Shape,
        _pose_a: &Isometry3<f32>,
        _b: &Shape,
        _pose_b: &Isometry3<f32>,
    ) -> Option<f32> {
        self.overlap_calls.fetch_add(1, Ordering::Relaxed);
        self.overlap
    }

    fn bounds_intersect(&self, _a: &Aabb, _b: &Aabb) -> bool {
        self.separation.is_none()
    }

    fn closest_point_distance(&self, _a: &Aabb, _b: &Aabb) -> f32 {
        self.separation.unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// FailingSource
// ---------------------------------------------------------------------------

/// A structure source whose every lookup fails.
#[derive(Debug, Clone)]
pub struct FailingSource {
    message: String,
}

impl FailingSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl StructureSource for FailingSource {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "failing"
    }

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError> {
        Err(SourceError::new("failing", self.message.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
