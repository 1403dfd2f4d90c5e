//! Link geometry: baseline footprint, scale multipliers and defect flags.

use nalgebra::{Isometry3, Vector3};

use rigcheck_core::types::{PartId, PartRef};
use rigcheck_spatial::Aabb;

/// Smallest scale multiplier a link accepts.
pub const MIN_SCALE: f32 = 0.1;
/// Largest scale multiplier a link accepts.
pub const MAX_SCALE: f32 = 3.0;

/// One rigid link of the robot.
#[derive(Debug, Clone)]
pub struct LinkGeometry {
    id: PartId,
    name: String,
    parent: Option<PartId>,
    origin: Isometry3<f32>,
    local_bounds: Option<Aabb>,
    original_local_scale: Vector3<f32>,
    original_world_size: Option<Vector3<f32>>,
    scale: Vector3<f32>,
    unreadable_meshes: Vec<String>,
    has_error: bool,
    has_warning: bool,
}

impl LinkGeometry {
    pub fn new(
        id: PartId,
        name: impl Into<String>,
        parent: Option<PartId>,
        origin: Isometry3<f32>,
        local_bounds: Option<Aabb>,
        local_scale: Vector3<f32>,
    ) -> Self {
        let original_world_size = local_bounds.map(|b| b.size().component_mul(&local_scale.abs()));
        Self {
            id,
            name: name.into(),
            parent,
            origin,
            local_bounds,
            original_local_scale: local_scale,
            original_world_size,
            scale: Vector3::repeat(1.0),
            unreadable_meshes: Vec::new(),
            has_error: false,
            has_warning: false,
        }
    }

    /// Records mesh files the link references but that could not be read.
    #[must_use]
    pub fn with_unreadable_meshes(mut self, filenames: Vec<String>) -> Self {
        self.unreadable_meshes = filenames;
        self
    }

    pub const fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn part_ref(&self) -> PartRef {
        PartRef::new(self.id, self.name.clone())
    }

    pub const fn parent(&self) -> Option<PartId> {
        self.parent
    }

    /// Pose relative to the parent link.
    pub const fn origin(&self) -> &Isometry3<f32> {
        &self.origin
    }

    pub const fn local_bounds(&self) -> Option<&Aabb> {
        self.local_bounds.as_ref()
    }

    pub const fn has_bounds(&self) -> bool {
        self.local_bounds.is_some()
    }

    pub fn unreadable_meshes(&self) -> &[String] {
        &self.unreadable_meshes
    }

    pub const fn original_local_scale(&self) -> &Vector3<f32> {
        &self.original_local_scale
    }

    /// Size at discovery, before any scale multiplier was applied.
    pub const fn original_world_size(&self) -> Option<&Vector3<f32>> {
        self.original_world_size.as_ref()
    }

    /// Current per-axis multiplier.
    pub const fn scale(&self) -> &Vector3<f32> {
        &self.scale
    }

    // -- Scale --

    /// Applies per-axis multipliers clamped to `[MIN_SCALE, MAX_SCALE]`.
    /// A NaN factor leaves that axis unchanged.
    pub fn set_scale(&mut self, sx: f32, sy: f32, sz: f32) {
        for (axis, factor) in [sx, sy, sz].into_iter().enumerate() {
            if !factor.is_nan() {
                self.scale[axis] = factor.clamp(MIN_SCALE, MAX_SCALE);
            }
        }
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.set_scale(s, s, s);
    }

    pub fn reset_scale(&mut self) {
        self.set_scale(1.0, 1.0, 1.0);
    }

    /// Original local scale with the current multipliers applied.
    pub fn effective_scale(&self) -> Vector3<f32> {
        self.original_local_scale.component_mul(&self.scale)
    }

    /// Current bounding size, `None` without renderable bounds.
    pub fn world_size(&self) -> Option<Vector3<f32>> {
        self.local_bounds
            .map(|b| b.size().component_mul(&self.effective_scale().abs()))
    }

    pub fn volume(&self) -> Option<f32> {
        self.world_size().map(|s| s.x * s.y * s.z)
    }

    /// Local bounds with the effective scale applied, in the link frame.
    pub fn scaled_bounds(&self) -> Option<Aabb> {
        let scale = self.effective_scale();
        self.local_bounds.map(|b| b.scaled(&scale))
    }

    // -- Feedback flags --

    pub const fn has_error(&self) -> bool {
        self.has_error
    }

    pub const fn has_warning(&self) -> bool {
        self.has_warning
    }

    pub const fn clear_flags(&mut self) {
        self.has_error = false;
        self.has_warning = false;
    }

    pub const fn flag_error(&mut self) {
        self.has_error = true;
    }

    pub const fn flag_warning(&mut self) {
        self.has_warning = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
