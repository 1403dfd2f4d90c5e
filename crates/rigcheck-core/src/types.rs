use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PartId / JointId
// ---------------------------------------------------------------------------

/// Stable identity of a link within one discovered robot.
///
/// Assigned in discovery order (parents before children) and never reused,
/// so it doubles as the canonical ordering key for part pairs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PartId(pub u32);

impl PartId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

/// Stable identity of a joint within one discovered robot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JointId(pub u32);

impl JointId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PartRef
// ---------------------------------------------------------------------------

/// A part reference carried by defects: identity for lookups, name for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartRef {
    pub id: PartId,
    pub name: String,
}

impl PartRef {
    pub fn new(id: PartId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for PartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// JointSetting
// ---------------------------------------------------------------------------

/// One entry of a joint configuration vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSetting {
    pub name: String,
    /// Degrees for rotational joints, model units for prismatic ones.
    pub angle: f32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
