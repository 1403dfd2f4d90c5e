//! Error types for URDF parsing and conversion.

use std::path::PathBuf;

/// Errors that can occur during URDF processing.
#[derive(Debug, thiserror::Error)]
pub enum UrdfError {
    /// Failed to read the URDF file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse URDF XML content.
    #[error("URDF parse error: {0}")]
    Parse(String),

    /// A referenced link was not found in the model.
    #[error("missing link: {0}")]
    MissingLink(String),

    /// A referenced joint was not found in the model.
    #[error("missing joint: {0}")]
    MissingJoint(String),

    /// Invalid or unsupported joint type.
    #[error("unsupported joint type: {0}")]
    UnsupportedJointType(String),

    /// Geometry with non-positive or non-finite dimensions.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The URDF has no root link (no link that is never a child).
    #[error("no root link found")]
    NoRootLink,

    /// A link is the child of more than one joint.
    #[error("link '{0}' has more than one parent joint")]
    MultipleParents(String),

    /// A link not reachable from the root link.
    #[error("link '{0}' is not connected to the root link")]
    Disconnected(String),
}

/// Errors reading the extent of a `<mesh>` file.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("cannot read mesh {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Only STL meshes can be measured.
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("malformed mesh {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The file parsed but holds no vertices.
    #[error("mesh {0} has no vertices")]
    Empty(PathBuf),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
