//! URDF support for rigcheck.
//!
//! Parses URDF XML into an in-memory [`UrdfRobot`], converts it to the
//! model's [`RobotDescription`](rigcheck_model::RobotDescription) (measuring
//! STL meshes along the way), and
//! exposes the result as a [`UrdfSource`] structure source.

pub mod convert;
pub mod error;
pub mod mesh;
pub mod parser;
pub mod source;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use convert::{to_description, to_description_with};
pub use error::{MeshError, UrdfError};
pub use mesh::MeshLoader;
pub use parser::{parse_file, parse_string};
pub use source::UrdfSource;
pub use types::{
    Collision, Geometry, JointData, JointLimits, JointType, LinkData, Origin, UrdfRobot, Visual,
};
