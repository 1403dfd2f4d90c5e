//! The robot model rigcheck validates: structure sources, discovery, joint
//! actuation, link geometry and structural adjacency.
//!
//! A [`StructureSource`] is polled by discovery until it yields a
//! [`RobotDescription`], which becomes a typed [`RobotModel`]. After that
//! the topology is fixed; joints and links only change state.

pub mod adjacency;
pub mod discovery;
pub mod error;
pub mod joint;
pub mod link;
pub mod robot;
pub mod source;

pub use adjacency::{AdjacencyClassifier, Hierarchy, Relation};
pub use discovery::{Discoverer, DiscoveryPoll, discover};
pub use error::{DescriptionError, DiscoveryError};
pub use joint::{JointActuator, JointKind};
pub use link::LinkGeometry;
pub use robot::{Collider, PoseSnapshot, RobotModel};
pub use source::{
    ColliderDescription, JointDescription, LinkDescription, RobotDescription, SourceError,
    StaticSource, StructureSource,
};

pub mod prelude {
    pub use crate::adjacency::{AdjacencyClassifier, Hierarchy, Relation};
    pub use crate::discovery::{Discoverer, DiscoveryPoll, discover};
    pub use crate::error::{DescriptionError, DiscoveryError};
    pub use crate::joint::{JointActuator, JointKind};
    pub use crate::link::LinkGeometry;
    pub use crate::robot::{Collider, PoseSnapshot, RobotModel};
    pub use crate::source::{
        ColliderDescription, JointDescription, LinkDescription, RobotDescription, SourceError,
        StaticSource, StructureSource,
    };
}
