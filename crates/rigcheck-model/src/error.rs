//! Error types for building and discovering a robot model.

use std::time::Duration;

use crate::source::SourceError;

/// A description that cannot form a single rooted link tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionError {
    #[error("robot '{0}' has no links")]
    Empty(String),

    #[error("duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("duplicate joint name: {0}")]
    DuplicateJoint(String),

    #[error("link '{link}' names unknown parent '{parent}'")]
    UnknownParent { link: String, parent: String },

    /// No link without a parent (every link is someone's child).
    #[error("no root link found")]
    NoRoot,

    #[error("multiple root links: {0} and {1}")]
    MultipleRoots(String, String),

    /// Link not reachable from the root, i.e. part of a parent cycle.
    #[error("link '{0}' is not connected to the root")]
    Disconnected(String),

    #[error("joint '{joint}' moves unknown link '{part}'")]
    UnknownJointPart { joint: String, part: String },

    #[error("joint '{joint}' moves the root link '{part}'")]
    RootJoint { joint: String, part: String },

    #[error("link '{part}' is moved by both '{first}' and '{second}'")]
    SharedJointPart {
        part: String,
        first: String,
        second: String,
    },
}

/// Failure of the discovery loop.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("robot structure not found within {waited:?} ({attempts} attempts)")]
    Timeout { waited: Duration, attempts: u32 },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid robot description: {0}")]
    InvalidDescription(#[from] DescriptionError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
