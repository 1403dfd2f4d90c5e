//! Engine errors and the crate-wide error aggregate.

use rigcheck_core::error::ConfigError;
use rigcheck_model::{DiscoveryError, SourceError};

use crate::engine::EngineState;

/// Misuse of the engine API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The call needs a discovered robot.
    #[error("engine is not ready (state: {0})")]
    NotReady(EngineState),

    #[error("unknown joint: {0}")]
    UnknownJoint(String),

    #[error("unknown link: {0}")]
    UnknownLink(String),
}

/// Any failure rigcheck can report.
#[derive(Debug, thiserror::Error)]
pub enum RigcheckError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
