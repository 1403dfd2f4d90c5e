//! Resources shared between the validation system and the rest of the app.

use bevy::prelude::*;

use rigcheck_validate::{EngineState, PassOutcome, ValidationEngine};

// ---------------------------------------------------------------------------
// RobotValidator
// ---------------------------------------------------------------------------

/// The validation engine, owned by the app.
///
/// Insert it after adding [`RigcheckPlugin`](crate::RigcheckPlugin); the
/// tick system drives it from [`Time`]. Actuation goes through
/// [`engine_mut`](Self::engine_mut).
#[derive(Resource, Debug)]
pub struct RobotValidator {
    engine: ValidationEngine,
    pass_requested: bool,
}

impl RobotValidator {
    pub const fn new(engine: ValidationEngine) -> Self {
        Self {
            engine,
            pass_requested: false,
        }
    }

    pub const fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    pub const fn engine_mut(&mut self) -> &mut ValidationEngine {
        &mut self.engine
    }

    /// Run a pass on the next update, or as soon as the robot is discovered.
    pub const fn request_pass(&mut self) {
        self.pass_requested = true;
    }

    pub const fn pass_requested(&self) -> bool {
        self.pass_requested
    }

    /// Consume a pending request if the engine can serve it.
    pub(crate) fn take_request(&mut self) -> bool {
        if self.pass_requested && self.engine.state() == EngineState::Ready {
            self.pass_requested = false;
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// ValidationStatus
// ---------------------------------------------------------------------------

/// Polled mirror of the engine: lifecycle state and the latest outcome.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ValidationStatus {
    pub state: EngineState,
    pub latest: Option<PassOutcome>,
    pub failure: Option<String>,
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self {
            state: EngineState::Uninitialized,
            latest: None,
            failure: None,
        }
    }
}

impl ValidationStatus {
    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// Index of the latest pass, 0 before the first one.
    pub fn pass_index(&self) -> u64 {
        self.latest.as_ref().map_or(0, |o| o.index)
    }

    pub fn error_count(&self) -> usize {
        self.latest.as_ref().map_or(0, PassOutcome::error_count)
    }

    pub fn warning_count(&self) -> usize {
        self.latest.as_ref().map_or(0, PassOutcome::warning_count)
    }
}
