//! Geometric validation of a [`RobotModel`](rigcheck_model::RobotModel).
//!
//! [`ValidationEngine`] discovers a robot from a structure source, then runs
//! passes (self-collision, joint gaps, link scale) on a cadence or on
//! demand. Each pass produces a fresh, shared list of
//! [`Defect`](rigcheck_core::defect::Defect)s and updates per-link flags.
//! Joint sweeps and report assembly build on the same checks.

pub mod checks;
pub mod engine;
pub mod error;
pub mod report;
pub mod sweep;

pub use engine::{EngineState, PassOutcome, ValidationEngine};
pub use error::{EngineError, RigcheckError};
pub use report::ReportBuilder;

pub mod prelude {
    pub use crate::engine::{EngineState, PassOutcome, ValidationEngine};
    pub use crate::error::{EngineError, RigcheckError};
    pub use crate::report::ReportBuilder;
    pub use rigcheck_core::prelude::*;
    pub use rigcheck_model::prelude::*;
    pub use rigcheck_spatial::prelude::*;
}
