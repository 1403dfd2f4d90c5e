//! Shared test fixtures for rigcheck crates.
//!
//! Provides terse description builders, canned robots with known defects,
//! and scripted stand-ins for the spatial query and structure source seams.

pub mod builders;
pub mod mocks;
pub mod robots;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use builders::{at, box_link, child_box, fixed, revolute};
pub use mocks::{FailingSource, ScriptedQuery};
pub use rigcheck_core::time::ManualClock;
pub use robots::{folding_arm, gapped_pair, scenario_robot, single_box, stacked_chain};

use rigcheck_model::{RobotDescription, RobotModel};

/// Build a model from a description known to be valid.
///
/// # Panics
///
/// Panics if the description is rejected.
pub fn model_of(description: &RobotDescription) -> RobotModel {
    match RobotModel::from_description(description) {
        Ok(model) => model,
        Err(e) => panic!("fixture description rejected: {e}"),
    }
}
