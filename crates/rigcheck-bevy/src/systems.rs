//! The per-frame validation system.

use bevy::prelude::*;
use tracing::warn;

use crate::resources::{RobotValidator, ValidationStatus};

/// Advances the engine by the frame delta, serves pass requests and mirrors
/// the result into [`ValidationStatus`].
///
/// Does nothing until a [`RobotValidator`] resource exists.
#[allow(clippy::needless_pass_by_value)]
pub fn validation_tick_system(
    time: Res<Time>,
    validator: Option<ResMut<RobotValidator>>,
    mut status: ResMut<ValidationStatus>,
) {
    let Some(mut validator) = validator else {
        return;
    };

    let mut ran = validator.engine_mut().tick(time.delta()).is_some();
    if validator.take_request() {
        match validator.engine_mut().run_pass() {
            Ok(_) => ran = true,
            Err(e) => warn!(error = %e, "requested validation pass failed"),
        }
    }

    let engine = validator.engine();
    if status.state != engine.state() {
        status.state = engine.state();
        status.failure = engine.failure().map(str::to_string);
    }
    if ran {
        status.latest = engine.last_outcome().cloned();
    }
}
