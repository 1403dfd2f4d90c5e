//! Bevy integration for rigcheck.
//!
//! [`RigcheckPlugin`] adds [`validation_tick_system`] to `Update`. The
//! system advances a [`RobotValidator`] resource by the frame delta and
//! mirrors each new pass into the polled [`ValidationStatus`] resource.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use rigcheck_bevy::{RigcheckPlugin, RobotValidator, ValidationStatus};
//! use rigcheck_core::config::ValidatorConfig;
//! use rigcheck_model::StaticSource;
//! use rigcheck_validate::ValidationEngine;
//!
//! # fn robot() -> rigcheck_model::RobotDescription { unimplemented!() }
//! let source = StaticSource::new(robot());
//! let engine = ValidationEngine::new(source, ValidatorConfig::default()).unwrap();
//!
//! let mut app = App::new();
//! app.add_plugins(RigcheckPlugin);
//! app.insert_resource(RobotValidator::new(engine));
//! app.update();
//!
//! let status = app.world().resource::<ValidationStatus>();
//! println!("errors: {}", status.error_count());
//! ```

pub mod resources;
pub mod systems;

use bevy::prelude::*;

pub use resources::{RobotValidator, ValidationStatus};
pub use systems::validation_tick_system;

// ---------------------------------------------------------------------------
// RigcheckPlugin
// ---------------------------------------------------------------------------

/// Registers [`ValidationStatus`] and the validation tick system.
pub struct RigcheckPlugin;

impl Plugin for RigcheckPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Time>()
            .init_resource::<ValidationStatus>()
            .add_systems(Update, validation_tick_system);
    }
}

pub mod prelude {
    pub use crate::RigcheckPlugin;
    pub use crate::resources::{RobotValidator, ValidationStatus};
    pub use crate::systems::validation_tick_system;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use rigcheck_core::config::{DiscoveryConfig, ValidatorConfig};
    use rigcheck_model::StaticSource;
    use rigcheck_test_utils::{FailingSource, gapped_pair, scenario_robot};
    use rigcheck_validate::{EngineState, ValidationEngine};

    const FRAME: Duration = Duration::from_millis(100);

    fn app_with(engine: ValidationEngine) -> App {
        let mut app = App::new();
        app.add_plugins(RigcheckPlugin);
        app.insert_resource(RobotValidator::new(engine));
        app.finish();
        app.cleanup();
        app
    }

    /// Advance the app clock by one frame and run the schedule.
    fn step(app: &mut App) {
        app.world_mut().resource_mut::<Time>().advance_by(FRAME);
        app.update();
    }

    fn status(app: &App) -> &ValidationStatus {
        app.world().resource::<ValidationStatus>()
    }

    #[test]
    fn plugin_builds_without_validator() {
        let mut app = App::new();
        app.add_plugins(RigcheckPlugin);
        app.update();
        assert_eq!(*status(&app), ValidationStatus::default());
    }

    #[test]
    fn first_frame_discovers_and_validates() {
        let engine =
            ValidationEngine::new(StaticSource::new(scenario_robot()), ValidatorConfig::default())
                .unwrap();
        let mut app = app_with(engine);
        step(&mut app);

        let status = status(&app);
        assert!(status.is_ready());
        assert_eq!(status.pass_index(), 1);
        assert_eq!(status.error_count(), 1);
        assert_eq!(status.warning_count(), 2);
    }

    #[test]
    fn passes_follow_the_app_clock() {
        let engine =
            ValidationEngine::new(StaticSource::new(scenario_robot()), ValidatorConfig::default())
                .unwrap();
        let mut app = app_with(engine);
        step(&mut app);
        for _ in 0..4 {
            step(&mut app);
        }
        assert_eq!(status(&app).pass_index(), 1);
        step(&mut app);
        assert_eq!(status(&app).pass_index(), 2);
    }

    #[test]
    fn requested_pass_runs_in_manual_mode() {
        let config = ValidatorConfig {
            continuous: false,
            ..ValidatorConfig::default()
        };
        let engine = ValidationEngine::new(StaticSource::new(gapped_pair(0.05)), config).unwrap();
        let mut app = app_with(engine);
        step(&mut app);
        assert!(status(&app).is_ready());
        assert_eq!(status(&app).pass_index(), 0);

        app.world_mut().resource_mut::<RobotValidator>().request_pass();
        step(&mut app);
        assert_eq!(status(&app).pass_index(), 1);
        assert_eq!(status(&app).warning_count(), 1);
        assert!(!app.world().resource::<RobotValidator>().pass_requested());
    }

    #[test]
    fn actuation_through_the_resource() {
        let config = ValidatorConfig {
            continuous: false,
            ..ValidatorConfig::default()
        };
        let engine = ValidationEngine::new(StaticSource::new(gapped_pair(0.05)), config).unwrap();
        let mut app = app_with(engine);
        step(&mut app);

        {
            let mut validator = app.world_mut().resource_mut::<RobotValidator>();
            validator
                .engine_mut()
                .set_link_uniform_scale("tip", 3.0)
                .unwrap();
            validator.request_pass();
        }
        step(&mut app);
        assert_eq!(status(&app).warning_count(), 0);
    }

    #[test]
    fn failure_is_mirrored() {
        let config = ValidatorConfig {
            discovery: DiscoveryConfig {
                timeout_secs: 1.0,
                poll_interval_secs: 0.25,
                settle_secs: 0.0,
            },
            ..ValidatorConfig::default()
        };
        let engine = ValidationEngine::new(FailingSource::new("gone"), config).unwrap();
        let mut app = app_with(engine);
        step(&mut app);

        let status = status(&app);
        assert_eq!(status.state, EngineState::Failed);
        assert!(status.failure.as_deref().unwrap().contains("gone"));
        assert!(status.latest.is_none());
    }
}
