//! Engine lifecycle: discovery, scheduling, subscribers and actuation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use approx::assert_relative_eq;
use rigcheck_core::config::{DiscoveryConfig, ValidatorConfig};
use rigcheck_model::{DiscoveryError, StaticSource};
use rigcheck_test_utils::{FailingSource, ManualClock, gapped_pair, model_of, scenario_robot};
use rigcheck_validate::{EngineError, EngineState, RigcheckError, ValidationEngine};

const FRAME: Duration = Duration::from_millis(100);

fn quick_discovery() -> ValidatorConfig {
    ValidatorConfig {
        discovery: DiscoveryConfig {
            timeout_secs: 1.0,
            poll_interval_secs: 0.25,
            settle_secs: 0.0,
        },
        ..ValidatorConfig::default()
    }
}

// -- Discovery --

#[test]
fn tick_discovers_late_structure() {
    let source = StaticSource::new(scenario_robot()).ready_after(2);
    let mut engine = ValidationEngine::new(source, quick_discovery()).unwrap();
    assert_eq!(engine.state(), EngineState::Uninitialized);

    assert!(engine.tick(FRAME).is_none());
    assert_eq!(engine.state(), EngineState::Discovering);

    let mut ticks = 1;
    while engine.state() == EngineState::Discovering && ticks < 20 {
        engine.tick(FRAME);
        ticks += 1;
    }
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(engine.model().unwrap().name(), "scenario");
    // The first pass runs as soon as discovery completes.
    assert_eq!(engine.pass_count(), 1);
}

#[test]
fn discovery_timeout_fails_permanently() {
    let mut engine = ValidationEngine::new(StaticSource::never(), quick_discovery()).unwrap();
    for _ in 0..15 {
        engine.tick(FRAME);
    }
    assert_eq!(engine.state(), EngineState::Failed);
    assert!(engine.failure().unwrap().contains("not found within"));

    for _ in 0..20 {
        assert!(engine.tick(FRAME).is_none());
    }
    assert_eq!(engine.pass_count(), 0);
    assert!(engine.last_outcome().is_none());
    assert_eq!(
        engine.run_pass().unwrap_err(),
        EngineError::NotReady(EngineState::Failed)
    );
}

#[test]
fn source_error_fails_discovery() {
    let mut engine = ValidationEngine::new(FailingSource::new("no robot here"), quick_discovery())
        .unwrap();
    engine.tick(FRAME);
    assert_eq!(engine.state(), EngineState::Failed);
    assert!(engine.failure().unwrap().contains("no robot here"));
}

#[test]
fn blocking_discovery_uses_clock() {
    let source = StaticSource::new(scenario_robot()).ready_after(3);
    let mut engine = ValidationEngine::new(source, quick_discovery()).unwrap();
    let mut clock = ManualClock::new();

    engine.discover_now(&mut clock).unwrap();
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(clock.sleeps(), 3);
    assert_relative_eq!(engine.now().secs_f64(), 0.75, epsilon = 1e-9);
    assert_eq!(engine.pass_count(), 0);

    // Already ready: nothing to do.
    engine.discover_now(&mut clock).unwrap();
    assert_eq!(clock.sleeps(), 3);
}

#[test]
fn blocking_discovery_reports_failure() {
    let mut engine = ValidationEngine::new(StaticSource::never(), quick_discovery()).unwrap();
    let err = engine.discover_now(&mut ManualClock::new()).unwrap_err();
    assert!(matches!(
        err,
        RigcheckError::Discovery(DiscoveryError::Timeout { .. })
    ));
    assert_eq!(engine.state(), EngineState::Failed);

    let err = engine.discover_now(&mut ManualClock::new()).unwrap_err();
    assert!(matches!(
        err,
        RigcheckError::Engine(EngineError::NotReady(EngineState::Failed))
    ));
}

// -- Scheduling --

#[test]
fn unbounded_interval_is_rejected_at_construction() {
    let config = ValidatorConfig {
        validation_interval_secs: f64::INFINITY,
        ..Default::default()
    };
    let result = ValidationEngine::from_model(model_of(&scenario_robot()), config);
    assert!(matches!(
        result,
        Err(rigcheck_core::error::ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn continuous_passes_follow_interval() {
    let model = model_of(&scenario_robot());
    let mut engine = ValidationEngine::from_model(model, ValidatorConfig::default()).unwrap();

    // 0.5 s interval at 0.1 s frames: every fifth tick runs a pass.
    let ran: Vec<bool> = (0..10).map(|_| engine.tick(FRAME).is_some()).collect();
    assert_eq!(
        ran,
        [false, false, false, false, true, false, false, false, false, true]
    );
    assert_eq!(engine.pass_count(), 2);
    assert_eq!(
        engine.last_outcome().unwrap().timestamp,
        rigcheck_core::time::Timestamp::from_nanos(1_000_000_000)
    );
}

#[test]
fn on_demand_pass_restarts_interval() {
    let model = model_of(&scenario_robot());
    let mut engine = ValidationEngine::from_model(model, ValidatorConfig::default()).unwrap();
    for _ in 0..4 {
        engine.tick(FRAME);
    }
    engine.run_pass().unwrap();
    assert!(engine.tick(FRAME).is_none());
    assert_eq!(engine.pass_count(), 1);
}

#[test]
fn manual_mode_never_runs_passes_on_tick() {
    let config = ValidatorConfig {
        continuous: false,
        ..quick_discovery()
    };
    let mut engine = ValidationEngine::new(StaticSource::new(scenario_robot()), config).unwrap();
    for _ in 0..30 {
        assert!(engine.tick(FRAME).is_none());
    }
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(engine.pass_count(), 0);
    assert_eq!(engine.run_pass().unwrap().index, 1);
}

// -- Subscribers --

#[test]
fn subscribers_see_every_pass() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let model = model_of(&scenario_robot());
    let mut engine = ValidationEngine::from_model(model, ValidatorConfig::default()).unwrap();
    let sink = Arc::clone(&seen);
    engine.on_pass(move |outcome| {
        sink.lock()
            .unwrap()
            .push((outcome.index, outcome.defects.len()));
    });

    engine.run_pass().unwrap();
    engine.run_pass().unwrap();
    assert_eq!(*seen.lock().unwrap(), [(1, 3), (2, 3)]);
}

#[test]
fn outcome_defects_are_shared() {
    let model = model_of(&scenario_robot());
    let mut engine = ValidationEngine::from_model(model, ValidatorConfig::default()).unwrap();
    let held = Arc::clone(&engine.run_pass().unwrap().defects);
    engine.run_pass().unwrap();
    // The earlier list stays intact after being replaced.
    assert_eq!(held.len(), 3);
    assert!(!Arc::ptr_eq(&held, &engine.last_outcome().unwrap().defects));
}

// -- Actuation --

#[test]
fn joint_setters_clamp_and_report() {
    let mut engine =
        ValidationEngine::from_model(model_of(&gapped_pair(0.0)), ValidatorConfig::default())
            .unwrap();
    assert_relative_eq!(engine.set_joint_angle("hinge", 45.0).unwrap(), 45.0);
    assert_relative_eq!(engine.set_joint_angle("hinge", 400.0).unwrap(), 90.0);
    assert_relative_eq!(engine.set_joint_normalized("hinge", 0.25).unwrap(), -45.0);
    assert_relative_eq!(engine.set_joint_to_min("hinge").unwrap(), -90.0);
    assert_relative_eq!(engine.set_joint_to_mid("hinge").unwrap(), 0.0);
    assert_relative_eq!(engine.set_joint_to_max("hinge").unwrap(), 90.0);
    assert_relative_eq!(engine.reset_joint("hinge").unwrap(), 0.0);

    engine.set_joint_angle("hinge", 30.0).unwrap();
    engine.reset_all_joints().unwrap();
    let joint = engine.model().unwrap().joint_by_name("hinge").unwrap();
    assert_relative_eq!(joint.current_angle(), joint.original_angle());
}

#[test]
fn link_setters_clamp_and_report() {
    let mut engine =
        ValidationEngine::from_model(model_of(&gapped_pair(0.0)), ValidatorConfig::default())
            .unwrap();
    let scale = engine.set_link_scale("tip", 5.0, 0.01, 2.0).unwrap();
    assert_relative_eq!(scale.x, 3.0);
    assert_relative_eq!(scale.y, 0.1);
    assert_relative_eq!(scale.z, 2.0);

    engine.set_link_uniform_scale("base", 2.0).unwrap();
    engine.reset_all_scales().unwrap();
    let model = engine.model().unwrap();
    for link in model.links() {
        assert_relative_eq!(*link.scale(), nalgebra::Vector3::repeat(1.0));
    }
}

#[test]
fn unknown_names_are_caller_errors() {
    let mut engine =
        ValidationEngine::from_model(model_of(&gapped_pair(0.0)), ValidatorConfig::default())
            .unwrap();
    assert_eq!(
        engine.set_joint_angle("elbow", 1.0).unwrap_err(),
        EngineError::UnknownJoint("elbow".into())
    );
    assert_eq!(
        engine.set_link_scale("hand", 1.0, 1.0, 1.0).unwrap_err(),
        EngineError::UnknownLink("hand".into())
    );
}

#[test]
fn actuation_waits_for_discovery() {
    let mut engine =
        ValidationEngine::new(StaticSource::never(), quick_discovery()).unwrap();
    engine.start();
    assert_eq!(
        engine.reset_all_scales().unwrap_err(),
        EngineError::NotReady(EngineState::Discovering)
    );
}
