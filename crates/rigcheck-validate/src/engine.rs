//! The validation engine: discovery state machine, pass scheduling, defect
//! feedback and the actuation API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use rigcheck_core::config::ValidatorConfig;
use rigcheck_core::defect::{Defect, DefectCounts, Severity};
use rigcheck_core::error::ConfigError;
use rigcheck_core::report::ValidationReport;
use rigcheck_core::time::{Clock, IntervalTimer, Timestamp};
use rigcheck_core::types::JointId;
use rigcheck_model::{
    AdjacencyClassifier, Discoverer, DiscoveryPoll, JointActuator, LinkGeometry, RobotModel,
    StructureSource, discover,
};
use rigcheck_spatial::{ContactQuery, SpatialQueryProvider};

use crate::checks::{
    CheckContext, check_gaps, check_missing_geometry, check_scale, check_self_collision,
};
use crate::error::{EngineError, RigcheckError};
use crate::report::ReportBuilder;
use crate::sweep::{SweepParams, sweep_joint};

// ---------------------------------------------------------------------------
// EngineState
// ---------------------------------------------------------------------------

/// Lifecycle of a [`ValidationEngine`].
///
/// `Uninitialized -> Discovering -> Ready`, or `Discovering -> Failed`.
/// `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Uninitialized,
    Discovering,
    Ready,
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Discovering => "discovering",
            Self::Ready => "ready",
            Self::Failed => "failed",
        })
    }
}

// ---------------------------------------------------------------------------
// PassOutcome
// ---------------------------------------------------------------------------

/// Result of one validation pass. The defect list is shared, read-only,
/// until the next pass replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    /// 1-based pass number.
    pub index: u64,
    pub timestamp: Timestamp,
    pub counts: DefectCounts,
    pub defects: Arc<[Defect]>,
}

impl PassOutcome {
    pub const fn error_count(&self) -> usize {
        self.counts.errors
    }

    pub const fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    pub const fn info_count(&self) -> usize {
        self.counts.infos
    }

    pub const fn is_clean(&self) -> bool {
        self.counts.is_clean()
    }
}

type PassListener = Box<dyn Fn(&PassOutcome) + Send + Sync>;
type BoxedSource = Box<dyn StructureSource + Send + Sync>;

// ---------------------------------------------------------------------------
// ValidationEngine
// ---------------------------------------------------------------------------

/// Owns a robot model and validates it on a cadence or on demand.
///
/// The engine is driven by [`tick`](Self::tick): while discovering, each tick
/// polls the structure source; once ready and in continuous mode, a pass
/// runs whenever `validation_interval` has elapsed. [`run_pass`](Self::run_pass)
/// validates immediately.
pub struct ValidationEngine<Q = ContactQuery> {
    config: ValidatorConfig,
    query: Q,
    classifier: AdjacencyClassifier,
    state: EngineState,
    source: Option<BoxedSource>,
    discoverer: Discoverer,
    model: Option<RobotModel>,
    now: Timestamp,
    timer: IntervalTimer,
    passes: u64,
    last: Option<PassOutcome>,
    listeners: Vec<PassListener>,
    failure: Option<String>,
}

impl ValidationEngine<ContactQuery> {
    /// Engine that discovers its robot from `source`.
    pub fn new(
        source: impl StructureSource + Send + Sync + 'static,
        config: ValidatorConfig,
    ) -> Result<Self, ConfigError> {
        Self::build(Some(Box::new(source)), None, config)
    }

    /// Engine over an already-built model; starts out `Ready`.
    pub fn from_model(model: RobotModel, config: ValidatorConfig) -> Result<Self, ConfigError> {
        Self::build(None, Some(model), config)
    }

    fn build(
        source: Option<BoxedSource>,
        model: Option<RobotModel>,
        config: ValidatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = if model.is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        };
        Ok(Self {
            classifier: AdjacencyClassifier::from_config(&config),
            discoverer: Discoverer::new(config.discovery.clone()),
            timer: IntervalTimer::new(config.validation_interval()),
            config,
            query: ContactQuery,
            state,
            source,
            model,
            now: Timestamp::ZERO,
            passes: 0,
            last: None,
            listeners: Vec::new(),
            failure: None,
        })
    }
}

impl<Q: SpatialQueryProvider> ValidationEngine<Q> {
    /// Replace the spatial query backend.
    pub fn with_query<R: SpatialQueryProvider>(self, query: R) -> ValidationEngine<R> {
        ValidationEngine {
            config: self.config,
            query,
            classifier: self.classifier,
            state: self.state,
            source: self.source,
            discoverer: self.discoverer,
            model: self.model,
            now: self.now,
            timer: self.timer,
            passes: self.passes,
            last: self.last,
            listeners: self.listeners,
            failure: self.failure,
        }
    }

    // -- Lifecycle --

    /// Begin discovery. No-op unless the engine is `Uninitialized`.
    pub fn start(&mut self) {
        if self.state != EngineState::Uninitialized {
            return;
        }
        self.state = EngineState::Discovering;
        info!(
            timeout_secs = self.config.discovery.timeout_secs,
            "robot discovery started"
        );
    }

    /// Advance the engine clock by `dt`.
    ///
    /// Starts discovery on the first tick if [`start`](Self::start) was not
    /// called. Returns the outcome when this tick ran a pass. In continuous
    /// mode the first pass runs as soon as discovery completes.
    pub fn tick(&mut self, dt: Duration) -> Option<&PassOutcome> {
        self.now += dt;
        let due = match self.state {
            EngineState::Uninitialized | EngineState::Discovering => {
                self.start();
                self.poll_discovery() && self.config.continuous
            }
            EngineState::Ready => self.config.continuous && self.timer.tick(dt),
            EngineState::Failed => false,
        };
        if !due {
            return None;
        }
        self.run_pass().ok()
    }

    /// Block on `clock` until discovery finishes. The engine clock moves
    /// forward to the clock's reading.
    pub fn discover_now(&mut self, clock: &mut (impl Clock + ?Sized)) -> Result<(), RigcheckError> {
        self.start();
        match self.state {
            EngineState::Ready => return Ok(()),
            EngineState::Failed => return Err(EngineError::NotReady(self.state).into()),
            EngineState::Uninitialized | EngineState::Discovering => {}
        }
        let Some(source) = self.source.as_mut() else {
            return Err(EngineError::NotReady(self.state).into());
        };
        let result = discover(source.as_mut(), &self.config.discovery, &mut *clock);
        self.now = self.now.max(clock.now());
        match result {
            Ok(model) => {
                self.install(model);
                Ok(())
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    fn poll_discovery(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        match self.discoverer.poll(source.as_mut(), self.now) {
            Ok(DiscoveryPoll::Pending) => false,
            Ok(DiscoveryPoll::Ready(model)) => {
                self.install(*model);
                true
            }
            Err(e) => {
                self.fail(e.to_string());
                false
            }
        }
    }

    fn install(&mut self, model: RobotModel) {
        info!(robot = model.name(), "validation engine ready");
        self.model = Some(model);
        self.state = EngineState::Ready;
        self.timer.reset();
    }

    fn fail(&mut self, reason: String) {
        warn!(%reason, "validation engine failed");
        self.state = EngineState::Failed;
        self.failure = Some(reason);
    }

    // -- Passes --

    /// Run all checks against the current joint and link state.
    ///
    /// Checks run in a fixed order (self-collision, gap, scale, missing
    /// geometry) against one pose snapshot. Afterwards every link's flags
    /// are cleared and re-set from the new defects, and subscribers are
    /// notified.
    pub fn run_pass(&mut self) -> Result<&PassOutcome, EngineError> {
        let Some(model) = self.model.as_mut() else {
            return Err(EngineError::NotReady(self.state));
        };

        let mut defects = Vec::new();
        {
            let snapshot = model.pose_snapshot();
            let ctx = CheckContext {
                model: &*model,
                snapshot: &snapshot,
                config: &self.config,
                classifier: self.classifier,
                query: &self.query,
                timestamp: self.now,
            };
            check_self_collision(&ctx, &mut defects);
            check_gaps(&ctx, &mut defects);
            check_scale(&ctx, &mut defects);
            check_missing_geometry(&ctx, &mut defects);
        }
        apply_flags(model.links_mut(), &defects);

        self.passes += 1;
        let outcome = PassOutcome {
            index: self.passes,
            timestamp: self.now,
            counts: DefectCounts::tally(&defects),
            defects: defects.into(),
        };
        debug!(
            pass = outcome.index,
            errors = outcome.counts.errors,
            warnings = outcome.counts.warnings,
            infos = outcome.counts.infos,
            "validation pass complete"
        );
        for listener in &self.listeners {
            listener(&outcome);
        }
        self.timer.reset();
        let outcome: &PassOutcome = self.last.insert(outcome);
        Ok(outcome)
    }

    /// Subscribe to every future pass outcome.
    pub fn on_pass(&mut self, listener: impl Fn(&PassOutcome) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -- Accessors --

    pub const fn state(&self) -> EngineState {
        self.state
    }

    pub const fn last_outcome(&self) -> Option<&PassOutcome> {
        self.last.as_ref()
    }

    pub const fn model(&self) -> Option<&RobotModel> {
        self.model.as_ref()
    }

    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub const fn classifier(&self) -> AdjacencyClassifier {
        self.classifier
    }

    /// Engine clock: the sum of all ticks.
    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Number of passes run so far.
    pub const fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Why discovery failed, once the engine is `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    // -- Joint actuation --
    //
    // Setters return the joint's resulting (clamped) value.

    fn joint_mut(&mut self, name: &str) -> Result<&mut JointActuator, EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        let id = model
            .joint_id(name)
            .ok_or_else(|| EngineError::UnknownJoint(name.to_string()))?;
        model
            .joint_mut(id)
            .ok_or_else(|| EngineError::UnknownJoint(name.to_string()))
    }

    pub fn set_joint_angle(&mut self, name: &str, angle: f32) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.set_angle(angle);
        Ok(joint.current_angle())
    }

    pub fn set_joint_normalized(&mut self, name: &str, position: f32) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.set_normalized_position(position);
        Ok(joint.current_angle())
    }

    pub fn set_joint_to_min(&mut self, name: &str) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.set_to_min();
        Ok(joint.current_angle())
    }

    pub fn set_joint_to_mid(&mut self, name: &str) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.set_to_mid();
        Ok(joint.current_angle())
    }

    pub fn set_joint_to_max(&mut self, name: &str) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.set_to_max();
        Ok(joint.current_angle())
    }

    /// Return one joint to its discovery-time angle.
    pub fn reset_joint(&mut self, name: &str) -> Result<f32, EngineError> {
        let joint = self.joint_mut(name)?;
        joint.reset_to_original();
        Ok(joint.current_angle())
    }

    pub fn reset_all_joints(&mut self) -> Result<(), EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        model
            .joints_mut()
            .iter_mut()
            .for_each(JointActuator::reset_to_original);
        Ok(())
    }

    // -- Link scaling --
    //
    // Setters return the link's resulting (clamped) scale factors.

    fn link_mut(&mut self, name: &str) -> Result<&mut LinkGeometry, EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        let id = model
            .link_id(name)
            .ok_or_else(|| EngineError::UnknownLink(name.to_string()))?;
        model
            .link_mut(id)
            .ok_or_else(|| EngineError::UnknownLink(name.to_string()))
    }

    pub fn set_link_scale(
        &mut self,
        name: &str,
        sx: f32,
        sy: f32,
        sz: f32,
    ) -> Result<Vector3<f32>, EngineError> {
        let link = self.link_mut(name)?;
        link.set_scale(sx, sy, sz);
        Ok(*link.scale())
    }

    pub fn set_link_uniform_scale(&mut self, name: &str, s: f32) -> Result<Vector3<f32>, EngineError> {
        let link = self.link_mut(name)?;
        link.set_uniform_scale(s);
        Ok(*link.scale())
    }

    pub fn reset_link_scale(&mut self, name: &str) -> Result<Vector3<f32>, EngineError> {
        let link = self.link_mut(name)?;
        link.reset_scale();
        Ok(*link.scale())
    }

    pub fn reset_all_scales(&mut self) -> Result<(), EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        model
            .links_mut()
            .iter_mut()
            .for_each(LinkGeometry::reset_scale);
        Ok(())
    }

    // -- Sweeps --

    /// Sample one joint across its range and report pairs it drives into
    /// collision. Defects are returned, not merged into the pass outcome.
    pub fn sweep_joint(&mut self, name: &str, samples: usize) -> Result<Vec<Defect>, EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        let id = model
            .joint_id(name)
            .ok_or_else(|| EngineError::UnknownJoint(name.to_string()))?;
        let params = SweepParams {
            config: &self.config,
            classifier: self.classifier,
            query: &self.query,
            timestamp: self.now,
        };
        Ok(sweep_joint(model, id, samples, &params))
    }

    /// Sweep every movable joint with `sweep_samples` poses each.
    pub fn sweep_all_joints(&mut self) -> Result<Vec<Defect>, EngineError> {
        let state = self.state;
        let model = self.model.as_mut().ok_or(EngineError::NotReady(state))?;
        let ids: Vec<JointId> = model
            .joints()
            .iter()
            .filter(|j| j.kind().is_movable())
            .map(JointActuator::id)
            .collect();
        let params = SweepParams {
            config: &self.config,
            classifier: self.classifier,
            query: &self.query,
            timestamp: self.now,
        };
        let mut defects = Vec::new();
        for id in ids {
            defects.extend(sweep_joint(model, id, self.config.sweep_samples, &params));
        }
        Ok(defects)
    }

    // -- Reports --

    /// Snapshot the latest pass and the current joint configuration.
    pub fn generate_report(&self) -> Result<ValidationReport, EngineError> {
        Ok(ReportBuilder::from_engine(self)?.build())
    }
}

/// Clear every link's flags, then flag the parts named by each defect.
/// Info defects leave flags untouched.
fn apply_flags(links: &mut [LinkGeometry], defects: &[Defect]) {
    links.iter_mut().for_each(LinkGeometry::clear_flags);
    for defect in defects {
        for part in &defect.affected {
            let Some(link) = links.get_mut(part.id.index()) else {
                continue;
            };
            match defect.severity {
                Severity::Error => link.flag_error(),
                Severity::Warning => link.flag_warning(),
                Severity::Info => {}
            }
        }
    }
}

impl<Q> fmt::Debug for ValidationEngine<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("state", &self.state)
            .field("robot", &self.model.as_ref().map(RobotModel::name))
            .field("now", &self.now)
            .field("passes", &self.passes)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Isometry3;
    use rigcheck_core::defect::DefectKind;
    use rigcheck_core::types::PartId;
    use rigcheck_model::{LinkDescription, RobotDescription, StaticSource};

    fn solo() -> RobotDescription {
        RobotDescription::new("solo").with_link(LinkDescription::new("base"))
    }

    #[test]
    fn state_display_is_lowercase() {
        assert_eq!(EngineState::Uninitialized.to_string(), "uninitialized");
        assert_eq!(EngineState::Failed.to_string(), "failed");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ValidatorConfig {
            sweep_samples: 1,
            ..ValidatorConfig::default()
        };
        assert!(ValidationEngine::new(StaticSource::new(solo()), config).is_err());
    }

    #[test]
    fn pass_before_discovery_is_not_ready() {
        let mut engine =
            ValidationEngine::new(StaticSource::new(solo()), ValidatorConfig::default()).unwrap();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(
            engine.run_pass().unwrap_err(),
            EngineError::NotReady(EngineState::Uninitialized)
        );
        assert_eq!(
            engine.set_joint_angle("any", 1.0).unwrap_err(),
            EngineError::NotReady(EngineState::Uninitialized)
        );
    }

    #[test]
    fn first_tick_discovers_and_runs_pass() {
        let mut engine =
            ValidationEngine::new(StaticSource::new(solo()), ValidatorConfig::default()).unwrap();
        let outcome = engine.tick(Duration::from_millis(16)).cloned();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(outcome.map(|o| o.index), Some(1));
    }

    #[test]
    fn pass_indices_increase() {
        let model = RobotModel::from_description(&solo()).unwrap();
        let mut engine = ValidationEngine::from_model(model, ValidatorConfig::default()).unwrap();
        assert_eq!(engine.run_pass().unwrap().index, 1);
        assert_eq!(engine.run_pass().unwrap().index, 2);
        assert_eq!(engine.pass_count(), 2);
    }

    #[test]
    fn flags_follow_severity() {
        let link = |id, name| {
            LinkGeometry::new(PartId(id), name, None, Isometry3::identity(), None, Vector3::repeat(1.0))
        };
        let mut links = vec![link(0, "a"), link(1, "b")];
        links[1].flag_error();
        let defect = Defect::new(DefectKind::GeometryGap, Severity::Warning, "gap")
            .with_part(links[0].part_ref());
        apply_flags(&mut links, &[defect]);
        assert!(links[0].has_warning());
        assert!(!links[0].has_error());
        assert!(!links[1].has_error());
    }
}
