//! Assembly of [`ValidationReport`] snapshots.

use rigcheck_core::defect::Defect;
use rigcheck_core::report::ValidationReport;
use rigcheck_core::time::Timestamp;
use rigcheck_core::types::JointSetting;
use rigcheck_spatial::SpatialQueryProvider;

use crate::engine::ValidationEngine;
use crate::error::EngineError;

/// Collects the pieces of a report; counts are tallied on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    robot_name: String,
    generated_at: Timestamp,
    pass_index: Option<u64>,
    defects: Vec<Defect>,
    joints: Vec<JointSetting>,
}

impl ReportBuilder {
    pub fn new(robot_name: impl Into<String>) -> Self {
        Self {
            robot_name: robot_name.into(),
            generated_at: Timestamp::ZERO,
            pass_index: None,
            defects: Vec::new(),
            joints: Vec::new(),
        }
    }

    /// Seed from the engine's latest pass and current joint configuration.
    ///
    /// Before any pass has run the defect list is empty and the pass index
    /// is `None`.
    pub fn from_engine<Q: SpatialQueryProvider>(
        engine: &ValidationEngine<Q>,
    ) -> Result<Self, EngineError> {
        let model = engine
            .model()
            .ok_or_else(|| EngineError::NotReady(engine.state()))?;
        let mut builder = Self::new(model.name())
            .at(engine.now())
            .joints(model.joint_configuration());
        if let Some(outcome) = engine.last_outcome() {
            builder = builder
                .pass(outcome.index)
                .defects(outcome.defects.iter().cloned());
        }
        Ok(builder)
    }

    #[must_use]
    pub const fn at(mut self, generated_at: Timestamp) -> Self {
        self.generated_at = generated_at;
        self
    }

    #[must_use]
    pub const fn pass(mut self, index: u64) -> Self {
        self.pass_index = Some(index);
        self
    }

    /// Replace the defect list.
    #[must_use]
    pub fn defects(mut self, defects: impl IntoIterator<Item = Defect>) -> Self {
        self.defects = defects.into_iter().collect();
        self
    }

    /// Append defects, e.g. the results of a joint sweep.
    #[must_use]
    pub fn extend_defects(mut self, defects: impl IntoIterator<Item = Defect>) -> Self {
        self.defects.extend(defects);
        self
    }

    #[must_use]
    pub fn joints(mut self, joints: Vec<JointSetting>) -> Self {
        self.joints = joints;
        self
    }

    pub fn build(self) -> ValidationReport {
        ValidationReport::new(
            self.robot_name,
            self.generated_at,
            self.pass_index,
            self.defects,
            self.joints,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
