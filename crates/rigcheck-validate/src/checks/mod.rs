//! The per-pass defect checks.
//!
//! Every check reads the same [`CheckContext`] (one pose snapshot) and
//! appends to a shared defect list. Checks never short-circuit each other.

pub mod collision;
pub mod gap;
pub mod missing;
pub mod scale;

use rigcheck_core::config::ValidatorConfig;
use rigcheck_core::defect::Severity;
use rigcheck_core::time::Timestamp;
use rigcheck_model::{AdjacencyClassifier, PoseSnapshot, RobotModel};

pub use collision::{Contact, PairKey, PairLedger, check_self_collision, find_contacts};
pub use gap::check_gaps;
pub use missing::check_missing_geometry;
pub use scale::check_scale;

/// Everything a check reads during one pass.
pub struct CheckContext<'a, Q> {
    pub model: &'a RobotModel,
    pub snapshot: &'a PoseSnapshot,
    pub config: &'a ValidatorConfig,
    pub classifier: AdjacencyClassifier,
    pub query: &'a Q,
    pub timestamp: Timestamp,
}

/// `Error` above the configured error depth, `Warning` otherwise.
pub fn penetration_severity(depth: f32, config: &ValidatorConfig) -> Severity {
    if depth > config.error_penetration {
        Severity::Error
    } else {
        Severity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_threshold_is_exclusive() {
        let config = ValidatorConfig::default();
        assert_eq!(penetration_severity(0.005, &config), Severity::Warning);
        assert_eq!(penetration_severity(0.01, &config), Severity::Warning);
        assert_eq!(penetration_severity(0.0101, &config), Severity::Error);
    }
}
