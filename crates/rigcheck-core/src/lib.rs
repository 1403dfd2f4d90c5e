//! Shared types for rigcheck: configuration, engine time, the defect
//! taxonomy and validation reports.
//!
//! This crate has no geometry or engine dependencies; every other rigcheck
//! crate builds on it.

pub mod config;
pub mod defect;
pub mod error;
pub mod report;
pub mod time;
pub mod types;

pub mod prelude {
    pub use crate::config::{DiscoveryConfig, ScaleLimits, ValidatorConfig};
    pub use crate::defect::{Defect, DefectCounts, DefectKind, Severity};
    pub use crate::error::ConfigError;
    pub use crate::report::ValidationReport;
    pub use crate::time::{Clock, IntervalTimer, ManualClock, SystemClock, Timestamp};
    pub use crate::types::{JointId, JointSetting, PartId, PartRef};
}
