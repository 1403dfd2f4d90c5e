use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_timeout_secs() -> f64 {
    10.0
}
const fn default_poll_interval_secs() -> f64 {
    0.25
}
const fn default_true() -> bool {
    true
}
const fn default_validation_interval_secs() -> f64 {
    0.5
}
const fn default_penetration_threshold() -> f32 {
    0.001
}
const fn default_error_penetration() -> f32 {
    0.01
}
const fn default_max_allowed_gap() -> f32 {
    0.01
}
const fn default_max_dimension() -> f32 {
    10.0
}
const fn default_min_dimension() -> f32 {
    0.001
}
const fn default_adjacency_depth() -> usize {
    2
}
const fn default_ancestor_walk_limit() -> usize {
    10
}
const fn default_sweep_samples() -> usize {
    9
}

// ---------------------------------------------------------------------------
// DiscoveryConfig
// ---------------------------------------------------------------------------

/// How long and how often to look for the robot before giving up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Give up after this many seconds without finding the robot (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Delay between structure-source polls (default: 0.25 s).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,

    /// Wait this long after the robot appears before capturing baselines.
    #[serde(default)]
    pub settle_secs: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            settle_secs: 0.0,
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        saturating_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        saturating_secs(self.poll_interval_secs)
    }

    pub fn settle(&self) -> Duration {
        saturating_secs(self.settle_secs)
    }
}

/// Negative and NaN read as zero, anything too large for a `Duration` as
/// `Duration::MAX`.
fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Checks a seconds field: finite, representable, and positive (or
/// non-negative when `allow_zero`).
fn check_secs(field: &str, secs: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let in_range = if allow_zero { secs >= 0.0 } else { secs > 0.0 };
    if !secs.is_finite() || !in_range {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        return Err(ConfigError::invalid(
            field,
            format!("{secs} (must be finite and {bound})"),
        ));
    }
    Duration::try_from_secs_f64(secs)
        .map(drop)
        .map_err(|e| ConfigError::invalid(field, format!("{secs} ({e})")))
}

// ---------------------------------------------------------------------------
// ScaleLimits
// ---------------------------------------------------------------------------

/// Plausible link dimensions, in model units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    /// Largest dimension above this is an error (default: 10).
    #[serde(default = "default_max_dimension")]
    pub max_dimension: f32,

    /// Smallest positive dimension below this is a warning (default: 0.001).
    #[serde(default = "default_min_dimension")]
    pub min_dimension: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            min_dimension: default_min_dimension(),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidatorConfig
// ---------------------------------------------------------------------------

/// Main validator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Run passes automatically as the engine clock ticks (default: true).
    #[serde(default = "default_true")]
    pub continuous: bool,

    /// Seconds between continuous passes (default: 0.5).
    #[serde(default = "default_validation_interval_secs")]
    pub validation_interval_secs: f64,

    /// Overlaps at or below this depth are ignored (default: 1 mm).
    #[serde(default = "default_penetration_threshold")]
    pub penetration_threshold: f32,

    /// Overlaps deeper than this are errors rather than warnings (default: 1 cm).
    #[serde(default = "default_error_penetration")]
    pub error_penetration: f32,

    /// Largest tolerated separation between a joint's part and its parent (default: 1 cm).
    #[serde(default = "default_max_allowed_gap")]
    pub max_allowed_gap: f32,

    #[serde(default)]
    pub scale: ScaleLimits,

    /// Ancestor distance still treated as adjacent (default: 2, grandparent).
    #[serde(default = "default_adjacency_depth")]
    pub adjacency_depth: usize,

    /// Hierarchy levels walked when classifying adjacency (default: 10).
    #[serde(default = "default_ancestor_walk_limit")]
    pub ancestor_walk_limit: usize,

    /// Emit `MissingMesh` info defects for links without any geometry.
    #[serde(default)]
    pub report_missing_geometry: bool,

    /// Poses sampled per joint by a sweep (default: 9).
    #[serde(default = "default_sweep_samples")]
    pub sweep_samples: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            continuous: true,
            validation_interval_secs: default_validation_interval_secs(),
            penetration_threshold: default_penetration_threshold(),
            error_penetration: default_error_penetration(),
            max_allowed_gap: default_max_allowed_gap(),
            scale: ScaleLimits::default(),
            adjacency_depth: default_adjacency_depth(),
            ancestor_walk_limit: default_ancestor_walk_limit(),
            report_missing_geometry: false,
            sweep_samples: default_sweep_samples(),
        }
    }
}

impl ValidatorConfig {
    /// Validate configuration. Returns Err on invalid values.
    ///
    /// Comparisons are written negated so that NaN fails them.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secs("discovery.timeout_secs", self.discovery.timeout_secs, false)?;
        check_secs(
            "discovery.poll_interval_secs",
            self.discovery.poll_interval_secs,
            false,
        )?;
        check_secs("discovery.settle_secs", self.discovery.settle_secs, true)?;
        check_secs(
            "validation_interval_secs",
            self.validation_interval_secs,
            false,
        )?;
        for (field, value) in [
            ("penetration_threshold", self.penetration_threshold),
            ("error_penetration", self.error_penetration),
            ("max_allowed_gap", self.max_allowed_gap),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::invalid(field, format!("{value} (must be >= 0)")));
            }
        }
        if !(self.scale.min_dimension > 0.0) {
            return Err(ConfigError::invalid(
                "scale.min_dimension",
                "must be > 0",
            ));
        }
        if self.scale.min_dimension >= self.scale.max_dimension {
            return Err(ConfigError::Incompatible(
                "scale.min_dimension must be smaller than scale.max_dimension".into(),
            ));
        }
        if self.ancestor_walk_limit < self.adjacency_depth {
            return Err(ConfigError::Incompatible(
                "ancestor_walk_limit must be >= adjacency_depth".into(),
            ));
        }
        if self.sweep_samples < 2 {
            return Err(ConfigError::invalid("sweep_samples", "must be >= 2"));
        }
        Ok(())
    }

    /// Interval between continuous passes.
    pub fn validation_interval(&self) -> Duration {
        saturating_secs(self.validation_interval_secs)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
