use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::constants::*;

/// Engine-wide configuration, passed explicitly into every estimation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Signal-to-distance model parameters
    pub path_loss: PathLossConfig,
    /// Iterative solver settings for three or more anchors
    pub solver: SolverConfig,
    /// Two-anchor estimator settings
    pub two_anchor: TwoAnchorConfig,
    /// What to do with observations that carry no signal reading
    pub missing_signal: MissingSignalPolicy,
    /// Spoofing score thresholds
    pub spoofing: SpoofingConfig,
}

/// Log-distance path-loss model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLossConfig {
    /// Rated transmitter power (dBm)
    pub tx_power_dbm: f64,
    /// Environmental decay exponent (2.0 free space, 2.5-3.0 outdoor, up to 4.0 indoor)
    pub path_loss_exponent: f64,
    /// Lower clamp on model distances (m)
    pub min_distance_m: f64,
    /// Upper clamp on model distances (m)
    pub max_distance_m: f64,
}

/// Gradient-descent solver schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Fixed iteration budget, no early exit
    pub iterations: u32,
    /// Initial step size in meters-equivalent
    pub learning_rate: f64,
    /// Iteration index after which the learning rate starts decaying
    pub decay_after: u32,
    /// Per-iteration multiplier once decay is active
    pub decay_factor: f64,
    /// Degree conversion for the latitude step
    pub meters_per_deg_lat: f64,
    /// Degree conversion for the longitude step
    pub meters_per_deg_lon: f64,
    /// Constant added to the scaled residual for the confidence radius (m)
    pub base_radius_m: f64,
    /// Confidence radius clamp (m)
    pub min_radius_m: f64,
    pub max_radius_m: f64,
}

/// How two observations are turned into a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoAnchorStrategy {
    /// Inverse-distance weighted centroid of the two anchors
    #[default]
    WeightedCentroid,
    /// Two-circle intersection, candidate nearest the weighted centroid
    CircleIntersection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoAnchorConfig {
    pub strategy: TwoAnchorStrategy,
    /// Below this baseline the anchors are treated as co-located (m)
    pub min_separation_m: f64,
    /// Floor on the weighted confidence radius (m)
    pub min_radius_m: f64,
}

/// Policy for observations without a signal-strength reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MissingSignalPolicy {
    /// Substitute a fixed reading
    AssumeDefault { default_rssi_dbm: f64 },
    /// Drop the observation like one without a usable position
    Discard,
}

impl Default for MissingSignalPolicy {
    fn default() -> Self {
        MissingSignalPolicy::AssumeDefault {
            default_rssi_dbm: DEFAULT_MISSING_RSSI_DBM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoofingConfig {
    /// Score at or above which spoofing is suspected
    pub suspected_threshold: f64,
    /// Score at or above which a monitoring reason is attached
    pub monitor_threshold: f64,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    #[error("I/O error: {message}")]
    IoError { message: String },
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Outcome of a configuration check
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl Default for PathLossConfig {
    fn default() -> Self {
        Self {
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            min_distance_m: MIN_MODEL_DISTANCE_M,
            max_distance_m: MAX_MODEL_DISTANCE_M,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 200,
            learning_rate: 0.5,
            decay_after: 50,
            decay_factor: 0.99,
            meters_per_deg_lat: METERS_PER_DEG_LAT,
            meters_per_deg_lon: METERS_PER_DEG_LON,
            base_radius_m: 50.0,
            min_radius_m: 50.0,
            max_radius_m: 2000.0,
        }
    }
}

impl Default for TwoAnchorConfig {
    fn default() -> Self {
        Self {
            strategy: TwoAnchorStrategy::WeightedCentroid,
            min_separation_m: 10.0,
            min_radius_m: 100.0,
        }
    }
}

impl Default for SpoofingConfig {
    fn default() -> Self {
        Self {
            suspected_threshold: 0.5,
            monitor_threshold: 0.3,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unobstructed line of sight
    pub fn free_space() -> Self {
        Self::with_path_loss_exponent(2.0)
    }

    /// Built-up outdoor environment
    pub fn urban() -> Self {
        Self::with_path_loss_exponent(3.0)
    }

    pub fn indoor() -> Self {
        Self::with_path_loss_exponent(4.0)
    }

    pub fn with_path_loss_exponent(exponent: f64) -> Self {
        let mut config = Self::default();
        config.path_loss.path_loss_exponent = exponent;
        config
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;

        config.ensure_valid()?;
        log::debug!("loaded engine configuration from {}", path_str);
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Fail with the first validation error, logging any warnings
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let validation = self.validate();
        for warning in &validation.warnings {
            log::warn!("configuration: {}", warning);
        }
        match validation.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let path_loss = &self.path_loss;
        if !path_loss.tx_power_dbm.is_finite() {
            errors.push(invalid("path_loss.tx_power_dbm", path_loss.tx_power_dbm, "must be finite"));
        }
        if !(path_loss.path_loss_exponent > 0.0 && path_loss.path_loss_exponent <= 10.0) {
            errors.push(invalid(
                "path_loss.path_loss_exponent",
                path_loss.path_loss_exponent,
                "must be in (0, 10]",
            ));
        } else if path_loss.path_loss_exponent < 2.0 || path_loss.path_loss_exponent > 4.0 {
            warnings.push(format!(
                "path loss exponent {} is outside the usual 2.0-4.0 range",
                path_loss.path_loss_exponent
            ));
        }
        if !(path_loss.min_distance_m > 0.0) || !path_loss.min_distance_m.is_finite() {
            errors.push(invalid("path_loss.min_distance_m", path_loss.min_distance_m, "must be positive"));
        }
        if !(path_loss.max_distance_m > path_loss.min_distance_m) || !path_loss.max_distance_m.is_finite() {
            errors.push(invalid(
                "path_loss.max_distance_m",
                path_loss.max_distance_m,
                "must be finite and greater than min_distance_m",
            ));
        }

        let solver = &self.solver;
        if solver.iterations == 0 {
            errors.push(invalid("solver.iterations", solver.iterations, "must be at least 1"));
        } else if solver.iterations > 10_000 {
            warnings.push(format!("{} solver iterations is unusually large", solver.iterations));
        }
        if !(solver.learning_rate > 0.0) || !solver.learning_rate.is_finite() {
            errors.push(invalid("solver.learning_rate", solver.learning_rate, "must be positive"));
        }
        if !(solver.decay_factor > 0.0 && solver.decay_factor <= 1.0) {
            errors.push(invalid("solver.decay_factor", solver.decay_factor, "must be in (0, 1]"));
        }
        if !(solver.meters_per_deg_lat > 0.0) || !solver.meters_per_deg_lat.is_finite() {
            errors.push(invalid("solver.meters_per_deg_lat", solver.meters_per_deg_lat, "must be positive"));
        }
        if !(solver.meters_per_deg_lon > 0.0) || !solver.meters_per_deg_lon.is_finite() {
            errors.push(invalid("solver.meters_per_deg_lon", solver.meters_per_deg_lon, "must be positive"));
        }
        if !(solver.base_radius_m >= 0.0) || !solver.base_radius_m.is_finite() {
            errors.push(invalid("solver.base_radius_m", solver.base_radius_m, "must be non-negative"));
        }
        if !(solver.min_radius_m > 0.0) || !(solver.max_radius_m >= solver.min_radius_m) {
            errors.push(invalid(
                "solver.max_radius_m",
                solver.max_radius_m,
                "radius bounds must satisfy 0 < min_radius_m <= max_radius_m",
            ));
        }

        let two = &self.two_anchor;
        if !(two.min_separation_m >= 0.0) || !two.min_separation_m.is_finite() {
            errors.push(invalid("two_anchor.min_separation_m", two.min_separation_m, "must be non-negative"));
        }
        if !(two.min_radius_m > 0.0) || !two.min_radius_m.is_finite() {
            errors.push(invalid("two_anchor.min_radius_m", two.min_radius_m, "must be positive"));
        }

        if let MissingSignalPolicy::AssumeDefault { default_rssi_dbm } = self.missing_signal {
            if !default_rssi_dbm.is_finite() {
                errors.push(invalid("missing_signal.default_rssi_dbm", default_rssi_dbm, "must be finite"));
            }
        }

        let spoofing = &self.spoofing;
        if !(0.0..=1.0).contains(&spoofing.suspected_threshold) {
            errors.push(invalid(
                "spoofing.suspected_threshold",
                spoofing.suspected_threshold,
                "must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&spoofing.monitor_threshold) {
            errors.push(invalid(
                "spoofing.monitor_threshold",
                spoofing.monitor_threshold,
                "must be within [0, 1]",
            ));
        } else if spoofing.monitor_threshold > spoofing.suspected_threshold {
            warnings.push("monitor threshold above suspected threshold never triggers on its own".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
