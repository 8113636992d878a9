//! Planner Configuration - engine tuning as operator-editable TOML values
//!
//! Every field carries a serde default equal to the built-in constant, so an
//! empty or partial file behaves exactly like no file at all for the keys it
//! leaves out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "RELIEF_PLANNER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "planner.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the planner and forecaster.
///
/// Load with `PlannerConfig::load()` which searches:
/// 1. `$RELIEF_PLANNER_CONFIG`
/// 2. `./planner.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub annealing: AnnealingConfig,

    #[serde(default)]
    pub refiner: RefinerConfig,

    #[serde(default)]
    pub allocation: AllocationConfig,

    #[serde(default)]
    pub cost: CostConfig,

    /// Sub-model weights for the yield ensemble
    #[serde(default)]
    pub ensemble_weights: EnsembleWeightsConfig,
}

impl PlannerConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults (with a warning) when a candidate file fails to load.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded planner config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {}, falling back",
                            CONFIG_ENV_VAR
                        );
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded planner config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No planner config found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {err}", path = .0.display(), err = .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({path}): {err}", path = .0.display(), err = .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Annealing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Outer iterations; each sweeps every bit once.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Starting temperature of the quadratic cooling schedule.
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,

    /// Fixed seed for reproducible runs. Fresh entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_iterations() -> usize { defaults::ANNEALING_ITERATIONS }
fn default_initial_temperature() -> f64 { defaults::ANNEALING_INITIAL_TEMPERATURE }

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            initial_temperature: default_initial_temperature(),
            seed: None,
        }
    }
}

// ============================================================================
// Refiner
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinerConfig {
    #[serde(default = "default_refine_steps")]
    pub steps: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Central-difference step.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Final energy within this distance of the best counts as converged.
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f64,

    /// Seed for the initial angles. A fixed default seed is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_refine_steps() -> usize { defaults::REFINER_STEPS }
fn default_learning_rate() -> f64 { defaults::REFINER_LEARNING_RATE }
fn default_epsilon() -> f64 { defaults::REFINER_EPSILON }
fn default_convergence_tolerance() -> f64 { defaults::REFINER_CONVERGENCE_TOLERANCE }

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            steps: default_refine_steps(),
            learning_rate: default_learning_rate(),
            epsilon: default_epsilon(),
            convergence_tolerance: default_convergence_tolerance(),
            seed: None,
        }
    }
}

// ============================================================================
// Allocation & Cost
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Largest share of a resource type's pooled supply one location may receive.
    #[serde(default = "default_max_share")]
    pub max_share_per_location: f64,
}

fn default_max_share() -> f64 { defaults::MAX_SHARE_PER_LOCATION }

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_share_per_location: default_max_share(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostConfig {
    /// Placeholder distance (km) for pairs lacking coordinates.
    ///
    /// When unset, such pairs are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_distance_km: Option<f64>,
}

// ============================================================================
// Ensemble Weights
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeightsConfig {
    #[serde(default = "default_w_polynomial")]
    pub polynomial: f64,
    #[serde(default = "default_w_layered")]
    pub layered: f64,
    #[serde(default = "default_w_rule_based")]
    pub rule_based: f64,
    #[serde(default = "default_w_stumps")]
    pub stumps: f64,
}

fn default_w_polynomial() -> f64 { 0.3 }
fn default_w_layered() -> f64 { 0.3 }
fn default_w_rule_based() -> f64 { 0.2 }
fn default_w_stumps() -> f64 { 0.2 }

impl EnsembleWeightsConfig {
    pub fn sum(&self) -> f64 {
        self.polynomial + self.layered + self.rule_based + self.stumps
    }
}

impl Default for EnsembleWeightsConfig {
    fn default() -> Self {
        Self {
            polynomial: default_w_polynomial(),
            layered: default_w_layered(),
            rule_based: default_w_rule_based(),
            stumps: default_w_stumps(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(PlannerConfig::default().validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: PlannerConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.annealing.iterations, 200);
        assert_eq!(config.annealing.initial_temperature, 10.0);
        assert_eq!(config.refiner.steps, 50);
        assert_eq!(config.allocation.max_share_per_location, 0.30);
        assert!(config.cost.fallback_distance_km.is_none());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r"
[annealing]
iterations = 50
seed = 42
";
        let config = PlannerConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.annealing.iterations, 50);
        assert_eq!(config.annealing.seed, Some(42));
        assert_eq!(config.annealing.initial_temperature, 10.0);
        assert_eq!(config.refiner.learning_rate, 0.1);
    }

    #[test]
    fn test_validation_catches_bad_weights() {
        let mut config = PlannerConfig::default();
        config.ensemble_weights.polynomial = 0.9;
        config.ensemble_weights.layered = 0.9;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation(ref e)) if e.iter().any(|m| m.contains("ensemble_weights"))
        ));
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = PlannerConfig::default();
        config.annealing.iterations = 0;
        config.refiner.epsilon = 0.0;
        config.allocation.max_share_per_location = 1.5;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3, "{errors:?}"),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_learning_rate_rejected() {
        let mut config = PlannerConfig::default();
        config.refiner.learning_rate = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut config = PlannerConfig::default();
        config.annealing.seed = Some(9);
        config.cost.fallback_distance_km = Some(55.0);
        let toml_str = config.to_toml().expect("serialization should work");
        assert!(toml_str.contains("[annealing]"));
        assert!(toml_str.contains("[ensemble_weights]"));
        let back = PlannerConfig::from_toml_str(&toml_str).expect("deserialization should work");
        assert_eq!(config, back);
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err =
            PlannerConfig::load_from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
