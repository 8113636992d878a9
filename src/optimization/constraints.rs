//! Per-request constraint overrides
//!
//! The request's free-form `constraints` map is folded over a copy of the
//! loaded `PlannerConfig`. Known keys must carry well-typed, in-range values;
//! unknown keys are logged with a closest-match suggestion and ignored.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::defaults::MAX_ITERATIONS;
use crate::config::validation::suggest_correction;
use crate::config::PlannerConfig;
use crate::types::PlanError;

/// Keys accepted in an optimizer request's `constraints` map.
pub const CONSTRAINT_KEYS: &[&str] = &[
    "iterations",
    "initial_temperature",
    "seed",
    "refine_steps",
    "fallback_distance_km",
    "max_share_per_location",
];

fn iteration_count(key: &str, value: &Value) -> Result<usize, PlanError> {
    let count = value
        .as_u64()
        .filter(|&v| v > 0)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| {
            PlanError::config(format!(
                "constraint '{key}' must be a positive integer (got {value})"
            ))
        })?;
    if count > MAX_ITERATIONS {
        return Err(PlanError::config(format!(
            "constraint '{key}' must be <= {MAX_ITERATIONS} (got {count})"
        )));
    }
    Ok(count)
}

fn finite_number(key: &str, value: &Value) -> Result<f64, PlanError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            PlanError::config(format!("constraint '{key}' must be a finite number (got {value})"))
        })
}

/// Return `base` with every recognised constraint applied.
pub fn apply_constraints(
    base: &PlannerConfig,
    constraints: &Map<String, Value>,
) -> Result<PlannerConfig, PlanError> {
    let mut config = base.clone();

    for (key, value) in constraints {
        match key.as_str() {
            "iterations" => config.annealing.iterations = iteration_count(key, value)?,
            "initial_temperature" => {
                let t = finite_number(key, value)?;
                if t < 0.0 {
                    return Err(PlanError::config(format!(
                        "constraint 'initial_temperature' must be >= 0 (got {t})"
                    )));
                }
                config.annealing.initial_temperature = t;
            }
            "seed" => {
                let seed = value.as_u64().ok_or_else(|| {
                    PlanError::config(format!(
                        "constraint 'seed' must be a non-negative integer (got {value})"
                    ))
                })?;
                config.annealing.seed = Some(seed);
            }
            "refine_steps" => config.refiner.steps = iteration_count(key, value)?,
            "fallback_distance_km" => {
                let d = finite_number(key, value)?;
                if d <= 0.0 {
                    return Err(PlanError::config(format!(
                        "constraint 'fallback_distance_km' must be > 0 (got {d})"
                    )));
                }
                config.cost.fallback_distance_km = Some(d);
            }
            "max_share_per_location" => {
                let share = finite_number(key, value)?;
                if share <= 0.0 || share > 1.0 {
                    return Err(PlanError::config(format!(
                        "constraint 'max_share_per_location' must be in (0, 1] (got {share})"
                    )));
                }
                config.allocation.max_share_per_location = share;
            }
            unknown => match suggest_correction(unknown, CONSTRAINT_KEYS) {
                Some(s) => {
                    warn!(key = unknown, "Ignoring unknown constraint (did you mean '{s}'?)");
                }
                None => warn!(key = unknown, "Ignoring unknown constraint"),
            },
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_constraints_keep_config() {
        let base = PlannerConfig::default();
        assert_eq!(apply_constraints(&base, &Map::new()).unwrap(), base);
    }

    #[test]
    fn known_keys_override_config() {
        let c = map(json!({
            "iterations": 30,
            "initial_temperature": 2.5,
            "seed": 7,
            "refine_steps": 12,
            "fallback_distance_km": 80.0,
            "max_share_per_location": 0.5
        }));
        let cfg = apply_constraints(&PlannerConfig::default(), &c).unwrap();
        assert_eq!(cfg.annealing.iterations, 30);
        assert_eq!(cfg.annealing.initial_temperature, 2.5);
        assert_eq!(cfg.annealing.seed, Some(7));
        assert_eq!(cfg.refiner.steps, 12);
        assert_eq!(cfg.cost.fallback_distance_km, Some(80.0));
        assert_eq!(cfg.allocation.max_share_per_location, 0.5);
    }

    #[test]
    fn wrong_types_are_configuration_errors() {
        for bad in [
            json!({"iterations": "many"}),
            json!({"iterations": 0}),
            json!({"iterations": -4}),
            json!({"initial_temperature": -1.0}),
            json!({"seed": -1}),
            json!({"max_share_per_location": 1.5}),
            json!({"fallback_distance_km": 0}),
        ] {
            let result = apply_constraints(&PlannerConfig::default(), &map(bad.clone()));
            assert!(matches!(result, Err(PlanError::Configuration(_))), "{bad} should be rejected");
        }
    }

    #[test]
    fn oversized_counts_are_rejected_before_running() {
        for key in ["iterations", "refine_steps"] {
            let c = map(json!({ key: 4_611_686_018_427_387_904_u64 }));
            let result = apply_constraints(&PlannerConfig::default(), &c);
            assert!(
                matches!(result, Err(PlanError::Configuration(ref m)) if m.contains(key)),
                "{key}"
            );
        }
        let c = map(json!({"iterations": MAX_ITERATIONS, "refine_steps": MAX_ITERATIONS}));
        let cfg = apply_constraints(&PlannerConfig::default(), &c).unwrap();
        assert_eq!(cfg.annealing.iterations, MAX_ITERATIONS);
        assert_eq!(cfg.refiner.steps, MAX_ITERATIONS);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let c = map(json!({"iteratons": 5, "budget": 1000}));
        let cfg = apply_constraints(&PlannerConfig::default(), &c).unwrap();
        assert_eq!(cfg, PlannerConfig::default());
        assert_eq!(suggest_correction("iteratons", CONSTRAINT_KEYS).as_deref(), Some("iterations"));
    }
}
