//! Config validation: unknown-key detection with Levenshtein suggestions
//! and numeric range checks.
//!
//! Two-pass parse: the raw TOML is first walked as a `toml::Value` and every
//! key compared against the known field names, emitting "did you mean?"
//! warnings. Serde deserialization then proceeds normally. Warnings never
//! break an existing config file.

use std::collections::HashSet;

use super::defaults::MAX_ITERATIONS;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path in `PlannerConfig`.
///
/// Maintained by hand alongside `planner_config.rs`.
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    "annealing",
    "annealing.iterations",
    "annealing.initial_temperature",
    "annealing.seed",
    "refiner",
    "refiner.steps",
    "refiner.learning_rate",
    "refiner.epsilon",
    "refiner.convergence_tolerance",
    "refiner.seed",
    "allocation",
    "allocation.max_share_per_location",
    "cost",
    "cost.fallback_distance_km",
    "ensemble_weights",
    "ensemble_weights.polynomial",
    "ensemble_weights.layered",
    "ensemble_weights.rule_based",
    "ensemble_weights.stumps",
];

pub fn known_config_keys() -> HashSet<&'static str> {
    KNOWN_CONFIG_KEYS.iter().copied().collect()
}

/// Collect every dotted key path in a TOML value tree.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest candidate within edit distance 3. Ties resolve to the earlier candidate.
pub fn suggest_correction(unknown: &str, candidates: &[&str]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in candidates {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((k, dist)),
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Warn about config keys that no field consumes.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, KNOWN_CONFIG_KEYS),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Check numeric ranges on a parsed config.
///
/// Returns (errors, warnings): errors make the config unusable, warnings are
/// legal but suspicious.
pub fn validate_ranges(config: &super::PlannerConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let a = &config.annealing;
    if a.iterations == 0 {
        errors.push("annealing.iterations must be > 0".to_string());
    }
    if a.iterations > MAX_ITERATIONS {
        errors.push(format!("annealing.iterations = {} must be <= {MAX_ITERATIONS}", a.iterations));
    }
    if !a.initial_temperature.is_finite() || a.initial_temperature < 0.0 {
        errors.push(format!(
            "annealing.initial_temperature = {} must be a finite number >= 0",
            a.initial_temperature
        ));
    }
    if a.iterations > 100_000 && a.iterations <= MAX_ITERATIONS {
        warnings.push(ValidationWarning {
            field: "annealing.iterations".to_string(),
            message: format!(
                "annealing.iterations = {} will make every request slow",
                a.iterations
            ),
            suggestion: None,
        });
    }

    let r = &config.refiner;
    if r.steps == 0 {
        errors.push("refiner.steps must be > 0".to_string());
    }
    if r.steps > MAX_ITERATIONS {
        errors.push(format!("refiner.steps = {} must be <= {MAX_ITERATIONS}", r.steps));
    }
    if !r.learning_rate.is_finite() || r.learning_rate <= 0.0 {
        errors.push(format!("refiner.learning_rate = {} must be finite and > 0", r.learning_rate));
    }
    if !r.epsilon.is_finite() || r.epsilon <= 0.0 {
        errors.push(format!(
            "refiner.epsilon = {} must be finite and > 0 (used as divisor)",
            r.epsilon
        ));
    }
    if !r.convergence_tolerance.is_finite() || r.convergence_tolerance < 0.0 {
        errors.push(format!(
            "refiner.convergence_tolerance = {} must be finite and >= 0",
            r.convergence_tolerance
        ));
    }

    let share = config.allocation.max_share_per_location;
    if !share.is_finite() || share <= 0.0 || share > 1.0 {
        errors.push(format!("allocation.max_share_per_location = {share} must be in (0, 1]"));
    }

    if let Some(d) = config.cost.fallback_distance_km {
        if !d.is_finite() || d <= 0.0 {
            errors.push(format!("cost.fallback_distance_km = {d} must be finite and > 0"));
        }
    }

    let w = &config.ensemble_weights;
    let weights = [
        ("polynomial", w.polynomial),
        ("layered", w.layered),
        ("rule_based", w.rule_based),
        ("stumps", w.stumps),
    ];
    for (name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("ensemble_weights.{name} = {value} must be finite and >= 0"));
        }
    }
    let sum = w.sum();
    if !(0.95..=1.05).contains(&sum) {
        errors.push(format!("ensemble_weights must sum to ~1.0, got {sum:.2}"));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
