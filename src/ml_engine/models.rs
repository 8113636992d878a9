//! The four deterministic yield sub-models
//!
//! Each is a pure function of the six environmental features, clamped into
//! the realistic yield range [50, 400]. Dispatch is a closed enum; the
//! ensemble weights live in config.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{YIELD_CEILING, YIELD_FLOOR};
use crate::config::EnsembleWeightsConfig;
use crate::types::FeatureVector;

/// Clamp into the yield range. NaN maps to the floor.
pub fn clamp_yield(value: f64) -> f64 {
    if value.is_nan() {
        YIELD_FLOOR
    } else {
        value.clamp(YIELD_FLOOR, YIELD_CEILING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubModel {
    Polynomial,
    Layered,
    RuleBased,
    Stumps,
}

impl SubModel {
    pub const ALL: [Self; 4] = [Self::Polynomial, Self::Layered, Self::RuleBased, Self::Stumps];

    pub const fn weight(self, weights: &EnsembleWeightsConfig) -> f64 {
        match self {
            Self::Polynomial => weights.polynomial,
            Self::Layered => weights.layered,
            Self::RuleBased => weights.rule_based,
            Self::Stumps => weights.stumps,
        }
    }

    pub fn evaluate(self, f: &FeatureVector) -> f64 {
        match self {
            Self::Polynomial => polynomial(f),
            Self::Layered => layered(f),
            Self::RuleBased => rule_based(f),
            Self::Stumps => stumps(f),
        }
    }
}

// ============================================================================
// Polynomial
// ============================================================================

const fn seasonal_multiplier(season: u8) -> f64 {
    match season {
        1 => 0.8,
        2 => 1.2,
        3 => 1.1,
        4 => 0.9,
        _ => 1.0,
    }
}

/// Quadratic response surface with two interaction terms.
///
/// Rainfall has diminishing returns peaking at 400 mm; heat above 35 °C and
/// rainfall below 30 mm are penalised before the seasonal multiplier.
fn polynomial(f: &FeatureVector) -> f64 {
    let (t, r, h, ph) = (f.temperature, f.rainfall, f.humidity, f.soil_ph);

    let temperature = -0.5 * (t - 24.0).powi(2) + 20.0;
    let rainfall = 0.08 * r - 0.0001 * r.powi(2);
    let humidity = 0.3 * (h - 50.0) - 0.01 * (h - 50.0).powi(2);

    let temp_rain = 0.05 * t * r / 100.0;
    let ph_temp = 2.0 * (7.0 - (ph - 6.8).abs()) * (30.0 - (t - 25.0).abs()) / 10.0;

    let heat_penalty = -3.0 * (t - 35.0).max(0.0);
    let drought_penalty = -0.5 * (30.0 - r).max(0.0);

    let base = 200.0 + temperature + rainfall + humidity + temp_rain + ph_temp;
    let raw = (base + heat_penalty + drought_penalty) * seasonal_multiplier(f.season);
    clamp_yield(raw)
}

// ============================================================================
// Layered (6 → 8 → 4 → 1, ReLU)
// ============================================================================

const LAYER1_ROW: [f64; 6] = [0.5, -0.3, 0.8, 0.2, -0.1, 0.4];
const LAYER1_WIDTH: usize = 8;
const LAYER2_ROW: [f64; LAYER1_WIDTH] = [0.3, 0.7, -0.2, 0.5, 0.1, -0.4, 0.6, 0.2];
const LAYER2_WIDTH: usize = 4;
const OUTPUT_WEIGHTS: [f64; LAYER2_WIDTH] = [0.8, 0.6, 0.4, 0.7];

fn dense_relu(input: &[f64], row: &[f64]) -> f64 {
    input.iter().zip(row).map(|(x, w)| x * w).sum::<f64>().max(0.0)
}

fn layered(f: &FeatureVector) -> f64 {
    let normalized = f.as_array().map(|x| (x - 50.0) / 50.0);

    let hidden1 = [dense_relu(&normalized, &LAYER1_ROW); LAYER1_WIDTH];
    let hidden2 = [dense_relu(&hidden1, &LAYER2_ROW); LAYER2_WIDTH];
    let output: f64 = hidden2.iter().zip(OUTPUT_WEIGHTS).map(|(h, w)| h * w).sum();

    clamp_yield(200.0 + 50.0 * output)
}

// ============================================================================
// Rule-based decision table
// ============================================================================

fn rule_based(f: &FeatureVector) -> f64 {
    let (t, r, h, ph) = (f.temperature, f.rainfall, f.humidity, f.soil_ph);
    if t > 35.0 {
        if r < 50.0 { 120.0 } else { 180.0 }
    } else if t < 15.0 {
        140.0
    } else if r > 100.0 {
        if h > 80.0 { 200.0 } else { 280.0 }
    } else if r < 30.0 {
        160.0
    } else if ph > 6.0 && ph < 7.5 {
        320.0
    } else {
        240.0
    }
}

// ============================================================================
// Boosted stumps
// ============================================================================

const STUMP_LEARNING_RATE: f64 = 0.1;

fn stumps(f: &FeatureVector) -> f64 {
    let base = 200.0 + (f.temperature - 25.0) * 2.0;
    let boosted = [
        180.0 + f.rainfall * 0.5,
        220.0 + (f.humidity - 60.0) * 0.3,
        210.0 + (f.soil_ph - 6.5) * 10.0,
        190.0 + f64::from(f.season) * 15.0,
    ];
    clamp_yield(base + STUMP_LEARNING_RATE * boosted.iter().sum::<f64>())
}

// ============================================================================
// Tests
// ============================================================================
