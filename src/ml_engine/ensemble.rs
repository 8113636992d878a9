//! Weighted ensemble over the four sub-models
//!
//! Spread statistics use statrs: the population variance of the four
//! sub-model outputs drives both the confidence score and the 95%/80%
//! prediction bands.

use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::debug;

use super::models::{clamp_yield, SubModel};
use crate::config::defaults::{CONFIDENCE_FLOOR, Z_80, Z_95};
use crate::config::EnsembleWeightsConfig;
use crate::types::{ratio_or, ConfidenceInterval, EnsembleEstimate, FeatureVector, SubModelOutputs};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnsemblePredictor {
    weights: EnsembleWeightsConfig,
}

impl EnsemblePredictor {
    pub const fn new(weights: EnsembleWeightsConfig) -> Self {
        Self { weights }
    }

    /// Evaluate every sub-model and combine them. Features must already be validated.
    pub fn predict(&self, features: &FeatureVector) -> EnsembleEstimate {
        let values: Vec<f64> = SubModel::ALL.par_iter().map(|m| m.evaluate(features)).collect();
        let outputs = SubModelOutputs {
            polynomial: values[0],
            layered: values[1],
            rule_based: values[2],
            stumps: values[3],
        };

        let estimate = clamp_yield(
            SubModel::ALL
                .iter()
                .zip(&values)
                .map(|(m, v)| m.weight(&self.weights) * v)
                .sum(),
        );

        let variance = values.iter().population_variance();
        let std_dev = variance.sqrt();
        let confidence = (1.0 - ratio_or(std_dev, estimate, 1.0)).clamp(CONFIDENCE_FLOOR, 1.0);

        debug!(estimate, variance, confidence, "Ensemble combined");

        EnsembleEstimate {
            estimate,
            outputs,
            variance,
            std_dev,
            confidence,
            interval: ConfidenceInterval {
                lower_95: estimate - Z_95 * std_dev,
                upper_95: estimate + Z_95 * std_dev,
                lower_80: estimate - Z_80 * std_dev,
                upper_80: estimate + Z_80 * std_dev,
            },
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
    fn reference_scenario_combines_weighted_outputs() {
        let est = EnsemblePredictor::default().predict(&FeatureVector::with_defaults(25.0, 800.0));
        assert!((est.outputs.polynomial - 326.34).abs() < 1e-9);
        assert_eq!(est.outputs.layered, 200.0);
        assert_eq!(est.outputs.rule_based, 280.0);
        assert!((est.estimate - 278.532).abs() < 1e-6, "got {}", est.estimate);
    }

    #[test]
    fn variance_is_population_variance_of_outputs() {
        let est = EnsemblePredictor::default().predict(&FeatureVector::with_defaults(25.0, 800.0));
        let v = est.outputs.values();
        let mean = v.iter().sum::<f64>() / 4.0;
        let expected = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4.0;
        assert!((est.variance - expected).abs() < 1e-9);
        assert!((est.std_dev - expected.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn interval_bands_nest_around_estimate() {
        let est = EnsemblePredictor::default().predict(&FeatureVector::with_defaults(30.0, 60.0));
        let i = est.interval;
        assert!(i.lower_95 <= i.lower_80 && i.lower_80 <= est.estimate);
        assert!(est.estimate <= i.upper_80 && i.upper_80 <= i.upper_95);
        assert!((i.upper_95 - est.estimate - 1.96 * est.std_dev).abs() < 1e-9);
    }

    #[test]
    fn confidence_never_below_floor() {
        for (t, r) in [(25.0, 800.0), (45.0, 0.0), (-10.0, 3000.0), (20.0, 60.0)] {
            let est = EnsemblePredictor::default().predict(&FeatureVector::with_defaults(t, r));
            assert!(
                (0.7..=1.0).contains(&est.confidence),
                "confidence {} at ({t}, {r})",
                est.confidence
            );
        }
    }

    #[test]
    fn custom_weights_select_single_model() {
        let only_rules = EnsembleWeightsConfig {
            polynomial: 0.0,
            layered: 0.0,
            rule_based: 1.0,
            stumps: 0.0,
        };
        let est =
            EnsemblePredictor::new(only_rules).predict(&FeatureVector::with_defaults(25.0, 800.0));
        assert_eq!(est.estimate, 280.0);
    }
}
