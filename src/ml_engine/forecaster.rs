//! YieldForecaster - predictor request entry point
//!
//! Fills documented defaults, validates the feature vector, runs the ensemble
//! and risk engine, then derives the analytics block.

use tracing::info;

use super::ensemble::EnsemblePredictor;
use super::risk::RiskEngine;
use crate::config::defaults::{
    ADAPTATION_REFERENCE_YIELD, HIGH_STABILITY_VARIANCE, MODEL_AGREEMENT_BAND,
};
use crate::config::EnsembleWeightsConfig;
use crate::types::{
    EnsembleEstimate, FeatureVector, PlanError, PredictRequest, PredictionAnalytics,
    PredictionResponse, PredictionResult, PredictionStability, RiskAssessment, FEATURE_IMPORTANCE,
};

pub fn yield_percentile(estimate: f64) -> &'static str {
    if estimate > 300.0 {
        "Top 10% - Exceptional yield"
    } else if estimate > 250.0 {
        "Top 25% - Above average yield"
    } else if estimate > 200.0 {
        "50th percentile - Average yield"
    } else if estimate > 150.0 {
        "25th percentile - Below average yield"
    } else {
        "Bottom 10% - Critical yield shortage"
    }
}

fn analytics(ensemble: &EnsembleEstimate, risk: &RiskAssessment) -> PredictionAnalytics {
    let est = ensemble.estimate;
    let outputs = ensemble.outputs.values();
    let agreeing = outputs.iter().filter(|p| (*p - est).abs() < MODEL_AGREEMENT_BAND).count();

    PredictionAnalytics {
        yield_percentile: yield_percentile(est).to_string(),
        climate_stress_index: f64::from(risk.score) / 100.0,
        adaptation_potential: ((ADAPTATION_REFERENCE_YIELD - est) / ADAPTATION_REFERENCE_YIELD)
            .max(0.0),
        model_agreement: agreeing as f64 / outputs.len() as f64,
        prediction_stability: if ensemble.variance < HIGH_STABILITY_VARIANCE {
            PredictionStability::High
        } else {
            PredictionStability::Medium
        },
        ensemble_variance: ensemble.variance,
        feature_importance: FEATURE_IMPORTANCE,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YieldForecaster {
    ensemble: EnsemblePredictor,
}

impl YieldForecaster {
    pub const fn new(weights: EnsembleWeightsConfig) -> Self {
        Self {
            ensemble: EnsemblePredictor::new(weights),
        }
    }

    pub fn forecast(&self, features: &FeatureVector) -> Result<PredictionResult, PlanError> {
        features.validate()?;

        let ensemble = self.ensemble.predict(features);
        let risk = RiskEngine::assess(features, ensemble.estimate);
        let analytics = analytics(&ensemble, &risk);

        info!(
            estimate = ensemble.estimate,
            confidence = ensemble.confidence,
            risk_score = risk.score,
            risk_level = %risk.level,
            "Yield forecast complete"
        );

        Ok(PredictionResult {
            features: *features,
            ensemble,
            risk,
            analytics,
        })
    }

    /// Wire-level entry: defaults, forecast, and response shaping.
    pub fn predict(
        &self,
        request: &PredictRequest,
    ) -> Result<(PredictionResult, PredictionResponse), PlanError> {
        let result = self.forecast(&request.features())?;
        let response = PredictionResponse::from(&result);
        Ok((result, response))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;

    #[test]
    fn percentile_bands() {
        assert_eq!(yield_percentile(320.0), "Top 10% - Exceptional yield");
        assert_eq!(yield_percentile(300.0), "Top 25% - Above average yield");
        assert_eq!(yield_percentile(201.0), "50th percentile - Average yield");
        assert_eq!(yield_percentile(151.0), "25th percentile - Below average yield");
        assert_eq!(yield_percentile(150.0), "Bottom 10% - Critical yield shortage");
    }

    #[test]
    fn reference_forecast_analytics() {
        let result = YieldForecaster::default()
            .forecast(&FeatureVector::with_defaults(25.0, 800.0))
            .unwrap();
        let a = &result.analytics;
        // Flood risk only (rainfall > 200)
        assert_eq!(result.risk.score, 35);
        assert!((a.climate_stress_index - 0.35).abs() < 1e-12);
        assert_eq!(a.yield_percentile, "Top 25% - Above average yield");
        // Only rule-based (280) sits within 20 of 278.53
        assert!((a.model_agreement - 0.25).abs() < 1e-12);
        assert_eq!(a.prediction_stability, PredictionStability::Medium);
        assert!(a.adaptation_potential > 0.0 && a.adaptation_potential < 0.1);
    }

    #[test]
    fn invalid_season_rejected() {
        let req = PredictRequest {
            temperature: 20.0,
            rainfall: 100.0,
            humidity: None,
            soil_ph: None,
            elevation: None,
            season: Some(7),
        };
        assert!(matches!(
            YieldForecaster::default().predict(&req),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn response_rounds_and_maps_risk() {
        let req = PredictRequest {
            temperature: 40.0,
            rainfall: 10.0,
            humidity: None,
            soil_ph: None,
            elevation: None,
            season: None,
        };
        let (_, resp) = YieldForecaster::default().predict(&req).unwrap();
        assert_eq!(resp.risk_level, RiskLevel::Critical);
        assert_eq!(resp.risk_factors.len(), 2);
        assert_eq!(resp.predicted_yield, (resp.predicted_yield * 100.0).round() / 100.0);
    }
}
