//! Rule-based climate risk scoring and recommendation tables

use tracing::debug;

use crate::types::{FeatureVector, Recommendation, RiskAssessment, RiskFactor, RiskLevel};

const CRITICAL_SET: [Recommendation; 5] = [
    Recommendation::EmergencyIntervention,
    Recommendation::PrecisionIrrigation,
    Recommendation::DroughtResistantVarieties,
    Recommendation::MoistureConservation,
    Recommendation::ActivateInsurance,
];

const WARNING_SET: [Recommendation; 4] = [
    Recommendation::EnhancedMonitoring,
    Recommendation::OptimizeIrrigation,
    Recommendation::SupplementalNutrition,
    Recommendation::SoilHealth,
];

const OPTIMAL_SET: [Recommendation; 4] = [
    Recommendation::MaintainPractices,
    Recommendation::YieldMaximization,
    Recommendation::SurplusStorage,
    Recommendation::PremiumMarkets,
];

/// Stateless: every call is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEngine;

impl RiskEngine {
    /// Triggered factors in table order: temperature, rainfall, soil, humidity.
    pub fn factors(features: &FeatureVector) -> Vec<RiskFactor> {
        let mut factors = Vec::new();
        let (t, r) = (features.temperature, features.rainfall);

        if t > 38.0 {
            factors.push(RiskFactor::ExtremeHeat);
        } else if t > 32.0 {
            factors.push(RiskFactor::HeatStress);
        } else if t < 10.0 {
            factors.push(RiskFactor::FrostRisk);
        }

        if r < 20.0 {
            factors.push(RiskFactor::SevereDrought);
        } else if r > 200.0 {
            factors.push(RiskFactor::FloodRisk);
        }

        if features.soil_ph < 5.0 || features.soil_ph > 8.5 {
            factors.push(RiskFactor::ExtremeSoilPh);
        }
        if features.humidity > 90.0 {
            factors.push(RiskFactor::DiseasePressure);
        }
        factors
    }

    pub fn recommendations(features: &FeatureVector, estimate: f64) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = if estimate < 150.0 {
            CRITICAL_SET.to_vec()
        } else if estimate < 200.0 {
            WARNING_SET.to_vec()
        } else {
            OPTIMAL_SET.to_vec()
        };

        match features.season {
            1 => recs.push(Recommendation::WinterPreparation),
            2 => recs.push(Recommendation::SpringPlanting),
            3 => recs.push(Recommendation::SummerHeatWatch),
            4 => recs.push(Recommendation::AutumnHarvest),
            _ => {}
        }

        if features.temperature > 30.0 {
            recs.push(Recommendation::Agroforestry);
        }
        if features.rainfall < 50.0 {
            recs.push(Recommendation::RainwaterHarvesting);
        }
        recs
    }

    pub fn assess(features: &FeatureVector, estimate: f64) -> RiskAssessment {
        let factors = Self::factors(features);
        let total: u32 = factors.iter().map(|f| f.points()).sum();
        let score = u8::try_from(total.min(100)).unwrap_or(100);
        let level = RiskLevel::from_score(score);

        debug!(score, %level, factors = factors.len(), "Risk assessed");

        RiskAssessment {
            factors,
            score,
            level,
            recommendations: Self::recommendations(features, estimate),
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
    fn hot_and_dry_is_critical() {
        let a = RiskEngine::assess(&FeatureVector::with_defaults(40.0, 10.0), 150.0);
        assert_eq!(a.factors, vec![RiskFactor::ExtremeHeat, RiskFactor::SevereDrought]);
        assert_eq!(a.score, 85);
        assert_eq!(a.level, RiskLevel::Critical);
    }

    #[test]
    fn comfortable_conditions_are_low_risk() {
        let a = RiskEngine::assess(&FeatureVector::with_defaults(24.0, 100.0), 300.0);
        assert!(a.factors.is_empty());
        assert_eq!(a.score, 0);
        assert_eq!(a.level, RiskLevel::Low);
    }

    #[test]
    fn score_saturates_at_100() {
        let fv = FeatureVector {
            temperature: 45.0,
            rainfall: 0.0,
            humidity: 95.0,
            soil_ph: 3.0,
            elevation: 0.0,
            season: 3,
        };
        let a = RiskEngine::assess(&fv, 60.0);
        assert_eq!(a.score, 100);
        assert_eq!(a.factors.len(), 4);
    }

    #[test]
    fn heat_bands_are_exclusive() {
        let factors = |t| RiskEngine::factors(&FeatureVector::with_defaults(t, 100.0));
        assert_eq!(factors(38.0), vec![RiskFactor::HeatStress]);
        assert_eq!(factors(38.5), vec![RiskFactor::ExtremeHeat]);
        assert_eq!(factors(9.0), vec![RiskFactor::FrostRisk]);
    }

    #[test]
    fn recommendation_order_is_band_then_season_then_adaptation() {
        let recs = RiskEngine::recommendations(&FeatureVector::with_defaults(35.0, 20.0), 120.0);
        assert_eq!(recs[..5], CRITICAL_SET);
        assert_eq!(recs[5], Recommendation::SpringPlanting);
        assert_eq!(recs[6], Recommendation::Agroforestry);
        assert_eq!(recs[7], Recommendation::RainwaterHarvesting);
    }

    #[test]
    fn yield_bands_pick_table() {
        let fv = FeatureVector::with_defaults(24.0, 100.0);
        assert_eq!(RiskEngine::recommendations(&fv, 180.0)[0], Recommendation::EnhancedMonitoring);
        assert_eq!(RiskEngine::recommendations(&fv, 200.0)[0], Recommendation::MaintainPractices);
        assert_eq!(
            RiskEngine::recommendations(&fv, 149.9)[0],
            Recommendation::EmergencyIntervention
        );
    }
}
