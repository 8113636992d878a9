//! Yield forecasting types: feature vector, ensemble output, risk assessment

use serde::{Deserialize, Serialize};

use super::error::PlanError;

/// Environmental conditions for one forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean temperature (°C)
    pub temperature: f64,
    /// Rainfall (mm)
    pub rainfall: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    pub soil_ph: f64,
    /// Elevation (m)
    pub elevation: f64,
    /// Season index: 1 = winter, 2 = spring, 3 = summer, 4 = autumn
    pub season: u8,
}

impl FeatureVector {
    pub const DEFAULT_HUMIDITY: f64 = 65.0;
    pub const DEFAULT_SOIL_PH: f64 = 6.5;
    pub const DEFAULT_ELEVATION: f64 = 100.0;
    pub const DEFAULT_SEASON: u8 = 2;

    /// Build from the two mandatory readings, filling the documented defaults.
    pub const fn with_defaults(temperature: f64, rainfall: f64) -> Self {
        Self {
            temperature,
            rainfall,
            humidity: Self::DEFAULT_HUMIDITY,
            soil_ph: Self::DEFAULT_SOIL_PH,
            elevation: Self::DEFAULT_ELEVATION,
            season: Self::DEFAULT_SEASON,
        }
    }

    /// Reject non-finite readings and season indices outside 1..=4.
    ///
    /// Magnitudes are not range-checked; the sub-models clamp their outputs.
    pub fn validate(&self) -> Result<(), PlanError> {
        let fields = [
            ("temperature", self.temperature),
            ("rainfall", self.rainfall),
            ("humidity", self.humidity),
            ("soil_ph", self.soil_ph),
            ("elevation", self.elevation),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PlanError::invalid(format!(
                    "{name} must be a finite number (got {value})"
                )));
            }
        }
        if !(1..=4).contains(&self.season) {
            return Err(PlanError::invalid(format!("season must be 1-4 (got {})", self.season)));
        }
        Ok(())
    }

    pub(crate) fn as_array(&self) -> [f64; 6] {
        [
            self.temperature,
            self.rainfall,
            self.humidity,
            self.soil_ph,
            self.elevation,
            f64::from(self.season),
        ]
    }
}

/// Per-sub-model yield values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubModelOutputs {
    pub polynomial: f64,
    pub layered: f64,
    pub rule_based: f64,
    pub stumps: f64,
}

impl SubModelOutputs {
    pub const fn values(&self) -> [f64; 4] {
        [self.polynomial, self.layered, self.rule_based, self.stumps]
    }
}

/// Two-sided prediction bands around the ensemble estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower_95: f64,
    pub upper_95: f64,
    pub lower_80: f64,
    pub upper_80: f64,
}

/// Output of the ensemble before risk scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleEstimate {
    /// Weighted estimate, clamped to [50, 400]
    pub estimate: f64,
    pub outputs: SubModelOutputs,
    /// Population variance of the four sub-model outputs
    pub variance: f64,
    pub std_dev: f64,
    /// 0.7–1.0
    pub confidence: f64,
    pub interval: ConfidenceInterval,
}

/// Overall risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band for a 0–100 score: critical > 60, high > 40, medium > 20.
    pub const fn from_score(score: u8) -> Self {
        if score > 60 {
            Self::Critical
        } else if score > 40 {
            Self::High
        } else if score > 20 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A triggered environmental risk with a fixed point contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Temperature above 38 °C
    ExtremeHeat,
    /// Temperature above 32 °C
    HeatStress,
    /// Temperature below 10 °C
    FrostRisk,
    /// Rainfall below 20 mm
    SevereDrought,
    /// Rainfall above 200 mm
    FloodRisk,
    /// Soil pH below 5.0 or above 8.5
    ExtremeSoilPh,
    /// Humidity above 90 %
    DiseasePressure,
}

impl RiskFactor {
    pub const fn points(self) -> u32 {
        match self {
            Self::ExtremeHeat => 40,
            Self::HeatStress => 25,
            Self::FrostRisk => 30,
            Self::SevereDrought => 45,
            Self::FloodRisk => 35,
            Self::ExtremeSoilPh => 20,
            Self::DiseasePressure => 15,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ExtremeHeat => "Extreme heat - crop failure imminent",
            Self::HeatStress => "Heat stress - yield reduction expected",
            Self::FrostRisk => "Frost risk - crop damage possible",
            Self::SevereDrought => "Severe drought - irrigation critical",
            Self::FloodRisk => "Flood risk - drainage required",
            Self::ExtremeSoilPh => "Extreme soil pH - amendment needed",
            Self::DiseasePressure => "High disease pressure",
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Advice emitted by the risk engine, identified by a stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    // Estimate below 150
    EmergencyIntervention,
    PrecisionIrrigation,
    DroughtResistantVarieties,
    MoistureConservation,
    ActivateInsurance,
    // Estimate below 200
    EnhancedMonitoring,
    OptimizeIrrigation,
    SupplementalNutrition,
    SoilHealth,
    // Estimate 200 and above
    MaintainPractices,
    YieldMaximization,
    SurplusStorage,
    PremiumMarkets,
    // Season advice
    WinterPreparation,
    SpringPlanting,
    SummerHeatWatch,
    AutumnHarvest,
    // Adaptation notes
    Agroforestry,
    RainwaterHarvesting,
}

impl Recommendation {
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmergencyIntervention => "CRITICAL: Implement emergency intervention protocols",
            Self::PrecisionIrrigation => "Deploy precision irrigation systems immediately",
            Self::DroughtResistantVarieties => "Switch to drought-resistant crop varieties",
            Self::MoistureConservation => "Apply soil moisture conservation techniques",
            Self::ActivateInsurance => "Activate crop insurance and emergency funding",
            Self::EnhancedMonitoring => "WARNING: Enhanced monitoring required",
            Self::OptimizeIrrigation => "Optimize irrigation scheduling",
            Self::SupplementalNutrition => "Consider supplemental nutrition programs",
            Self::SoilHealth => "Implement soil health improvement measures",
            Self::MaintainPractices => "OPTIMAL: Maintain current best practices",
            Self::YieldMaximization => "Consider yield maximization techniques",
            Self::SurplusStorage => "Plan for surplus storage and distribution",
            Self::PremiumMarkets => "Evaluate premium market opportunities",
            Self::WinterPreparation => "Winter: Focus on soil preparation and cover crops",
            Self::SpringPlanting => "Spring: Optimal planting window - maximize seeding",
            Self::SummerHeatWatch => "Summer: Monitor heat stress and irrigation needs",
            Self::AutumnHarvest => "Autumn: Harvest optimization and post-harvest handling",
            Self::Agroforestry => "Implement agroforestry for temperature regulation",
            Self::RainwaterHarvesting => "Install rainwater harvesting systems",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Rule-based risk scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Triggered factors in evaluation order
    pub factors: Vec<RiskFactor>,
    /// 0–100
    pub score: u8,
    pub level: RiskLevel,
    /// Estimate-band advice, then season advice, then adaptation notes
    pub recommendations: Vec<Recommendation>,
}

/// Relative importance of each input, reported alongside every forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
    pub soil_ph: f64,
    pub elevation: f64,
    pub season: f64,
}

pub const FEATURE_IMPORTANCE: FeatureImportance = FeatureImportance {
    temperature: 0.25,
    rainfall: 0.30,
    humidity: 0.15,
    soil_ph: 0.12,
    elevation: 0.08,
    season: 0.10,
};

/// Whether the sub-models broadly agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStability {
    High,
    Medium,
}

/// Secondary indicators derived from the estimate and the risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAnalytics {
    pub yield_percentile: String,
    /// risk score / 100
    pub climate_stress_index: f64,
    /// max(0, (300 - estimate) / 300)
    pub adaptation_potential: f64,
    /// Share of sub-models within 20 units of the estimate
    pub model_agreement: f64,
    pub prediction_stability: PredictionStability,
    pub ensemble_variance: f64,
    pub feature_importance: FeatureImportance,
}

/// Full forecast for one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub features: FeatureVector,
    pub ensemble: EnsembleEstimate,
    pub risk: RiskAssessment,
    pub analytics: PredictionAnalytics,
}
