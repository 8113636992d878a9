//! Request and response records exchanged with the external caller

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::location::{Location, Resource};
use super::plan::{AllocationRecord, RouteStop};
use super::prediction::{
    ConfidenceInterval, FeatureVector, PredictionAnalytics, PredictionResult, RiskLevel,
    SubModelOutputs,
};

pub const DEFAULT_OBJECTIVE: &str = "minimize_cost";

fn default_objective() -> String {
    DEFAULT_OBJECTIVE.to_string()
}

/// Optimizer request. Empty lists fall back to the demo dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Per-run overrides, see `optimization::constraints`
    #[serde(default)]
    pub constraints: Map<String, Value>,
    #[serde(default = "default_objective")]
    pub objective: String,
    /// Attach per-iteration traces to the response details
    #[serde(default)]
    pub include_traces: bool,
}

impl Default for OptimizeRequest {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            resources: Vec::new(),
            constraints: Map::new(),
            objective: default_objective(),
            include_traces: false,
        }
    }
}

/// Annealing figures carried in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingSummary {
    pub iterations: usize,
    pub best_energy: f64,
    pub convergence_iteration: usize,
    pub tunneling_events: usize,
    pub seed: u64,
}

/// Refinement figures carried in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementSummary {
    pub steps: usize,
    pub energy: f64,
    pub converged: bool,
    pub seed: u64,
}

/// Per-iteration histories, returned only when the request asks for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTraces {
    /// Current annealing energy after each outer iteration
    pub energy_history: Vec<f64>,
    pub best_energy_history: Vec<f64>,
    pub temperature_schedule: Vec<f64>,
    /// Relaxed energy at each refiner step
    pub refinement_energy: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationDetails {
    pub annealing: AnnealingSummary,
    pub refinement: RefinementSummary,
    pub used_demo_locations: bool,
    pub used_demo_resources: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traces: Option<OptimizationTraces>,
}

/// Optimizer response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    pub routes: Vec<RouteStop>,
    pub allocation: BTreeMap<String, AllocationRecord>,
    /// Energy of the best solution
    pub total_cost: f64,
    /// Percentage energy reduction versus selecting every location
    pub efficiency_gain: f64,
    pub selected: Vec<bool>,
    /// Great-circle length of the route in stop order (km)
    pub route_distance_km: f64,
    pub details: OptimizationDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
}

/// Predictor request. Optional readings take the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub temperature: f64,
    #[serde(alias = "rainfall_mm")]
    pub rainfall: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u8>,
}

impl PredictRequest {
    pub fn features(&self) -> FeatureVector {
        let mut fv = FeatureVector::with_defaults(self.temperature, self.rainfall);
        if let Some(h) = self.humidity {
            fv.humidity = h;
        }
        if let Some(ph) = self.soil_ph {
            fv.soil_ph = ph;
        }
        if let Some(e) = self.elevation {
            fv.elevation = e;
        }
        if let Some(s) = self.season {
            fv.season = s;
        }
        fv
    }
}

/// Predictor response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_yield: f64,
    pub confidence_score: f64,
    pub confidence_interval: ConfidenceInterval,
    pub individual_models: SubModelOutputs,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub analytics: PredictionAnalytics,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_yield: round_to(result.ensemble.estimate, 2),
            confidence_score: round_to(result.ensemble.confidence, 3),
            confidence_interval: result.ensemble.interval,
            individual_models: result.ensemble.outputs,
            risk_score: result.risk.score,
            risk_level: result.risk.level,
            risk_factors: result.risk.factors.iter().map(ToString::to_string).collect(),
            recommendations: result.risk.recommendations.iter().map(ToString::to_string).collect(),
            analytics: result.analytics.clone(),
        }
    }
}

/// Combined request: forecast first, then a plan annotated with its advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub predict: PredictRequest,
    #[serde(default)]
    pub optimize: OptimizeRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub prediction: PredictionResponse,
    pub plan: OptimizationResponse,
}
