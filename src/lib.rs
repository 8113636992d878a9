//! relief-planner: crisis relief allocation and yield forecasting
//!
//! Two request pipelines share one configuration value:
//!
//! - **ResourcePlanner**: pairwise cost model → simulated annealing (with a
//!   parallel gradient refinement) → capped per-location allocations
//! - **YieldForecaster**: four-model ensemble → risk scoring → recommendations
//!
//! Engines are plain values built from a [`PlannerConfig`]; nothing is global.

pub mod config;
pub mod ml_engine;
pub mod optimization;
pub mod types;

pub use config::{ConfigError, PlannerConfig};
pub use ml_engine::YieldForecaster;
pub use optimization::ResourcePlanner;

pub use types::{
    FeatureVector, Location, OptimizationResponse, OptimizationTraces, OptimizeRequest, PlanError,
    PlanRequest, PlanResponse, PredictRequest, PredictionResponse, Priority, Resource, RiskLevel,
};

/// Forecast first, then plan with the forecast's recommendations attached.
pub fn plan(config: &PlannerConfig, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
    let (result, prediction) =
        YieldForecaster::new(config.ensemble_weights).predict(&request.predict)?;
    let plan = ResourcePlanner::new(config.clone())
        .optimize_with_risk(&request.optimize, Some(&result.risk))?;
    Ok(PlanResponse { prediction, plan })
}
