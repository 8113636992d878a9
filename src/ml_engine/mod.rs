//! Ensemble Yield Forecaster
//!
//! Maps environmental readings to a crop-yield estimate and a climate risk
//! assessment whose recommendations can annotate an allocation plan.
//!
//! ## Architecture
//! - `models`: four deterministic sub-models behind a closed `SubModel` enum
//! - `ensemble`: weighted combination, spread statistics (statrs), prediction bands
//! - `risk`: fixed-table risk factors, score, level and recommendations
//! - `forecaster`: `YieldForecaster`, the request entry point

pub mod ensemble;
pub mod forecaster;
pub mod models;
pub mod risk;

pub use ensemble::EnsemblePredictor;
pub use forecaster::YieldForecaster;
pub use models::SubModel;
pub use risk::RiskEngine;
