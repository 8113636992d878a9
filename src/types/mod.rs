//! Shared data structures for the relief planning pipeline
//!
//! - Inputs: `Location`, `Resource`, `FeatureVector`
//! - Optimizer outputs: `Solution`, `AnnealingReport`, `RefinementReport`, `AllocationPlan`
//! - Forecaster outputs: `EnsembleEstimate`, `RiskAssessment`, `PredictionResult`
//! - Wire records: `OptimizeRequest`/`OptimizationResponse`, `PredictRequest`/`PredictionResponse`

mod error;
mod location;
mod plan;
mod prediction;
mod request;

pub use error::*;
pub use location::*;
pub use plan::*;
pub use prediction::*;
pub use request::*;
