//! Relief Allocation Optimizer
//!
//! Selects which crisis locations to serve by annealing over a pairwise cost
//! model, refines a continuous relaxation of the same model for reporting,
//! and formats the selection into capped per-location allocations.
//!
//! ## Architecture
//! - `cost_matrix`: haversine × priority pairwise weights
//! - `annealing`: seeded simulated annealing over selection bit vectors
//! - `refiner`: finite-difference gradient descent on the relaxed energy
//! - `allocation`: routes, pooled supply and per-location share caps
//! - `constraints`: per-request overrides of the loaded config
//! - `planner`: `ResourcePlanner`, the request entry point

pub mod allocation;
pub mod annealing;
pub mod constraints;
pub mod cost_matrix;
mod demo;
pub mod planner;
pub mod refiner;

pub use allocation::AllocationFormatter;
pub use annealing::AnnealingOptimizer;
pub use cost_matrix::{haversine_km, CostMatrix, CostMatrixBuilder};
pub use demo::{demo_locations, demo_resources};
pub use planner::ResourcePlanner;
pub use refiner::LocalRefiner;
