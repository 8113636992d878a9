//! Gradient refinement over a continuous relaxation of the selection problem
//!
//! Each location slot carries three angles. The first sets the slot's
//! selection probability p = cos²(θ/2); the other two are phase angles that
//! leave p unchanged and therefore have zero gradient. The refiner reports
//! the best relaxed energy it reaches and never overrides the annealer's
//! discrete solution.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::cost_matrix::CostMatrix;
use crate::config::defaults::{MAX_ITERATIONS, REFINER_DEFAULT_SEED, TRACE_PREALLOC_LIMIT};
use crate::config::RefinerConfig;
use crate::types::{PlanError, RefinementReport};

/// Angles per location slot.
const ANGLES_PER_SLOT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalRefiner {
    steps: usize,
    learning_rate: f64,
    epsilon: f64,
    convergence_tolerance: f64,
    seed: u64,
}

impl LocalRefiner {
    pub fn from_config(config: &RefinerConfig) -> Result<Self, PlanError> {
        if config.steps == 0 {
            return Err(PlanError::config("refiner steps must be > 0"));
        }
        if config.steps > MAX_ITERATIONS {
            return Err(PlanError::config(format!(
                "refiner steps must be <= {MAX_ITERATIONS} (got {})",
                config.steps
            )));
        }
        if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
            return Err(PlanError::config("refiner learning_rate must be finite and > 0"));
        }
        if !config.epsilon.is_finite() || config.epsilon <= 0.0 {
            return Err(PlanError::config("refiner epsilon must be finite and > 0"));
        }
        Ok(Self {
            steps: config.steps,
            learning_rate: config.learning_rate,
            epsilon: config.epsilon,
            convergence_tolerance: config.convergence_tolerance,
            seed: config.seed.unwrap_or(REFINER_DEFAULT_SEED),
        })
    }

    /// Relaxed energy of an angle vector against the cost matrix.
    pub fn energy(matrix: &CostMatrix, params: &[f64]) -> f64 {
        let probs: Vec<f64> = params
            .chunks(ANGLES_PER_SLOT)
            .map(|slot| (slot[0] / 2.0).cos().powi(2))
            .collect();
        matrix.relaxed_energy(&probs)
    }

    fn gradient(&self, matrix: &CostMatrix, params: &[f64]) -> Vec<f64> {
        (0..params.len())
            .into_par_iter()
            .map(|k| {
                let mut shifted = params.to_vec();
                shifted[k] = params[k] + self.epsilon;
                let plus = Self::energy(matrix, &shifted);
                shifted[k] = params[k] - self.epsilon;
                let minus = Self::energy(matrix, &shifted);
                (plus - minus) / (2.0 * self.epsilon)
            })
            .collect()
    }

    pub fn run(&self, matrix: &CostMatrix) -> Result<RefinementReport, PlanError> {
        let n = matrix.size();
        if n == 0 {
            return Err(PlanError::invalid("cannot refine over an empty cost matrix"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut params: Vec<f64> =
            (0..n * ANGLES_PER_SLOT).map(|_| rng.gen_range(0.0..TAU)).collect();

        let mut best_energy = f64::INFINITY;
        let mut best_parameters = params.clone();
        let mut energy_trace = Vec::with_capacity(self.steps.min(TRACE_PREALLOC_LIMIT));

        for step in 0..self.steps {
            let energy = Self::energy(matrix, &params);
            energy_trace.push(energy);
            if energy < best_energy {
                best_energy = energy;
                best_parameters.clone_from(&params);
            }

            let grad = self.gradient(matrix, &params);
            for (p, g) in params.iter_mut().zip(&grad) {
                *p -= self.learning_rate * g;
            }

            if step % 10 == 0 {
                debug!(step, energy, "Refiner step");
            }
        }

        let converged = energy_trace
            .last()
            .is_some_and(|last| (last - best_energy).abs() < self.convergence_tolerance);

        info!(n, steps = self.steps, best_energy, converged, "Refinement finished");

        Ok(RefinementReport {
            best_energy,
            best_parameters,
            energy_trace,
            converged,
            seed: self.seed,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
