//! Simulated annealing over location-selection bit vectors
//!
//! Each outer iteration sweeps every bit in index order, proposing the single
//! flip and accepting it by the Metropolis rule at the iteration's
//! temperature. Cooling is quadratic and reaches exactly zero on the final
//! iteration, so the last sweep is a pure greedy descent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::cost_matrix::CostMatrix;
use crate::config::defaults::{MAX_ITERATIONS, TRACE_PREALLOC_LIMIT};
use crate::config::AnnealingConfig;
use crate::types::{AnnealingReport, PlanError, Solution};

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingOptimizer {
    iterations: usize,
    initial_temperature: f64,
    seed: Option<u64>,
}

impl AnnealingOptimizer {
    pub fn new(
        iterations: usize,
        initial_temperature: f64,
        seed: Option<u64>,
    ) -> Result<Self, PlanError> {
        if iterations == 0 {
            return Err(PlanError::config("annealing iterations must be > 0"));
        }
        if iterations > MAX_ITERATIONS {
            return Err(PlanError::config(format!(
                "annealing iterations must be <= {MAX_ITERATIONS} (got {iterations})"
            )));
        }
        if !initial_temperature.is_finite() || initial_temperature < 0.0 {
            return Err(PlanError::config(format!(
                "initial temperature must be finite and >= 0 (got {initial_temperature})"
            )));
        }
        Ok(Self {
            iterations,
            initial_temperature,
            seed,
        })
    }

    pub fn from_config(config: &AnnealingConfig) -> Result<Self, PlanError> {
        Self::new(config.iterations, config.initial_temperature, config.seed)
    }

    /// T(t) = T0 · (1 − t/(T−1))². A single iteration runs at zero temperature.
    pub fn temperature_at(&self, t: usize) -> f64 {
        if self.iterations <= 1 {
            return 0.0;
        }
        let progress = t as f64 / (self.iterations - 1) as f64;
        self.initial_temperature * (1.0 - progress.min(1.0)).powi(2)
    }

    pub fn run(&self, matrix: &CostMatrix) -> Result<AnnealingReport, PlanError> {
        let n = matrix.size();
        if n == 0 {
            return Err(PlanError::invalid("cannot anneal over an empty cost matrix"));
        }

        let seed = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut bits: Vec<bool> = (0..n).map(|_| rng.gen::<bool>()).collect();
        let mut energy = matrix.energy(&bits);
        let mut best = Solution {
            bits: bits.clone(),
            energy,
        };
        let mut convergence_iteration = 0;

        let prealloc = self.iterations.min(TRACE_PREALLOC_LIMIT);
        let mut energy_trace = Vec::with_capacity(prealloc);
        let mut best_energy_trace = Vec::with_capacity(prealloc);
        let mut temperature_trace = Vec::with_capacity(prealloc);

        info!(
            n,
            seed,
            iterations = self.iterations,
            t0 = self.initial_temperature,
            "Annealing started"
        );

        for t in 0..self.iterations {
            let temperature = self.temperature_at(t);

            for b in 0..n {
                bits[b] = !bits[b];
                let candidate = matrix.energy(&bits);
                let delta = candidate - energy;

                let accept = delta < 0.0
                    || (temperature > 0.0 && rng.gen::<f64>() < (-delta / temperature).exp());

                if accept {
                    energy = candidate;
                    if energy < best.energy {
                        best = Solution {
                            bits: bits.clone(),
                            energy,
                        };
                        convergence_iteration = t;
                    }
                } else {
                    bits[b] = !bits[b];
                }
            }

            energy_trace.push(energy);
            best_energy_trace.push(best.energy);
            temperature_trace.push(temperature);
        }

        let tunneling_events = energy_trace.windows(2).filter(|w| w[1] > w[0]).count();

        debug!(convergence_iteration, tunneling_events, "Annealing traces recorded");
        info!(
            best_energy = best.energy,
            selected = best.selected_count(),
            "Annealing finished"
        );

        Ok(AnnealingReport {
            best,
            energy_trace,
            best_energy_trace,
            temperature_trace,
            convergence_iteration,
            tunneling_events,
            seed,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> CostMatrix {
        CostMatrix::from_rows(vec![
            vec![0.0, 5.0, 9.0, 2.0],
            vec![5.0, 0.0, 4.0, 7.0],
            vec![9.0, 4.0, 0.0, 1.0],
            vec![2.0, 7.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn zero_iterations_is_configuration_error() {
        assert!(matches!(
            AnnealingOptimizer::new(0, 10.0, None),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn negative_or_nan_temperature_is_configuration_error() {
        assert!(AnnealingOptimizer::new(10, -1.0, None).is_err());
        assert!(AnnealingOptimizer::new(10, f64::NAN, None).is_err());
        assert!(AnnealingOptimizer::new(10, 0.0, None).is_ok());
    }

    #[test]
    fn schedule_hits_zero_on_last_iteration() {
        let a = AnnealingOptimizer::new(200, 10.0, Some(1)).unwrap();
        assert_eq!(a.temperature_at(0), 10.0);
        assert_eq!(a.temperature_at(199), 0.0);
        assert!(a.temperature_at(100) < a.temperature_at(99));
    }

    #[test]
    fn single_iteration_runs_cold() {
        let a = AnnealingOptimizer::new(1, 10.0, Some(3)).unwrap();
        let report = a.run(&triangle()).unwrap();
        assert_eq!(report.temperature_trace, vec![0.0]);
    }

    #[test]
    fn traces_have_one_entry_per_iteration() {
        let a = AnnealingOptimizer::new(25, 5.0, Some(11)).unwrap();
        let report = a.run(&triangle()).unwrap();
        assert_eq!(report.energy_trace.len(), 25);
        assert_eq!(report.best_energy_trace.len(), 25);
        assert_eq!(report.temperature_trace.len(), 25);
        assert_eq!(report.seed, 11);
        assert_eq!(report.best.len(), 4);
    }

    #[test]
    fn best_energy_matches_best_bits() {
        let m = triangle();
        let report = AnnealingOptimizer::new(50, 10.0, Some(5)).unwrap().run(&m).unwrap();
        assert_eq!(m.energy(&report.best.bits), report.best.energy);
        assert!(report.best.energy <= *report.energy_trace.last().unwrap());
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let m = triangle();
        let a = AnnealingOptimizer::new(40, 10.0, Some(42)).unwrap();
        assert_eq!(a.run(&m).unwrap(), a.run(&m).unwrap());
    }

    #[test]
    fn unseeded_run_reports_seed_that_reproduces_it() {
        let m = triangle();
        let first = AnnealingOptimizer::new(30, 10.0, None).unwrap().run(&m).unwrap();
        let replay = AnnealingOptimizer::new(30, 10.0, Some(first.seed)).unwrap().run(&m).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn iterations_above_ceiling_are_configuration_error() {
        assert!(matches!(
            AnnealingOptimizer::new(MAX_ITERATIONS + 1, 10.0, None),
            Err(PlanError::Configuration(_))
        ));
        assert!(AnnealingOptimizer::new(MAX_ITERATIONS, 10.0, None).is_ok());
    }

    #[test]
    fn zero_temperature_never_tunnels() {
        let m = triangle();
        for seed in 0..8 {
            let report = AnnealingOptimizer::new(60, 0.0, Some(seed)).unwrap().run(&m).unwrap();
            assert_eq!(report.tunneling_events, 0, "seed {seed}");
            assert!(report.energy_trace.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn hot_start_tunnels_uphill() {
        let m = triangle();
        let report = AnnealingOptimizer::new(100, 1e6, Some(9)).unwrap().run(&m).unwrap();
        assert!(report.tunneling_events > 0, "{:?}", report.energy_trace);
    }
}
