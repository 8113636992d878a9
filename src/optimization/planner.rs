//! ResourcePlanner - optimizer request entry point
//!
//! Request flow:
//! 1. Objective check and constraint overrides
//! 2. Demo fallback for empty locations/resources, then input validation
//! 3. Cost matrix
//! 4. Annealer and refiner in parallel over the read-only matrix
//! 5. Allocation formatting and summary metrics

use tracing::{debug, info};

use super::allocation::{route_distance_km, AllocationFormatter};
use super::annealing::AnnealingOptimizer;
use super::constraints::apply_constraints;
use super::cost_matrix::{CostMatrix, CostMatrixBuilder};
use super::demo::{demo_locations, demo_resources};
use super::refiner::LocalRefiner;
use crate::config::PlannerConfig;
use crate::types::{
    ratio_or, AnnealingSummary, OptimizationDetails, OptimizationResponse, OptimizationTraces,
    OptimizeRequest, PlanError, RefinementSummary, RiskAssessment, Solution, DEFAULT_OBJECTIVE,
};

/// Percentage energy reduction of `best` against selecting every location,
/// clamped to [0, 100]. Zero when the all-selected baseline is zero or not
/// finite.
pub fn efficiency_gain(matrix: &CostMatrix, best: &Solution) -> f64 {
    let baseline = matrix.energy(&vec![true; matrix.size()]);
    if !baseline.is_finite() || baseline <= 0.0 {
        return 0.0;
    }
    (ratio_or(baseline - best.energy, baseline, 0.0) * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Default)]
pub struct ResourcePlanner {
    config: PlannerConfig,
}

impl ResourcePlanner {
    pub const fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizationResponse, PlanError> {
        self.optimize_with_risk(request, None)
    }

    /// Optimize and annotate the plan with a forecaster's recommendations.
    pub fn optimize_with_risk(
        &self,
        request: &OptimizeRequest,
        risk: Option<&RiskAssessment>,
    ) -> Result<OptimizationResponse, PlanError> {
        if request.objective != DEFAULT_OBJECTIVE {
            return Err(PlanError::config(format!(
                "unsupported objective '{}' (only '{DEFAULT_OBJECTIVE}' is available)",
                request.objective
            )));
        }
        let config = apply_constraints(&self.config, &request.constraints)?;

        let used_demo_locations = request.locations.is_empty();
        let used_demo_resources = request.resources.is_empty();
        let locations = if used_demo_locations {
            demo_locations()
        } else {
            request.locations.clone()
        };
        let resources = if used_demo_resources {
            demo_resources()
        } else {
            request.resources.clone()
        };
        if used_demo_locations || used_demo_resources {
            info!(
                used_demo_locations,
                used_demo_resources, "Using demo dataset for empty request fields"
            );
        }

        for (i, l) in locations.iter().enumerate() {
            l.validate(i)?;
        }
        for (i, r) in resources.iter().enumerate() {
            r.validate(i)?;
        }

        let annealer = AnnealingOptimizer::from_config(&config.annealing)?;
        let refiner = LocalRefiner::from_config(&config.refiner)?;
        let matrix = CostMatrixBuilder::new(config.cost.fallback_distance_km).build(&locations)?;

        info!(
            locations = locations.len(),
            resources = resources.len(),
            iterations = config.annealing.iterations,
            "Planning relief allocation"
        );

        let (annealing, refinement) =
            rayon::join(|| annealer.run(&matrix), || refiner.run(&matrix));
        let annealing = annealing?;
        let refinement = refinement?;

        let plan = AllocationFormatter::new(config.allocation.max_share_per_location).format(
            &locations,
            &annealing.best,
            &resources,
            risk,
        );
        let gain = efficiency_gain(&matrix, &annealing.best);
        let distance = route_distance_km(&plan.routes);

        debug!(stops = plan.routes.len(), distance_km = distance, "Plan formatted");

        let traces = request.include_traces.then(|| OptimizationTraces {
            energy_history: annealing.energy_trace.clone(),
            best_energy_history: annealing.best_energy_trace.clone(),
            temperature_schedule: annealing.temperature_trace.clone(),
            refinement_energy: refinement.energy_trace.clone(),
        });
        info!(
            total_cost = annealing.best.energy,
            efficiency_gain = gain,
            seed = annealing.seed,
            "Plan complete"
        );

        Ok(OptimizationResponse {
            routes: plan.routes,
            allocation: plan.allocation,
            total_cost: annealing.best.energy,
            efficiency_gain: gain,
            selected: annealing.best.bits.clone(),
            route_distance_km: distance,
            details: OptimizationDetails {
                annealing: AnnealingSummary {
                    iterations: config.annealing.iterations,
                    best_energy: annealing.best.energy,
                    convergence_iteration: annealing.convergence_iteration,
                    tunneling_events: annealing.tunneling_events,
                    seed: annealing.seed,
                },
                refinement: RefinementSummary {
                    steps: config.refiner.steps,
                    energy: refinement.best_energy,
                    converged: refinement.converged,
                    seed: refinement.seed,
                },
                used_demo_locations,
                used_demo_resources,
                traces,
            },
            advisories: plan.advisories,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
