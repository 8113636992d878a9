//! Optimizer outputs: solutions, run reports, and the formatted allocation plan

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::location::{Coordinates, Priority};

/// Selected/unselected flag per location, with its energy under the cost matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub bits: Vec<bool>,
    pub energy: f64,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Indices of set bits, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Full trace of one annealing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingReport {
    pub best: Solution,
    /// Running energy at the end of each iteration
    pub energy_trace: Vec<f64>,
    /// Best energy seen up to and including each iteration
    pub best_energy_trace: Vec<f64>,
    pub temperature_trace: Vec<f64>,
    /// Iteration of the last best-energy improvement (0 if the start was never beaten)
    pub convergence_iteration: usize,
    /// Iterations whose running energy rose over the previous iteration
    pub tunneling_events: usize,
    pub seed: u64,
}

/// Result of the continuous refinement pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementReport {
    pub best_energy: f64,
    pub best_parameters: Vec<f64>,
    /// Energy evaluated at the start of each descent step
    pub energy_trace: Vec<f64>,
    /// Last step's energy within tolerance of the best
    pub converged: bool,
    pub seed: u64,
}

/// Quantity of one resource type assigned to one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub resource_type: String,
    pub unit: String,
    pub allocated: f64,
    /// Per-location ceiling: pooled supply × share cap
    pub cap: f64,
    /// min(1, allocated / demand); 1.0 when demand is zero
    pub demand_satisfaction: f64,
}

/// Allocation summary for one selected location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub location: String,
    pub allocations: Vec<ResourceAllocation>,
    /// Lowest satisfaction across resource types (0.0 with no resources)
    pub demand_satisfaction: f64,
    pub priority_multiplier: f64,
    pub delivery_window_hours: f64,
}

/// One stop on the delivery route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    /// 1-based visiting order
    pub sequence: usize,
    /// Index into the request's location list
    pub location_index: usize,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<String>,
    pub estimated_arrival_hours: f64,
    pub allocations: Vec<ResourceAllocation>,
}

/// Routes plus per-location allocation records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub routes: Vec<RouteStop>,
    /// Keyed `location_{index}`
    pub allocation: BTreeMap<String, AllocationRecord>,
    /// Forecast advice attached by the caller, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_indices_are_ascending() {
        let s = Solution {
            bits: vec![true, false, true, true],
            energy: 0.0,
        };
        assert_eq!(s.selected_indices(), vec![0, 2, 3]);
        assert_eq!(s.selected_count(), 3);
        assert_eq!(s.len(), 4);
    }
}
