//! Turns a selection bit vector into delivery routes and capped allocations
//!
//! Route order is selection order in index order; there is no routing pass.
//! Each stop receives, per pooled resource type,
//! `min(demand × priority multiplier, pooled supply × share cap)`.

use std::collections::BTreeMap;

use super::cost_matrix::haversine_km;
use crate::config::defaults::{
    ARRIVAL_BASE_HOURS, ARRIVAL_STEP_HOURS, DELIVERY_WINDOW_BASE_HOURS, DELIVERY_WINDOW_STEP_HOURS,
};
use crate::types::{
    ratio_or, AllocationPlan, AllocationRecord, Location, Resource, ResourceAllocation,
    RiskAssessment, RouteStop, Solution,
};

/// Total supply of one resource type across every request entry carrying its tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledResource {
    pub resource_type: String,
    pub unit: String,
    pub total: f64,
}

/// Pool resources by type tag, keeping first-appearance order and unit.
pub fn pool_resources(resources: &[Resource]) -> Vec<PooledResource> {
    let mut pooled: Vec<PooledResource> = Vec::new();
    for r in resources {
        match pooled.iter_mut().find(|p| p.resource_type == r.resource_type) {
            Some(p) => p.total += r.quantity,
            None => pooled.push(PooledResource {
                resource_type: r.resource_type.clone(),
                unit: r.unit.clone(),
                total: r.quantity,
            }),
        }
    }
    pooled
}

/// Haversine length of the route in stop order. Legs touching a stop
/// without coordinates are skipped.
pub fn route_distance_km(routes: &[RouteStop]) -> f64 {
    routes
        .windows(2)
        .filter_map(|leg| match (leg[0].coordinates, leg[1].coordinates) {
            (Some(a), Some(b)) => Some(haversine_km(a, b)),
            _ => None,
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationFormatter {
    max_share: f64,
}

impl AllocationFormatter {
    pub const fn new(max_share_per_location: f64) -> Self {
        Self {
            max_share: max_share_per_location,
        }
    }

    pub fn format(
        &self,
        locations: &[Location],
        solution: &Solution,
        resources: &[Resource],
        risk: Option<&RiskAssessment>,
    ) -> AllocationPlan {
        let pooled = pool_resources(resources);
        let mut routes = Vec::new();
        let mut allocation = BTreeMap::new();

        for (k, i) in solution.selected_indices().into_iter().enumerate() {
            let Some(location) = locations.get(i) else {
                continue;
            };
            let multiplier = location.priority.allocation_multiplier();
            let need = location.demand * multiplier;

            let allocations: Vec<ResourceAllocation> = pooled
                .iter()
                .map(|p| {
                    let cap = p.total * self.max_share;
                    let allocated = need.min(cap);
                    ResourceAllocation {
                        resource_type: p.resource_type.clone(),
                        unit: p.unit.clone(),
                        allocated,
                        cap,
                        demand_satisfaction: ratio_or(allocated, location.demand, 1.0).min(1.0),
                    }
                })
                .collect();

            let demand_satisfaction = allocations
                .iter()
                .map(|a| a.demand_satisfaction)
                .reduce(f64::min)
                .unwrap_or(0.0);

            let label = location.label(i);
            allocation.insert(
                format!("location_{i}"),
                AllocationRecord {
                    location: label.clone(),
                    allocations: allocations.clone(),
                    demand_satisfaction,
                    priority_multiplier: multiplier,
                    delivery_window_hours: DELIVERY_WINDOW_BASE_HOURS
                        + DELIVERY_WINDOW_STEP_HOURS * i as f64,
                },
            );

            routes.push(RouteStop {
                sequence: k + 1,
                location_index: i,
                location: label,
                coordinates: location.coordinates(),
                priority: location.priority,
                crisis_type: location.crisis_type.clone(),
                estimated_arrival_hours: ARRIVAL_BASE_HOURS + ARRIVAL_STEP_HOURS * k as f64,
                allocations,
            });
        }

        let advisories = risk
            .map(|r| r.recommendations.iter().map(ToString::to_string).collect())
            .unwrap_or_default();

        AllocationPlan {
            routes,
            allocation,
            advisories,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, Priority, Recommendation, RiskLevel};

    fn solution(bits: &[bool]) -> Solution {
        Solution {
            bits: bits.to_vec(),
            energy: 0.0,
        }
    }

    const NORTH: Coordinates = Coordinates { lat: 10.0, lon: 10.0 };
    const SOUTH: Coordinates = Coordinates { lat: 11.0, lon: 10.0 };

    fn locations() -> Vec<Location> {
        vec![
            Location::new("North", Some(NORTH), 200.0, Priority::High),
            Location::new("South", Some(SOUTH), 50.0, Priority::Low),
            Location::new("Hub", None, 0.0, Priority::Critical),
        ]
    }

    fn format(bits: &[bool], resources: &[Resource]) -> AllocationPlan {
        AllocationFormatter::new(0.30).format(&locations(), &solution(bits), resources, None)
    }

    #[test]
    fn allocation_never_exceeds_share_cap() {
        let resources = vec![Resource::new("food", 400.0, "tonnes")];
        let plan = format(&[true, true, true], &resources);
        for stop in &plan.routes {
            for a in &stop.allocations {
                assert!(a.allocated <= 400.0 * 0.30 + 1e-9, "{} over cap", stop.location);
            }
        }
        // High priority: min(200 × 1.3, 120) = 120
        assert_eq!(plan.routes[0].allocations[0].allocated, 120.0);
        // Low priority: min(50 × 0.8, 120) = 40
        assert_eq!(plan.routes[1].allocations[0].allocated, 40.0);
    }

    #[test]
    fn sequence_and_arrival_follow_selection_order() {
        let resources = vec![Resource::new("water", 100.0, "units")];
        let plan = format(&[false, true, true], &resources);
        assert_eq!(plan.routes.len(), 2);
        assert_eq!(plan.routes[0].sequence, 1);
        assert_eq!(plan.routes[0].location_index, 1);
        assert_eq!(plan.routes[0].estimated_arrival_hours, 2.0);
        assert!((plan.routes[1].estimated_arrival_hours - 3.2).abs() < 1e-9);

        let rec = &plan.allocation["location_2"];
        assert!((rec.delivery_window_hours - 3.6).abs() < 1e-9);
        assert_eq!(rec.priority_multiplier, 1.6);
    }

    #[test]
    fn zero_demand_is_fully_satisfied() {
        let resources = vec![Resource::new("water", 100.0, "units")];
        let plan = format(&[false, false, true], &resources);
        assert_eq!(plan.allocation["location_2"].demand_satisfaction, 1.0);
    }

    #[test]
    fn satisfaction_is_worst_resource_type() {
        let resources = vec![
            Resource::new("food", 1000.0, "t"),
            Resource::new("med", 100.0, "kits"),
        ];
        let plan = format(&[true, false, false], &resources);
        let rec = &plan.allocation["location_0"];
        // food: min(260, 300) / 200 capped at 1; med: 30 / 200
        assert!((rec.demand_satisfaction - 0.15).abs() < 1e-9);
    }

    #[test]
    fn duplicate_type_tags_are_pooled() {
        let pooled = pool_resources(&[
            Resource::new("food", 100.0, "t"),
            Resource::new("water", 50.0, "l"),
            Resource::new("food", 300.0, "t"),
        ]);
        assert_eq!(pooled.len(), 2);
        assert_eq!(pooled[0].resource_type, "food");
        assert_eq!(pooled[0].total, 400.0);
    }

    #[test]
    fn route_distance_skips_legs_without_coordinates() {
        let resources = vec![Resource::new("water", 100.0, "units")];
        let plan = format(&[true, true, true], &resources);
        let d = route_distance_km(&plan.routes);
        assert!((d - haversine_km(NORTH, SOUTH)).abs() < 1e-9);
    }

    #[test]
    fn risk_annotation_copies_messages() {
        let risk = RiskAssessment {
            factors: Vec::new(),
            score: 0,
            level: RiskLevel::Low,
            recommendations: vec![Recommendation::RainwaterHarvesting],
        };
        let plan = AllocationFormatter::new(0.30).format(
            &locations(),
            &solution(&[true, false, false]),
            &[],
            Some(&risk),
        );
        assert_eq!(plan.advisories, vec!["Install rainwater harvesting systems".to_string()]);
        assert!(plan.routes[0].allocations.is_empty());
    }
}
