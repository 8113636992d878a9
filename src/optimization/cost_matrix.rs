//! Pairwise cost model over candidate locations
//!
//! weight(i, j) = distance(i, j) × mean(priority rank i, priority rank j)
//!
//! Distances are great-circle (haversine) when both locations carry
//! coordinates. Pairs missing coordinates use the configured fallback
//! distance, and are rejected when none is configured.

use rayon::prelude::*;
use tracing::debug;

use crate::config::defaults::EARTH_RADIUS_KM;
use crate::types::{Coordinates, Location, PlanError};

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

// ============================================================================
// CostMatrix
// ============================================================================

/// Symmetric N×N matrix of non-negative weights with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    n: usize,
    weights: Vec<f64>,
}

impl CostMatrix {
    /// Build from explicit rows. Rows must be square, symmetric, finite and
    /// non-negative with a zero diagonal.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PlanError> {
        let n = rows.len();
        if n == 0 {
            return Err(PlanError::invalid("cost matrix must not be empty"));
        }
        let mut weights = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(PlanError::invalid(format!(
                    "cost matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            weights.extend_from_slice(row);
        }
        let matrix = Self { n, weights };

        for i in 0..n {
            if matrix.get(i, i) != 0.0 {
                return Err(PlanError::invalid(format!(
                    "cost matrix diagonal ({i}, {i}) must be zero"
                )));
            }
            for j in (i + 1)..n {
                let w = matrix.get(i, j);
                if !w.is_finite() || w < 0.0 {
                    return Err(PlanError::invalid(format!(
                        "cost matrix entry ({i}, {j}) = {w} is invalid"
                    )));
                }
                if (w - matrix.get(j, i)).abs() > 1e-9 {
                    return Err(PlanError::invalid(format!(
                        "cost matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(matrix)
    }

    pub const fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i * self.n..(i + 1) * self.n]
    }

    /// E(x) = Σ_{i≠j} M[i][j]·x_i·x_j over a selection bit vector.
    pub fn energy(&self, bits: &[bool]) -> f64 {
        let mut total = 0.0;
        for (i, &xi) in bits.iter().enumerate().take(self.n) {
            if !xi {
                continue;
            }
            let row = self.row(i);
            for (j, &xj) in bits.iter().enumerate().take(self.n) {
                if xj && i != j {
                    total += row[j];
                }
            }
        }
        total
    }

    /// Same quadratic form over continuous selection weights in [0, 1].
    pub fn relaxed_energy(&self, probs: &[f64]) -> f64 {
        let mut total = 0.0;
        for (i, &pi) in probs.iter().enumerate().take(self.n) {
            let row = self.row(i);
            for (j, &pj) in probs.iter().enumerate().take(self.n) {
                if i != j {
                    total += row[j] * pi * pj;
                }
            }
        }
        total
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Turns an ordered location list into a [`CostMatrix`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CostMatrixBuilder {
    fallback_distance_km: Option<f64>,
}

impl CostMatrixBuilder {
    pub const fn new(fallback_distance_km: Option<f64>) -> Self {
        Self { fallback_distance_km }
    }

    fn distance(&self, a: &Location, b: &Location, i: usize, j: usize) -> Result<f64, PlanError> {
        match (a.coordinates(), b.coordinates()) {
            (Some(ca), Some(cb)) => Ok(haversine_km(ca, cb)),
            _ => self.fallback_distance_km.ok_or_else(|| {
                PlanError::invalid(format!(
                    "locations {i} and {j}: coordinates missing \
                     and no fallback_distance_km supplied"
                ))
            }),
        }
    }

    pub fn build(&self, locations: &[Location]) -> Result<CostMatrix, PlanError> {
        let n = locations.len();
        if n == 0 {
            return Err(PlanError::invalid("at least one location is required"));
        }

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            return Ok(0.0);
                        }
                        let (a, b) = (&locations[i], &locations[j]);
                        let priority_weight =
                            f64::from(a.priority.rank() + b.priority.rank()) / 2.0;
                        let weight = self.distance(a, b, i.min(j), i.max(j))? * priority_weight;
                        if !weight.is_finite() {
                            return Err(PlanError::invalid(format!(
                                "cost weight ({i}, {j}) overflows (got {weight})"
                            )));
                        }
                        Ok(weight)
                    })
                    .collect::<Result<Vec<f64>, PlanError>>()
            })
            .collect::<Result<_, _>>()?;

        let matrix = CostMatrix {
            n,
            weights: rows.into_iter().flatten().collect(),
        };
        // Every selection's energy is bounded by the all-selected total.
        let total = matrix.energy(&vec![true; n]);
        if !total.is_finite() {
            return Err(PlanError::invalid(format!(
                "total cost over {n} locations overflows; reduce fallback_distance_km"
            )));
        }

        debug!(n, fallback = ?self.fallback_distance_km, "Built cost matrix");
        Ok(matrix)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn city(name: &str, lat: f64, lon: f64, priority: Priority) -> Location {
        Location::new(name, Some(Coordinates { lat, lon }), 100.0, priority)
    }

    #[test]
    fn haversine_mumbai_delhi() {
        let d = haversine_km(
            Coordinates { lat: 19.0760, lon: 72.8777 },
            Coordinates { lat: 28.7041, lon: 77.1025 },
        );
        assert!((1140.0..1160.0).contains(&d), "Mumbai-Delhi should be ~1150 km, got {d}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let p = Coordinates { lat: 12.0, lon: 77.0 };
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let locs = vec![
            city("A", 19.07, 72.87, Priority::Low),
            city("B", 28.70, 77.10, Priority::Critical),
            city("C", 13.08, 80.27, Priority::Medium),
        ];
        let m = CostMatrixBuilder::default().build(&locs).unwrap();
        assert_eq!(m.size(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 0.0);
            for j in 0..3 {
                assert!((m.get(i, j) - m.get(j, i)).abs() < 1e-9);
                assert!(m.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn priority_weight_scales_distance() {
        let locs = vec![
            city("A", 0.0, 0.0, Priority::Low),
            city("B", 0.0, 1.0, Priority::Critical),
        ];
        let m = CostMatrixBuilder::default().build(&locs).unwrap();
        let d = haversine_km(
            Coordinates { lat: 0.0, lon: 0.0 },
            Coordinates { lat: 0.0, lon: 1.0 },
        );
        assert!((m.get(0, 1) - d * 2.5).abs() < 1e-9);
    }

    #[test]
    fn missing_coordinates_without_fallback_is_invalid_input() {
        let locs = vec![
            city("A", 0.0, 0.0, Priority::Low),
            Location::new("B", None, 10.0, Priority::Low),
        ];
        let err = CostMatrixBuilder::default().build(&locs).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(_)));
    }

    #[test]
    fn missing_coordinates_use_fallback_distance() {
        let locs = vec![
            Location::new("A", None, 10.0, Priority::Medium),
            Location::new("B", None, 10.0, Priority::Medium),
        ];
        let m = CostMatrixBuilder::new(Some(50.0)).build(&locs).unwrap();
        assert_eq!(m.get(0, 1), 100.0);
    }

    #[test]
    fn overflowing_fallback_weight_is_invalid_input() {
        let locs = vec![
            Location::new("A", None, 10.0, Priority::Critical),
            Location::new("B", None, 10.0, Priority::Critical),
        ];
        let err = CostMatrixBuilder::new(Some(1e308)).build(&locs).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(ref m) if m.contains("overflows")), "{err}");
    }

    #[test]
    fn overflowing_total_energy_is_invalid_input() {
        let locs: Vec<Location> = ["A", "B", "C"]
            .into_iter()
            .map(|name| Location::new(name, None, 10.0, Priority::Low))
            .collect();
        let built = CostMatrixBuilder::new(Some(f64::MAX / 2.0)).build(&locs);
        assert!(matches!(built, Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn empty_location_list_is_invalid_input() {
        assert!(matches!(
            CostMatrixBuilder::default().build(&[]),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn energy_counts_each_ordered_pair() {
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ])
        .unwrap();
        assert_eq!(m.energy(&[true, true, true]), 12.0);
        assert_eq!(m.energy(&[true, false, true]), 4.0);
        assert_eq!(m.energy(&[false, true, false]), 0.0);
        assert_eq!(m.relaxed_energy(&[1.0, 1.0, 1.0]), 12.0);
        assert_eq!(m.relaxed_energy(&[0.5, 0.5, 0.0]), 0.5);
    }

    #[test]
    fn from_rows_rejects_asymmetry() {
        let err = CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 0.0]]).unwrap_err();
        assert!(err.to_string().contains("symmetric"));
    }
}
