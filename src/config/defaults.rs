//! System-wide default constants.
//!
//! Grouped by subsystem. The config structs use these as serde defaults; the
//! remaining constants are fixed tables with no config knob.

// ============================================================================
// Annealing
// ============================================================================

pub const ANNEALING_ITERATIONS: usize = 200;

pub const ANNEALING_INITIAL_TEMPERATURE: f64 = 10.0;

/// Hard ceiling on annealing iterations and refiner steps.
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Trace buffers are pre-sized up to this many entries.
pub const TRACE_PREALLOC_LIMIT: usize = 4096;

// ============================================================================
// Refiner
// ============================================================================

pub const REFINER_STEPS: usize = 50;

pub const REFINER_LEARNING_RATE: f64 = 0.1;

pub const REFINER_EPSILON: f64 = 0.01;

pub const REFINER_CONVERGENCE_TOLERANCE: f64 = 0.01;

/// Seed for the initial angles when none is configured.
pub const REFINER_DEFAULT_SEED: u64 = 0x5eed;

// ============================================================================
// Cost Model
// ============================================================================

/// Mean Earth radius for haversine distances (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ============================================================================
// Allocation
// ============================================================================

/// 30% of a resource type's pooled supply per location.
pub const MAX_SHARE_PER_LOCATION: f64 = 0.30;

/// Arrival estimate for stop k: base + k × step (hours).
pub const ARRIVAL_BASE_HOURS: f64 = 2.0;
pub const ARRIVAL_STEP_HOURS: f64 = 1.2;

/// Delivery window for location index i: base + i × step (hours).
pub const DELIVERY_WINDOW_BASE_HOURS: f64 = 2.0;
pub const DELIVERY_WINDOW_STEP_HOURS: f64 = 0.8;

// ============================================================================
// Forecasting
// ============================================================================

/// Every sub-model and the ensemble are clamped into this yield range.
pub const YIELD_FLOOR: f64 = 50.0;
pub const YIELD_CEILING: f64 = 400.0;

/// Confidence never reported below this.
pub const CONFIDENCE_FLOOR: f64 = 0.7;

/// z-multipliers for the prediction bands.
pub const Z_95: f64 = 1.96;
pub const Z_80: f64 = 1.28;

/// Sub-models within this distance of the estimate count as agreeing.
pub const MODEL_AGREEMENT_BAND: f64 = 20.0;

/// Ensemble variance below this is reported as high stability.
pub const HIGH_STABILITY_VARIANCE: f64 = 100.0;

/// Reference yield for adaptation potential.
pub const ADAPTATION_REFERENCE_YIELD: f64 = 300.0;
