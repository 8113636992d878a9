//! Request and engine errors

use thiserror::Error;

/// Errors surfaced by the planner and forecaster.
///
/// Numeric degeneracies (zero estimates, zero demand, zero baseline energy)
/// never appear here: they are resolved locally with a documented floor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    /// Structurally invalid request data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed constraints map, unsupported objective, or bad engine settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlanError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Divide, falling back to `floor` when the denominator is zero or the
/// quotient is not finite.
pub fn ratio_or(numerator: f64, denominator: f64, floor: f64) -> f64 {
    if denominator == 0.0 {
        return floor;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        floor
    }
}
