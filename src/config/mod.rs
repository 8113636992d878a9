//! Planner Configuration Module
//!
//! Engine tuning loaded from TOML, replacing hardcoded constants with
//! operator-editable values.
//!
//! ## Loading Order
//!
//! 1. `RELIEF_PLANNER_CONFIG` environment variable (path to TOML file)
//! 2. `planner.toml` in the current working directory
//! 3. Built-in defaults
//!
//! There is no process-wide config instance: callers load a `PlannerConfig`
//! once and pass it (or a per-request copy with constraint overrides) to the
//! engines they build.

mod planner_config;
pub mod defaults;
pub mod validation;

pub use planner_config::*;
