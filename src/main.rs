//! relief-planner - command-line front end
//!
//! Reads a JSON request from a file or stdin and writes the JSON response to
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Optimize the built-in demo dataset with a fixed seed
//! echo '{}' | relief-planner optimize --seed 42
//!
//! # Same, with annealing and refiner traces in the response
//! echo '{}' | relief-planner optimize --seed 42 --traces
//!
//! # Yield forecast
//! relief-planner predict --input weather.json
//!
//! # Forecast + annotated plan
//! relief-planner plan --input plan.json
//!
//! # Print the effective configuration
//! relief-planner --config planner.toml config
//! ```
//!
//! # Environment Variables
//!
//! - `RELIEF_PLANNER_CONFIG`: Path to a planner TOML file (when `--config` is absent)
//! - `RUST_LOG`: Logging level (default: info)

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use relief_planner::{
    OptimizeRequest, PlanRequest, PlannerConfig, PredictRequest, ResourcePlanner, YieldForecaster,
};

#[derive(Parser, Debug)]
#[command(name = "relief-planner")]
#[command(about = "Crisis relief allocation optimizer and yield forecaster")]
#[command(version)]
struct CliArgs {
    /// Planner config TOML (overrides RELIEF_PLANNER_CONFIG and ./planner.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select locations and allocate resources
    Optimize {
        /// Request JSON (stdin when omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Fixed annealing seed for reproducible plans
        #[arg(long)]
        seed: Option<u64>,
        /// Include per-iteration energy and temperature traces
        #[arg(long)]
        traces: bool,
    },
    /// Forecast yield and climate risk
    Predict {
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Forecast, then optimize with the forecast's recommendations attached
    Plan {
        #[arg(long, short)]
        input: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        traces: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn read_request<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Request is not valid JSON for this command")
}

fn write_response<T: Serialize>(response: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}

fn with_cli_overrides(
    mut request: OptimizeRequest,
    seed: Option<u64>,
    traces: bool,
) -> OptimizeRequest {
    if let Some(seed) = seed {
        request.constraints.insert("seed".to_string(), seed.into());
    }
    request.include_traces |= traces;
    request
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(p) => {
            let config = PlannerConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config {}", p.display()))?;
            info!(path = %p.display(), "Loaded planner config from --config");
            Ok(config)
        }
        None => Ok(PlannerConfig::load()),
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Optimize { input, seed, traces } => {
            let request = with_cli_overrides(read_request(input.as_deref())?, seed, traces);
            let response = ResourcePlanner::new(config).optimize(&request)?;
            write_response(&response)
        }
        Command::Predict { input } => {
            let request: PredictRequest = read_request(input.as_deref())?;
            let (_, response) = YieldForecaster::new(config.ensemble_weights).predict(&request)?;
            write_response(&response)
        }
        Command::Plan { input, seed, traces } => {
            let mut request: PlanRequest = read_request(input.as_deref())?;
            request.optimize = with_cli_overrides(request.optimize, seed, traces);
            let response = relief_planner::plan(&config, &request)?;
            write_response(&response)
        }
        Command::Config => {
            print!("{}", config.to_toml().context("Failed to render config")?);
            Ok(())
        }
    }
}
