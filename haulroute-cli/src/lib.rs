//! Command-line interface for planning truck routes.
//!
//! `haulroute plan <profile.json>` loads a truck profile, merges planner and
//! backend settings from configuration files, `HAULROUTE_*` environment
//! variables and flags, plans the route against the TomTom backend and prints
//! the outcome as JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

mod error;
mod fs;
mod plan;

pub use error::CliError;

use plan::PlanArgs;

const ARG_PLAN_PROFILE: &str = "profile";
const ARG_PLAN_CATALOG: &str = "catalog";
const ARG_PLAN_BASE_URL: &str = "base-url";
const ARG_PLAN_API_KEY: &str = "api-key";
const ARG_PLAN_TOLERANCE: &str = "tolerance-meters";
const ARG_PLAN_FUEL_COEFFICIENT: &str = "fuel-range-coefficient";
const ARG_PLAN_MAX_RE_REQUESTS: &str = "max-re-requests";
const ARG_PLAN_REST_HOURS: &str = "rest-hours-threshold";
const ARG_PLAN_DISTANCE_METHOD: &str = "distance-method";
const ARG_PLAN_TIMEOUT: &str = "timeout-secs";
const ENV_PLAN_PROFILE: &str = "HAULROUTE_CMDS_PLAN_PROFILE_PATH";
const ENV_PLAN_API_KEY: &str = "HAULROUTE_CMDS_PLAN_API_KEY";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration merging, input
/// loading, planning or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Plan(args) => plan::run_plan(args),
    }
}

/// Send `log` records to stderr, at debug level when `verbose` is set.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        log::debug!("logging already initialised");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "haulroute",
    about = "Plan truck routes with fuel and rest stops",
    version
)]
struct Cli {
    /// Log planner transitions and backend calls to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a route for a truck profile and print it as JSON.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
