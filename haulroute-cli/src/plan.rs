//! Plan command implementation for the haulroute CLI.

use std::io::{BufReader, Write};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use haulroute_core::{
    DistanceMethod, FuelStation, IndexedCatalog, PlanOutcome, Planner, PlannerConfig, RestArea,
    RouteBackend, TruckProfile,
};
use haulroute_data::{DEFAULT_BASE_URL, HttpRouteBackend, HttpRouteBackendConfig};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_PLAN_API_KEY, ARG_PLAN_BASE_URL, ARG_PLAN_CATALOG, ARG_PLAN_DISTANCE_METHOD,
    ARG_PLAN_FUEL_COEFFICIENT, ARG_PLAN_MAX_RE_REQUESTS, ARG_PLAN_PROFILE, ARG_PLAN_REST_HOURS,
    ARG_PLAN_TIMEOUT, ARG_PLAN_TOLERANCE, CliError, ENV_PLAN_API_KEY, ENV_PLAN_PROFILE,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a route for a JSON-encoded truck profile. Constraints \
                 are derived from the profile, the route is fetched from the \
                 TomTom Calculate Route API and, when fuel or rest stops are \
                 needed, re-requested through them. Settings can come from \
                 CLI flags, configuration files, or environment variables.",
    about = "Plan a truck route with fuel and rest stops"
)]
#[ortho_config(prefix = "HAULROUTE")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a truck profile.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) profile_path: Option<Utf8PathBuf>,
    /// JSON file of extra fuel stations and rest areas to consider.
    #[arg(long = ARG_PLAN_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Base URL of the routing service.
    #[arg(long = ARG_PLAN_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Routing service API key.
    #[arg(long = ARG_PLAN_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Maximum distance between a stop and the route.
    #[arg(long = ARG_PLAN_TOLERANCE, value_name = "metres")]
    #[serde(default)]
    pub(crate) tolerance_meters: Option<f64>,
    /// Distance covered per unit of fuel.
    #[arg(long = ARG_PLAN_FUEL_COEFFICIENT, value_name = "metres")]
    #[serde(default)]
    pub(crate) fuel_range_coefficient: Option<f64>,
    /// Upper bound on waypoint re-requests.
    #[arg(long = ARG_PLAN_MAX_RE_REQUESTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_re_requests: Option<u32>,
    /// Driving hours after which rest areas are added.
    #[arg(long = ARG_PLAN_REST_HOURS, value_name = "hours")]
    #[serde(default)]
    pub(crate) rest_hours_threshold: Option<u32>,
    /// Distance metric: `haversine` or `euclidean`.
    #[arg(long = ARG_PLAN_DISTANCE_METHOD, value_name = "method")]
    #[serde(default)]
    pub(crate) distance_method: Option<String>,
    /// Per-call backend timeout in seconds.
    #[arg(long = ARG_PLAN_TIMEOUT, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Path to the truck profile.
    pub(crate) profile_path: Utf8PathBuf,
    /// Optional stop catalog.
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Routing service base URL.
    pub(crate) base_url: String,
    /// Routing service API key.
    pub(crate) api_key: String,
    /// Planner tunables.
    pub(crate) planner: PlannerConfig,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.profile_path, ARG_PLAN_PROFILE)?;
        if let Some(catalog) = &self.catalog {
            Self::require_existing(catalog, ARG_PLAN_CATALOG)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let profile_path = args.profile_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_PROFILE,
            env: ENV_PLAN_PROFILE,
        })?;
        let api_key = args
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_PLAN_API_KEY,
                env: ENV_PLAN_API_KEY,
            })?;

        let mut planner = PlannerConfig::default();
        if let Some(tolerance) = args.tolerance_meters {
            planner = planner.with_tolerance_meters(positive(ARG_PLAN_TOLERANCE, tolerance)?);
        }
        if let Some(coefficient) = args.fuel_range_coefficient {
            planner = planner
                .with_fuel_range_coefficient(positive(ARG_PLAN_FUEL_COEFFICIENT, coefficient)?);
        }
        if let Some(max) = args.max_re_requests {
            planner = planner.with_max_re_requests(max);
        }
        if let Some(hours) = args.rest_hours_threshold {
            planner = planner.with_rest_hours_threshold(hours);
        }
        if let Some(method) = args.distance_method {
            planner = planner.with_distance_method(parse_distance_method(&method)?);
        }
        if let Some(secs) = args.timeout_secs {
            if secs == 0 {
                return Err(CliError::InvalidArgument {
                    field: ARG_PLAN_TIMEOUT,
                    value: secs.to_string(),
                    expected: "a positive number of seconds",
                });
            }
            planner = planner.with_backend_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            profile_path,
            catalog: args.catalog,
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            api_key,
            planner,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::InvalidArgument {
            field,
            value: value.to_string(),
            expected: "a positive number",
        })
    }
}

fn parse_distance_method(value: &str) -> Result<DistanceMethod, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "haversine" => Ok(DistanceMethod::Haversine),
        "euclidean" => Ok(DistanceMethod::Euclidean),
        _ => Err(CliError::InvalidArgument {
            field: ARG_PLAN_DISTANCE_METHOD,
            value: value.to_owned(),
            expected: "haversine or euclidean",
        }),
    }
}

/// Routing backend handed to the planner.
pub(crate) type SharedBackend = Box<dyn RouteBackend + Send + Sync>;

/// Builds a routing backend for the current plan invocation.
pub(crate) trait PlanBackendBuilder {
    fn build(&self, config: &PlanConfig) -> Result<SharedBackend, CliError>;
}

pub(crate) struct DefaultPlanBackendBuilder;

impl PlanBackendBuilder for DefaultPlanBackendBuilder {
    fn build(&self, config: &PlanConfig) -> Result<SharedBackend, CliError> {
        let backend_config =
            HttpRouteBackendConfig::new(config.base_url.clone(), config.api_key.clone());
        let backend = HttpRouteBackend::with_config(backend_config).map_err(|source| {
            CliError::BuildRouteBackend {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(backend))
    }
}

/// Stops loaded from a `--catalog` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CatalogFile {
    /// Candidate refuelling stations.
    pub(crate) fuel_stations: Vec<FuelStation>,
    /// Candidate rest areas.
    pub(crate) rest_areas: Vec<RestArea>,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultPlanBackendBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanBackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let outcome = execute_plan(args, builder)?;
    write_plan(writer, &outcome)
}

fn execute_plan(
    args: PlanArgs,
    builder: &dyn PlanBackendBuilder,
) -> Result<PlanOutcome, CliError> {
    let config = resolve_plan_config(args)?;
    let truck = load_truck_profile(&config.profile_path)?;
    truck
        .validate()
        .map_err(|source| CliError::InvalidProfile {
            path: config.profile_path.clone(),
            source,
        })?;

    let backend = builder.build(&config)?;
    let mut planner = Planner::new(backend, config.planner.clone());
    if let Some(path) = &config.catalog {
        let catalog = load_catalog(path)?;
        info!(
            "loaded {} fuel stations and {} rest areas from {path}",
            catalog.fuel_stations.len(),
            catalog.rest_areas.len()
        );
        planner =
            planner.with_catalog(IndexedCatalog::new(catalog.fuel_stations, catalog.rest_areas));
    }

    planner
        .plan(&truck, &AtomicBool::new(false))
        .map_err(|source| CliError::Plan {
            source: Box::new(source),
        })
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`TruckProfile`] from disk.
pub(crate) fn load_truck_profile(path: &Utf8Path) -> Result<TruckProfile, CliError> {
    load_json(path, ARG_PLAN_PROFILE)
}

/// Loads a JSON-encoded stop catalog from disk.
pub(crate) fn load_catalog(path: &Utf8Path) -> Result<CatalogFile, CliError> {
    load_json(path, ARG_PLAN_CATALOG)
}

fn load_json<T>(path: &Utf8Path, field: &'static str) -> Result<T, CliError>
where
    T: for<'de> Deserialize<'de>,
{
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

fn write_plan(writer: &mut dyn Write, outcome: &PlanOutcome) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(outcome).map_err(CliError::SerializePlan)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlanOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WritePlanOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
