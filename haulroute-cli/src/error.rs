//! Error types emitted by the haulroute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haulroute_core::{PlanError, TruckProfileError};
use haulroute_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the haulroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option was set to a value the planner cannot use.
    #[error("invalid --{field} value {value:?}: expected {expected}")]
    InvalidArgument {
        /// Flag name.
        field: &'static str,
        /// Rejected value.
        value: String,
        /// What would have been accepted.
        expected: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening an input file failed.
    #[error("failed to open {field} at {path:?}: {source}")]
    OpenInput {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// An input file was not valid JSON for its type.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The truck profile failed validation.
    #[error("truck profile in {path:?} failed validation: {source}")]
    InvalidProfile {
        /// Profile path.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: TruckProfileError,
    },
    /// Constructing the routing backend failed.
    #[error("failed to build routing backend for {base_url:?}: {source}")]
    BuildRouteBackend {
        /// Configured base URL.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The planner failed.
    #[error("planning failed: {source}")]
    Plan {
        /// Planner failure.
        #[source]
        source: Box<PlanError>,
    },
    /// Serializing the plan failed.
    #[error("failed to serialize route plan: {0}")]
    SerializePlan(#[source] serde_json::Error),
    /// Writing the plan output failed.
    #[error("failed to write route plan: {0}")]
    WritePlanOutput(#[source] std::io::Error),
}
