//! HTTP route backends for truck routing services.
//!
//! This module provides [`HttpRouteBackend`], an implementation of
//! [`haulroute_core::RouteBackend`] that fetches truck routes from the TomTom
//! Calculate Route API.
//!
//! # Architecture
//!
//! The backend renders the engine's abstract request parameters into TomTom
//! query parameters and a colon-separated location path. The synchronous
//! [`RouteBackend`](haulroute_core::RouteBackend) trait is implemented by
//! blocking on async HTTP calls internally, keeping the planner embeddable
//! in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use haulroute_core::test_support::sample_truck;
//! use haulroute_core::{Planner, PlannerConfig};
//! use haulroute_data::routing::{HttpRouteBackend, HttpRouteBackendConfig};
//!
//! let config = HttpRouteBackendConfig::new("https://api.tomtom.com", "my-api-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("dispatch/1.0");
//! let backend = HttpRouteBackend::with_config(config)?;
//!
//! let planner = Planner::new(backend, PlannerConfig::default());
//! let outcome = planner.plan(&sample_truck(), &AtomicBool::new(false))?;
//! println!("backend calls: {}", outcome.backend_calls());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod tomtom;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRouteBackend, HttpRouteBackendConfig,
    ProviderBuildError,
};
