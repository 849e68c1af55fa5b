//! Facade crate for the haulroute truck routing engine.
//!
//! This crate re-exports the core domain types and exposes the TomTom HTTP
//! routing backend behind the `http` feature flag.

#![forbid(unsafe_code)]

pub use haulroute_core::{
    BackendError, BackendRoute, ConstraintWarning, DistanceMethod, FuelStation, IndexedCatalog,
    Location, PlanError, PlanOutcome, Planner, PlannerConfig, RestArea, RouteBackend,
    RouteConstraints, RoutePlan, StationCatalog, TruckProfile, TruckProfileError,
    resolve_constraints,
};

#[cfg(feature = "http")]
pub use haulroute_data::{HttpRouteBackend, HttpRouteBackendConfig, ProviderBuildError};
