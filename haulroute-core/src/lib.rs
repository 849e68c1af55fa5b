//! Constraint resolution and stop selection for heavy-vehicle routing.
//!
//! The engine turns a [`TruckProfile`] into normalised [`RouteConstraints`],
//! asks a [`RouteBackend`](backend::RouteBackend) for a route, selects the
//! fuel and rest stops that lie along it and, when stops were added,
//! re-requests the route through them. Geometry is never computed here; it
//! always comes from the backend.
//!
//! Everything except the [`Planner`] is pure and stateless. The planner is
//! an explicit state machine so that the bound on backend calls can be
//! checked in isolation with a scripted backend.

#![forbid(unsafe_code)]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod constraints;
pub mod geometry;
pub mod planner;
pub mod profile;
pub mod request;
pub mod stops;

#[doc(hidden)]
pub mod test_support;

pub use backend::{BackendError, BackendRoute, RouteBackend, RouteSummary};
pub use catalog::{IndexedCatalog, StationCatalog};
pub use config::PlannerConfig;
pub use constraints::{
    Avoidance, ConstraintKind, ConstraintWarning, Resolution, RouteConstraints,
    resolve_constraints,
};
pub use geometry::DistanceMethod;
pub use planner::{PlanError, PlanOutcome, Planner, PlannerState, RoutePlan};
pub use profile::{
    CargoType, Dimensions, FuelStation, Location, RestArea, TruckProfile, TruckProfileError,
    Waypoint,
};
pub use request::{RequestParam, RouteRequest, build_request};
pub use stops::{InfeasibleFuelPlan, OnRoute, StopCandidates, StopPlan, StopSelector};
