//! States of a single planning request.

use geo::LineString;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::PlanError;
use crate::backend::{BackendRoute, RouteSummary};
use crate::constraints::{ConstraintWarning, Resolution, RouteConstraints};
use crate::request::RouteRequest;
use crate::stops::StopPlan;

/// A finished route plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RoutePlan {
    /// Constraints the route was requested with.
    pub constraints: RouteConstraints,
    /// Stops inserted into the route.
    pub stops: StopPlan,
    /// Backend totals for the final geometry.
    pub summary: RouteSummary,
    /// Final route polyline.
    pub geometry: LineString<f64>,
    /// The request that produced `geometry`.
    pub request: RouteRequest,
    /// Non-fatal issues found while resolving constraints.
    pub warnings: Vec<ConstraintWarning>,
    /// Backend calls issued for this plan.
    pub backend_calls: u32,
}

/// Successful end of a planning request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum PlanOutcome {
    /// A route was found.
    Planned(RoutePlan),
    /// The backend returned no route for the constraints.
    NoRouteFound {
        /// Constraints the backend could not satisfy.
        constraints: RouteConstraints,
        /// Non-fatal issues found while resolving constraints.
        warnings: Vec<ConstraintWarning>,
        /// Backend calls issued before giving up.
        backend_calls: u32,
    },
}

impl PlanOutcome {
    /// The plan, if a route was found.
    #[must_use]
    pub const fn route_plan(&self) -> Option<&RoutePlan> {
        match self {
            Self::Planned(plan) => Some(plan),
            Self::NoRouteFound { .. } => None,
        }
    }

    /// Warnings collected while planning.
    #[must_use]
    pub fn warnings(&self) -> &[ConstraintWarning] {
        match self {
            Self::Planned(plan) => &plan.warnings,
            Self::NoRouteFound { warnings, .. } => warnings,
        }
    }

    /// Backend calls issued for the request.
    #[must_use]
    pub const fn backend_calls(&self) -> u32 {
        match self {
            Self::Planned(plan) => plan.backend_calls,
            Self::NoRouteFound { backend_calls, .. } => *backend_calls,
        }
    }
}

/// A route together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// Request sent to the backend.
    pub request: RouteRequest,
    /// Route returned by the backend.
    pub route: BackendRoute,
    /// Stops the request carried as waypoints.
    pub routed: StopPlan,
}

/// Planner state machine.
///
/// `Init → ConstraintsResolved → BaseRouteFetched → StopsResolved →
/// Finalized`, with `StopsResolved ⇄ RouteRefetched` bounded by the
/// configured re-request limit. `Finalized` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerState {
    /// Nothing has run yet.
    Init,
    /// Constraints are known.
    ConstraintsResolved {
        /// Resolved constraints and warnings.
        resolution: Resolution,
    },
    /// The backend answered the constraint-only request.
    BaseRouteFetched {
        /// Resolved constraints and warnings.
        resolution: Resolution,
        /// The base route.
        fetched: Fetched,
    },
    /// Stops were selected against the current route.
    StopsResolved {
        /// Resolved constraints and warnings.
        resolution: Resolution,
        /// The current route.
        fetched: Fetched,
        /// Stops selected against `fetched`.
        selected: StopPlan,
        /// Re-requests issued so far.
        re_requests: u32,
    },
    /// The backend answered a request carrying waypoints.
    RouteRefetched {
        /// Resolved constraints and warnings.
        resolution: Resolution,
        /// The refined route.
        fetched: Fetched,
        /// Re-requests issued so far.
        re_requests: u32,
    },
    /// Planning finished.
    Finalized(PlanOutcome),
    /// Planning failed.
    Failed(PlanError),
}

impl PlannerState {
    /// Short name used in logs and cancellation errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::ConstraintsResolved { .. } => "ConstraintsResolved",
            Self::BaseRouteFetched { .. } => "BaseRouteFetched",
            Self::StopsResolved { .. } => "StopsResolved",
            Self::RouteRefetched { .. } => "RouteRefetched",
            Self::Finalized(_) => "Finalized",
            Self::Failed(_) => "Failed",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized(_) | Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve_constraints;
    use crate::test_support::sample_truck;
    use rstest::rstest;

    fn no_route() -> PlanOutcome {
        let resolution = resolve_constraints(&sample_truck());
        PlanOutcome::NoRouteFound {
            constraints: resolution.constraints,
            warnings: resolution.warnings,
            backend_calls: 1,
        }
    }

    #[rstest]
    #[case::init(PlannerState::Init, false)]
    #[case::resolved(
        PlannerState::ConstraintsResolved {
            resolution: resolve_constraints(&sample_truck()),
        },
        false
    )]
    #[case::finalized(PlannerState::Finalized(no_route()), true)]
    #[case::failed(PlannerState::Failed(PlanError::Cancelled { stage: "Init" }), true)]
    fn only_finished_states_are_terminal(#[case] state: PlannerState, #[case] terminal: bool) {
        assert_eq!(state.is_terminal(), terminal, "{}", state.name());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn outcome_serialises_with_tag() {
        let value = serde_json::to_value(no_route()).expect("serialise outcome");
        assert_eq!(
            value.get("outcome").and_then(serde_json::Value::as_str),
            Some("no_route_found")
        );
        assert_eq!(
            value.get("backend_calls").and_then(serde_json::Value::as_u64),
            Some(1)
        );
    }
}
