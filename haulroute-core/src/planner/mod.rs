//! Orchestration of a planning request.
//!
//! [`Planner::plan`] drives a [`PlannerState`] machine from `Init` to a
//! terminal state. Each transition is a small pure step apart from the
//! backend calls, which happen only when leaving `ConstraintsResolved`
//! (the base request) and `StopsResolved` (a waypoint re-request). The
//! number of re-requests is capped by [`PlannerConfig::max_re_requests`], and
//! the cancellation flag is checked before every transition so a cancelled
//! request never starts another backend call.

mod error;
mod state;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

pub use error::PlanError;
pub use state::{Fetched, PlanOutcome, PlannerState, RoutePlan};

use crate::backend::RouteBackend;
use crate::catalog::{StationCatalog, search_area};
use crate::constraints::{Resolution, resolve_constraints};
use crate::request::build_request;
use crate::stops::{StopCandidates, StopPlan, StopSelector};
use crate::{PlannerConfig, TruckProfile};

type SharedCatalog = Box<dyn StationCatalog + Send + Sync>;

/// Plans truck routes against a [`RouteBackend`].
///
/// A planner holds no per-request state; share one across threads to plan
/// many trucks concurrently.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::AtomicBool;
/// use std::time::Duration;
/// use geo::LineString;
/// use haulroute_core::backend::{BackendError, BackendRoute, RouteBackend, RouteSummary};
/// use haulroute_core::request::RouteRequest;
/// use haulroute_core::{Dimensions, Location, PlanOutcome, Planner, PlannerConfig, TruckProfile};
///
/// struct Direct;
///
/// impl RouteBackend for Direct {
///     fn fetch_route(
///         &self,
///         request: &RouteRequest,
///         _timeout: Duration,
///     ) -> Result<Option<BackendRoute>, BackendError> {
///         Ok(Some(BackendRoute {
///             geometry: LineString::from(vec![request.origin.point(), request.destination.point()]),
///             summary: RouteSummary::default(),
///         }))
///     }
/// }
///
/// let mut truck = TruckProfile::new(
///     Dimensions { height: 4.0, width: 2.55, length: 16.5 },
///     40_000,
///     Location::at(52.50, 13.40),
///     Location::at(52.51, 13.41),
/// );
/// truck.fuel_capacity = 400;
///
/// let planner = Planner::new(Direct, PlannerConfig::default());
/// let outcome = planner.plan(&truck, &AtomicBool::new(false))?;
/// let PlanOutcome::Planned(plan) = outcome else { panic!("route expected") };
/// assert!(plan.stops.is_empty());
/// assert_eq!(plan.backend_calls, 1);
/// # Ok::<(), haulroute_core::PlanError>(())
/// ```
pub struct Planner<B> {
    backend: B,
    config: PlannerConfig,
    selector: StopSelector,
    catalog: Option<SharedCatalog>,
}

impl<B: fmt::Debug> fmt::Debug for Planner<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("catalog", &self.catalog.as_ref().map(|_| "<dyn StationCatalog>"))
            .finish_non_exhaustive()
    }
}

/// Per-request bookkeeping threaded through the transitions.
struct Run<'a> {
    truck: &'a TruckProfile,
    backend_calls: u32,
}

impl<B: RouteBackend> Planner<B> {
    /// Create a planner using only the truck's own candidate pools.
    #[must_use]
    pub fn new(backend: B, config: PlannerConfig) -> Self {
        Self {
            selector: StopSelector::new(&config),
            backend,
            config,
            catalog: None,
        }
    }

    /// Also draw stop candidates from `catalog`.
    #[must_use]
    pub fn with_catalog<C>(mut self, catalog: C) -> Self
    where
        C: StationCatalog + Send + Sync + 'static,
    {
        self.catalog = Some(Box::new(catalog));
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The backend in use.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Plan a route for `truck`.
    ///
    /// `cancel` is polled before every transition; once it reads `true` the
    /// request fails with [`PlanError::Cancelled`] and no further backend
    /// call is started.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the profile is invalid, the backend times
    /// out or is unavailable, refuelling is infeasible, or the request is
    /// cancelled. An empty backend answer is not an error; it yields
    /// [`PlanOutcome::NoRouteFound`].
    pub fn plan(&self, truck: &TruckProfile, cancel: &AtomicBool) -> Result<PlanOutcome, PlanError> {
        let mut run = Run {
            truck,
            backend_calls: 0,
        };
        let mut state = PlannerState::Init;
        loop {
            state = match state {
                PlannerState::Finalized(outcome) => return Ok(outcome),
                PlannerState::Failed(err) => return Err(err),
                pending => {
                    let from = pending.name();
                    if cancel.load(Ordering::Acquire) {
                        debug!("planner cancelled in {from}");
                        return Err(PlanError::Cancelled { stage: from });
                    }
                    let next = self.advance(&mut run, pending);
                    debug!("planner {from} -> {}", next.name());
                    if next.is_terminal() {
                        debug!("planner finished after {} backend calls", run.backend_calls);
                    }
                    next
                }
            };
        }
    }

    /// Perform one transition.
    fn advance(&self, run: &mut Run<'_>, state: PlannerState) -> PlannerState {
        match state {
            PlannerState::Init => Self::resolve(run.truck),
            PlannerState::ConstraintsResolved { resolution } => {
                self.fetch(run, resolution, StopPlan::default(), 0)
            }
            PlannerState::BaseRouteFetched {
                resolution,
                fetched,
            } => self.select(run.truck, resolution, fetched, 0),
            PlannerState::StopsResolved {
                resolution,
                fetched,
                selected,
                re_requests,
            } => {
                if selected.signature() == fetched.routed.signature() {
                    // Same stops, but positions measured on this geometry.
                    let current = Fetched {
                        routed: selected,
                        ..fetched
                    };
                    return finalize(run, resolution, current);
                }
                if re_requests >= self.config.max_re_requests {
                    if re_requests > 0 {
                        return self.confirm(run, resolution, fetched);
                    }
                    // The stops were chosen against this geometry, so they
                    // can annotate it even though it was not routed through
                    // them.
                    let annotated = Fetched {
                        routed: selected,
                        ..fetched
                    };
                    return finalize(run, resolution, annotated);
                }
                self.fetch(run, resolution, selected, re_requests + 1)
            }
            PlannerState::RouteRefetched {
                resolution,
                fetched,
                re_requests,
            } => {
                if re_requests >= self.config.max_re_requests {
                    self.confirm(run, resolution, fetched)
                } else {
                    self.select(run.truck, resolution, fetched, re_requests)
                }
            }
            terminal @ (PlannerState::Finalized(_) | PlannerState::Failed(_)) => terminal,
        }
    }

    fn resolve(truck: &TruckProfile) -> PlannerState {
        if let Err(err) = truck.validate() {
            return PlannerState::Failed(err.into());
        }
        let resolution = resolve_constraints(truck);
        for warning in &resolution.warnings {
            warn!("constraint warning: {warning}");
        }
        PlannerState::ConstraintsResolved { resolution }
    }

    /// Issue a backend request carrying `stops` as waypoints.
    fn fetch(
        &self,
        run: &mut Run<'_>,
        resolution: Resolution,
        stops: StopPlan,
        re_requests: u32,
    ) -> PlannerState {
        let waypoints = (!stops.is_empty()).then_some(&stops);
        let request = build_request(
            &run.truck.current_location,
            &run.truck.destination,
            &resolution.constraints,
            waypoints,
        );
        run.backend_calls += 1;
        match self
            .backend
            .fetch_route(&request, self.config.backend_timeout)
        {
            Err(err) => {
                warn!("routing backend call {} failed: {err}", run.backend_calls);
                PlannerState::Failed(err.into())
            }
            Ok(None) => PlannerState::Finalized(PlanOutcome::NoRouteFound {
                constraints: resolution.constraints,
                warnings: resolution.warnings,
                backend_calls: run.backend_calls,
            }),
            Ok(Some(route)) => {
                let fetched = Fetched {
                    request,
                    route,
                    routed: stops,
                };
                if re_requests == 0 {
                    PlannerState::BaseRouteFetched {
                        resolution,
                        fetched,
                    }
                } else {
                    PlannerState::RouteRefetched {
                        resolution,
                        fetched,
                        re_requests,
                    }
                }
            }
        }
    }

    /// Run the stop selector against the current route.
    fn select(
        &self,
        truck: &TruckProfile,
        resolution: Resolution,
        fetched: Fetched,
        re_requests: u32,
    ) -> PlannerState {
        let candidates = self.candidates(truck, &fetched);
        match self
            .selector
            .select(&fetched.route.geometry, truck, &candidates)
        {
            Ok(selected) => {
                debug!(
                    "selected {} fuel and {} rest stops",
                    selected.fuel_stops.len(),
                    selected.rest_stops.len()
                );
                PlannerState::StopsResolved {
                    resolution,
                    fetched,
                    selected,
                    re_requests,
                }
            }
            Err(err) => {
                warn!("fuel plan infeasible: {err}");
                PlannerState::Failed(err.into())
            }
        }
    }

    /// Check the routed stops against the final geometry without another
    /// backend call.
    fn confirm(&self, run: &Run<'_>, resolution: Resolution, fetched: Fetched) -> PlannerState {
        match self
            .selector
            .reconcile(&fetched.route.geometry, run.truck, &fetched.routed)
        {
            Ok(routed) => finalize(run, resolution, Fetched { routed, ..fetched }),
            Err(err) => {
                warn!("refetched route cannot be refuelled: {err}");
                PlannerState::Failed(err.into())
            }
        }
    }

    fn candidates(&self, truck: &TruckProfile, fetched: &Fetched) -> StopCandidates {
        let mut candidates = StopCandidates::from_profile(truck);
        let area = search_area(
            &fetched.route.geometry,
            self.config.tolerance_meters,
            self.config.distance_method,
        );
        if let (Some(catalog), Some(area)) = (&self.catalog, area) {
            candidates.extend(catalog.stations_near(&area), catalog.rest_areas_near(&area));
        }
        candidates
    }
}

fn finalize(run: &Run<'_>, resolution: Resolution, fetched: Fetched) -> PlannerState {
    let Fetched {
        request,
        route,
        routed,
    } = fetched;
    PlannerState::Finalized(PlanOutcome::Planned(RoutePlan {
        constraints: resolution.constraints,
        stops: routed,
        summary: route.summary,
        geometry: route.geometry,
        request,
        warnings: resolution.warnings,
        backend_calls: run.backend_calls,
    }))
}
