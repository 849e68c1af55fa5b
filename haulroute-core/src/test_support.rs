//! Test doubles for the backend and catalog seams.
//!
//! [`ScriptedBackend`] replays canned replies without any network access and
//! [`MemoryCatalog`] performs a linear scan over a handful of stops.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use geo::{Intersects, LineString, Rect};

use crate::backend::{BackendError, BackendRoute, RouteBackend, RouteSummary};
use crate::geometry::{DistanceMethod, polyline_length};
use crate::request::RouteRequest;
use crate::{Dimensions, FuelStation, Location, RestArea, StationCatalog, TruckProfile};

/// In-memory `StationCatalog` performing a linear scan.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    stations: Vec<FuelStation>,
    rest_areas: Vec<RestArea>,
}

impl MemoryCatalog {
    /// Create a catalog from the given stops.
    #[must_use]
    pub const fn new(stations: Vec<FuelStation>, rest_areas: Vec<RestArea>) -> Self {
        Self {
            stations,
            rest_areas,
        }
    }
}

impl StationCatalog for MemoryCatalog {
    fn stations_near(&self, bbox: &Rect<f64>) -> Vec<FuelStation> {
        let mut found: Vec<_> = self
            .stations
            .iter()
            // `Intersects` treats boundary points as inside the rectangle.
            .filter(|s| bbox.intersects(&s.location))
            .cloned()
            .collect();
        found.sort_unstable_by_key(|s| s.id);
        found
    }

    fn rest_areas_near(&self, bbox: &Rect<f64>) -> Vec<RestArea> {
        let mut found: Vec<_> = self
            .rest_areas
            .iter()
            .filter(|r| bbox.intersects(&r.location))
            .cloned()
            .collect();
        found.sort_unstable_by_key(|r| r.id);
        found
    }
}

type Reply = Result<Option<BackendRoute>, BackendError>;

/// `RouteBackend` replaying scripted replies and recording every request.
///
/// Once the script runs out the backend answers with a straight line from
/// origin through any waypoints to destination.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use haulroute_core::backend::RouteBackend;
/// use haulroute_core::request::build_request;
/// use haulroute_core::test_support::ScriptedBackend;
/// use haulroute_core::{Location, RouteConstraints};
///
/// let backend = ScriptedBackend::default().then_no_route();
/// let constraints = RouteConstraints::with_limits(4.0, 2.5, 16.5, 40_000);
/// let request = build_request(&Location::at(0.0, 0.0), &Location::at(1.0, 1.0), &constraints, None);
///
/// assert_eq!(backend.fetch_route(&request, Duration::from_secs(1)), Ok(None));
/// assert!(backend.fetch_route(&request, Duration::from_secs(1))?.is_some());
/// assert_eq!(backend.calls(), 2);
/// # Ok::<(), haulroute_core::backend::BackendError>(())
/// ```
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(RouteRequest, Duration)>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedBackend {
    /// Queue a route with the given geometry.
    #[must_use]
    pub fn then_route(self, geometry: LineString<f64>) -> Self {
        let summary = summarise(&geometry);
        self.then_reply(Ok(Some(BackendRoute { geometry, summary })))
    }

    /// Queue an empty route list.
    #[must_use]
    pub fn then_no_route(self) -> Self {
        self.then_reply(Ok(None))
    }

    /// Queue a transport error.
    #[must_use]
    pub fn then_error(self, error: BackendError) -> Self {
        self.then_reply(Err(error))
    }

    fn then_reply(self, reply: Reply) -> Self {
        guard(&self.script).push_back(reply);
        self
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RouteRequest> {
        guard(&self.requests)
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// Timeouts passed with each request.
    #[must_use]
    pub fn timeouts(&self) -> Vec<Duration> {
        guard(&self.requests)
            .iter()
            .map(|(_, timeout)| *timeout)
            .collect()
    }

    /// Number of calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        guard(&self.requests).len()
    }
}

impl RouteBackend for ScriptedBackend {
    fn fetch_route(&self, request: &RouteRequest, timeout: Duration) -> Reply {
        guard(&self.requests).push((request.clone(), timeout));
        guard(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(Some(straight_route(request))))
    }
}

/// Route running straight from origin via each waypoint to destination.
#[must_use]
pub fn straight_route(request: &RouteRequest) -> BackendRoute {
    let geometry: LineString<f64> = std::iter::once(request.origin.point())
        .chain(request.waypoints())
        .chain(std::iter::once(request.destination.point()))
        .collect();
    let summary = summarise(&geometry);
    BackendRoute { geometry, summary }
}

fn summarise(geometry: &LineString<f64>) -> RouteSummary {
    RouteSummary {
        length_meters: polyline_length(geometry, DistanceMethod::Haversine),
        ..RouteSummary::default()
    }
}

/// A 40 t articulated truck driving Berlin to Munich with a transponder.
#[must_use]
pub fn sample_truck() -> TruckProfile {
    let mut truck = TruckProfile::new(
        Dimensions {
            height: 4.0,
            width: 2.55,
            length: 16.5,
        },
        40_000,
        Location {
            address: "Berlin".into(),
            latitude: 52.52,
            longitude: 13.40,
        },
        Location {
            address: "Munich".into(),
            latitude: 48.14,
            longitude: 11.58,
        },
    );
    truck.axle_weights = vec![7_500, 11_500, 21_000];
    truck.fuel_capacity = 400;
    truck.toll_system = Some("Toll Collect".into());
    truck
}
