//! The routing backend seam.
//!
//! The engine never computes geometry itself. A [`RouteBackend`] receives a
//! [`RouteRequest`] and answers with the first candidate route, or `None`
//! when the service found no route at all. Implementations own their
//! connection pooling and any retry policy; the planner calls each backend
//! exactly once per request it issues.

mod error;

use std::time::Duration;

use geo::LineString;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use error::BackendError;

use crate::request::RouteRequest;

/// Aggregate figures the backend reports for a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSummary {
    /// Route length in metres.
    pub length_meters: f64,
    /// Expected travel time in seconds.
    pub travel_time_seconds: f64,
    /// Delay caused by traffic in seconds.
    pub traffic_delay_seconds: f64,
}

/// The first route returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRoute {
    /// Route polyline (`x = longitude`, `y = latitude`).
    pub geometry: LineString<f64>,
    /// Backend-reported totals.
    pub summary: RouteSummary,
}

/// Fetch a route for a rendered request.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use geo::LineString;
/// use haulroute_core::backend::{BackendError, BackendRoute, RouteBackend, RouteSummary};
/// use haulroute_core::request::{RouteRequest, build_request};
/// use haulroute_core::{Location, RouteConstraints};
///
/// struct StraightLine;
///
/// impl RouteBackend for StraightLine {
///     fn fetch_route(
///         &self,
///         request: &RouteRequest,
///         _timeout: Duration,
///     ) -> Result<Option<BackendRoute>, BackendError> {
///         let geometry = LineString::from(vec![
///             request.origin.point(),
///             request.destination.point(),
///         ]);
///         Ok(Some(BackendRoute { geometry, summary: RouteSummary::default() }))
///     }
/// }
///
/// let constraints = RouteConstraints::with_limits(4.0, 2.5, 16.5, 40_000);
/// let request = build_request(&Location::at(0.0, 0.0), &Location::at(0.0, 1.0), &constraints, None);
/// let route = StraightLine.fetch_route(&request, Duration::from_secs(1))?;
/// assert!(route.is_some());
/// # Ok::<(), BackendError>(())
/// ```
pub trait RouteBackend {
    /// Return the first candidate route, or `None` if the backend found none.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the call fails or exceeds `timeout`.
    fn fetch_route(
        &self,
        request: &RouteRequest,
        timeout: Duration,
    ) -> Result<Option<BackendRoute>, BackendError>;
}

impl<B: RouteBackend + ?Sized> RouteBackend for &B {
    fn fetch_route(
        &self,
        request: &RouteRequest,
        timeout: Duration,
    ) -> Result<Option<BackendRoute>, BackendError> {
        (**self).fetch_route(request, timeout)
    }
}

impl<B: RouteBackend + ?Sized> RouteBackend for Box<B> {
    fn fetch_route(
        &self,
        request: &RouteRequest,
        timeout: Duration,
    ) -> Result<Option<BackendRoute>, BackendError> {
        (**self).fetch_route(request, timeout)
    }
}
