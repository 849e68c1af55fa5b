//! Tunables consumed by the stop selector and the planner.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::DistanceMethod;

/// Default on-route tolerance in metres.
pub const DEFAULT_TOLERANCE_METERS: f64 = 1_000.0;

/// Default distance covered per unit of fuel, in metres.
pub const DEFAULT_FUEL_RANGE_COEFFICIENT: f64 = 3_000.0;

/// Default number of waypoint re-requests per plan.
pub const DEFAULT_MAX_RE_REQUESTS: u32 = 1;

/// Default driving hours after which rest areas are added.
pub const DEFAULT_REST_HOURS_THRESHOLD: u32 = 8;

/// Default per-call backend timeout in seconds.
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`Planner`](crate::Planner) and
/// [`StopSelector`](crate::StopSelector).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use haulroute_core::PlannerConfig;
///
/// let config = PlannerConfig::default()
///     .with_tolerance_meters(500.0)
///     .with_backend_timeout(Duration::from_secs(5));
/// assert_eq!(config.tolerance_meters, 500.0);
/// assert_eq!(config.max_re_requests, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Maximum distance between a stop and the route.
    pub tolerance_meters: f64,
    /// Distance travelled per unit of fuel, in route distance units.
    pub fuel_range_coefficient: f64,
    /// Upper bound on re-requests issued after stops are added.
    pub max_re_requests: u32,
    /// Driving hours beyond which rest areas are inserted.
    pub rest_hours_threshold: u32,
    /// Metric used for stop matching and route length.
    pub distance_method: DistanceMethod,
    /// Timeout handed to the backend for each call.
    pub backend_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tolerance_meters: DEFAULT_TOLERANCE_METERS,
            fuel_range_coefficient: DEFAULT_FUEL_RANGE_COEFFICIENT,
            max_re_requests: DEFAULT_MAX_RE_REQUESTS,
            rest_hours_threshold: DEFAULT_REST_HOURS_THRESHOLD,
            distance_method: DistanceMethod::default(),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        }
    }
}

impl PlannerConfig {
    /// Set the on-route tolerance.
    #[must_use]
    pub const fn with_tolerance_meters(mut self, tolerance_meters: f64) -> Self {
        self.tolerance_meters = tolerance_meters;
        self
    }

    /// Set the distance travelled per unit of fuel.
    #[must_use]
    pub const fn with_fuel_range_coefficient(mut self, coefficient: f64) -> Self {
        self.fuel_range_coefficient = coefficient;
        self
    }

    /// Set the re-request bound.
    #[must_use]
    pub const fn with_max_re_requests(mut self, max_re_requests: u32) -> Self {
        self.max_re_requests = max_re_requests;
        self
    }

    /// Set the driving hours threshold for rest stops.
    #[must_use]
    pub const fn with_rest_hours_threshold(mut self, hours: u32) -> Self {
        self.rest_hours_threshold = hours;
        self
    }

    /// Set the distance metric.
    #[must_use]
    pub const fn with_distance_method(mut self, method: DistanceMethod) -> Self {
        self.distance_method = method;
        self
    }

    /// Set the per-call backend timeout.
    #[must_use]
    pub const fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }
}
