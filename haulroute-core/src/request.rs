//! Rendering of constraints and stops into an ordered backend request.
//!
//! The builder never decides anything; it only serialises what the resolver
//! and the stop selector produced, in a fixed order so that two requests for
//! the same inputs compare equal.

use std::fmt;

use geo::Point;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{Location, RouteConstraints, StopPlan};

/// Parameter key for the vehicle height limit.
pub const MAX_HEIGHT: &str = "maxHeight";
/// Parameter key for the vehicle width limit.
pub const MAX_WIDTH: &str = "maxWidth";
/// Parameter key for the vehicle length limit.
pub const MAX_LENGTH: &str = "maxLength";
/// Parameter key for the gross weight limit.
pub const MAX_WEIGHT: &str = "maxWeight";
/// Parameter key for the route optimisation target.
pub const ROUTE_TYPE: &str = "routeType";
/// Parameter key for a road feature to avoid.
pub const AVOID: &str = "avoid";
/// Parameter key for a zone to route around.
pub const AVOID_ZONE: &str = "avoidZone";
/// Parameter key for a zone to monitor.
pub const MONITOR_ZONE: &str = "monitorZone";
/// Parameter key for an intermediate stop.
pub const WAYPOINT: &str = "waypoint";
/// Parameter key for the per-axle weights.
pub const AXLE_WEIGHT: &str = "axleWeight";

/// One abstract key/value request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RequestParam {
    /// Parameter name.
    pub key: &'static str,
    /// Rendered value.
    pub value: String,
}

impl RequestParam {
    fn new(key: &'static str, value: impl fmt::Display) -> Self {
        Self {
            key,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for RequestParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A backend-neutral route request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RouteRequest {
    /// Trip start.
    pub origin: Location,
    /// Trip end.
    pub destination: Location,
    /// Parameters in canonical order.
    pub params: Vec<RequestParam>,
}

impl RouteRequest {
    /// Parameters carrying `key`, in order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |param| param.key == key)
            .map(|param| param.value.as_str())
    }

    /// Intermediate stops as points (`x = longitude`, `y = latitude`).
    ///
    /// Values that do not parse as `lat,lon` are skipped.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Point<f64>> {
        self.values(WAYPOINT).filter_map(parse_lat_lon).collect()
    }

    /// Every parameter rendered as `key=value`.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.params.iter().map(ToString::to_string).collect()
    }
}

fn parse_lat_lon(value: &str) -> Option<Point<f64>> {
    let (lat, lon) = value.split_once(',')?;
    Some(Point::new(lon.trim().parse().ok()?, lat.trim().parse().ok()?))
}

/// Render constraints and optional stops into a request.
///
/// Order: dimension and weight limits, route type, avoidances, avoided
/// zones, monitored zones, waypoints by projected position, axle weights.
///
/// # Examples
/// ```
/// use haulroute_core::{
///     Avoidance, ConstraintKind, Location, RouteConstraints, request::build_request,
/// };
///
/// let mut constraints = RouteConstraints::with_limits(4.0, 2.55, 16.5, 40_000);
/// constraints.apply(ConstraintKind::Avoid(Avoidance::Ferries));
/// constraints.apply(ConstraintKind::Avoid(Avoidance::Tunnels));
///
/// let request = build_request(&Location::at(52.5, 13.4), &Location::at(48.1, 11.6), &constraints, None);
/// assert_eq!(
///     request.rendered(),
///     [
///         "maxHeight=4",
///         "maxWidth=2.55",
///         "maxLength=16.5",
///         "maxWeight=40000",
///         "avoid=Tunnels",
///         "avoid=Ferries",
///     ]
/// );
/// ```
#[must_use]
pub fn build_request(
    origin: &Location,
    destination: &Location,
    constraints: &RouteConstraints,
    stops: Option<&StopPlan>,
) -> RouteRequest {
    let mut params = vec![
        RequestParam::new(MAX_HEIGHT, constraints.max_height),
        RequestParam::new(MAX_WIDTH, constraints.max_width),
        RequestParam::new(MAX_LENGTH, constraints.max_length),
        RequestParam::new(MAX_WEIGHT, constraints.max_weight),
    ];
    if constraints.prefer_fastest {
        params.push(RequestParam::new(ROUTE_TYPE, "fastest"));
    }
    params.extend(
        constraints
            .avoid
            .iter()
            .map(|avoidance| RequestParam::new(AVOID, avoidance)),
    );
    params.extend(
        constraints
            .avoid_zones
            .iter()
            .map(|zone| RequestParam::new(AVOID_ZONE, zone)),
    );
    params.extend(
        constraints
            .monitored_zones
            .iter()
            .map(|zone| RequestParam::new(MONITOR_ZONE, zone)),
    );
    if let Some(plan) = stops {
        params.extend(
            plan.waypoints()
                .into_iter()
                .map(|point| RequestParam::new(WAYPOINT, format!("{},{}", point.y(), point.x()))),
        );
    }
    if !constraints.axle_weights.is_empty() {
        let joined = constraints
            .axle_weights
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.push(RequestParam::new(AXLE_WEIGHT, joined));
    }

    RouteRequest {
        origin: origin.clone(),
        destination: destination.clone(),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stops::OnRoute;
    use crate::{Avoidance, ConstraintKind, FuelStation, RestArea};
    use rstest::{fixture, rstest};

    #[fixture]
    fn constraints() -> RouteConstraints {
        let mut constraints = RouteConstraints::with_limits(4.0, 2.5, 16.0, 38_000);
        for kind in [
            ConstraintKind::Avoid(Avoidance::Ferries),
            ConstraintKind::Avoid(Avoidance::TollRoads),
            ConstraintKind::MonitorZone("a9".into()),
            ConstraintKind::AvoidZone("ring".into()),
            ConstraintKind::PreferFastest,
        ] {
            constraints.apply(kind);
        }
        constraints.axle_weights = vec![8_000, 10_000, 20_000];
        constraints
    }

    fn on_route<T>(stop: T, position: f64) -> OnRoute<T> {
        OnRoute {
            stop,
            position,
            distance: 0.0,
        }
    }

    #[rstest]
    fn renders_canonical_order(constraints: RouteConstraints) {
        let plan = StopPlan {
            fuel_stops: vec![on_route(FuelStation::new(1, Point::new(13.0, 52.0)), 300.0)],
            rest_stops: vec![on_route(RestArea::new(2, Point::new(12.5, 51.5)), 100.0)],
        };
        let request = build_request(
            &Location::at(53.0, 14.0),
            &Location::at(50.0, 11.0),
            &constraints,
            Some(&plan),
        );
        assert_eq!(
            request.rendered(),
            [
                "maxHeight=4",
                "maxWidth=2.5",
                "maxLength=16",
                "maxWeight=38000",
                "routeType=fastest",
                "avoid=TollRoads",
                "avoid=Ferries",
                "avoidZone=ring",
                "monitorZone=a9",
                "waypoint=51.5,12.5",
                "waypoint=52,13",
                "axleWeight=8000,10000,20000",
            ]
        );
    }

    #[rstest]
    fn empty_plan_adds_no_waypoints(constraints: RouteConstraints) {
        let request = build_request(
            &Location::at(53.0, 14.0),
            &Location::at(50.0, 11.0),
            &constraints,
            Some(&StopPlan::default()),
        );
        assert_eq!(request.values(WAYPOINT).count(), 0);
    }

    #[rstest]
    fn waypoints_parse_back_to_points(constraints: RouteConstraints) {
        let plan = StopPlan {
            fuel_stops: vec![on_route(FuelStation::new(1, Point::new(13.25, 52.5)), 1.0)],
            rest_stops: Vec::new(),
        };
        let request = build_request(
            &Location::at(53.0, 14.0),
            &Location::at(50.0, 11.0),
            &constraints,
            Some(&plan),
        );
        assert_eq!(request.waypoints(), [Point::new(13.25, 52.5)]);
    }

    #[rstest]
    fn identical_inputs_give_identical_requests(constraints: RouteConstraints) {
        let build = || build_request(&Location::at(1.0, 2.0), &Location::at(3.0, 4.0), &constraints, None);
        assert_eq!(build(), build());
    }
}
