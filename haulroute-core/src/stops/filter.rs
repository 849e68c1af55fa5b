//! Tolerance filtering of candidate stops against a route.

use geo::LineString;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Waypoint;
use crate::geometry::{DistanceMethod, project};

/// A candidate stop matched against a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OnRoute<T> {
    /// The matched station or rest area.
    pub stop: T,
    /// Distance along the route to the stop's projection.
    pub position: f64,
    /// Distance between the stop and the route.
    pub distance: f64,
}

/// Keep the candidates lying within `tolerance` of `route`.
///
/// Results are ordered by projected position, ties broken by ascending id.
/// A `tolerance` that is not strictly positive yields no matches.
///
/// # Examples
/// ```
/// use geo::{LineString, Point};
/// use haulroute_core::{FuelStation, geometry::DistanceMethod, stops::stations_along_route};
///
/// let route = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
/// let stations = [
///     FuelStation::new(1, Point::new(8.0, 0.5)),
///     FuelStation::new(2, Point::new(2.0, -0.5)),
///     FuelStation::new(3, Point::new(5.0, 4.0)),
/// ];
/// let matched = stations_along_route(&route, &stations, 1.0, DistanceMethod::Euclidean);
/// let ids: Vec<_> = matched.iter().map(|m| m.stop.id).collect();
/// assert_eq!(ids, [2, 1]);
/// ```
#[must_use]
pub fn stations_along_route<T>(
    route: &LineString<f64>,
    candidates: &[T],
    tolerance: f64,
    method: DistanceMethod,
) -> Vec<OnRoute<T>>
where
    T: Waypoint + Clone,
{
    if !(tolerance > 0.0) {
        return Vec::new();
    }
    let mut matched: Vec<OnRoute<T>> = candidates
        .iter()
        .filter_map(|candidate| {
            let hit = project(candidate.location(), route, method)?;
            (hit.distance <= tolerance).then(|| OnRoute {
                stop: candidate.clone(),
                position: hit.position,
                distance: hit.distance,
            })
        })
        .collect();
    matched.sort_by(|lhs, rhs| {
        lhs.position
            .total_cmp(&rhs.position)
            .then_with(|| lhs.stop.id().cmp(&rhs.stop.id()))
    });
    matched
}
