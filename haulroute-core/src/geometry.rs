//! Point-to-polyline primitives used to match stations against a route.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`. Distances
//! are measured either on the sphere ([`DistanceMethod::Haversine`], metres)
//! or in the plane of the raw coordinates ([`DistanceMethod::Euclidean`],
//! coordinate units). Every function here is pure.
//!
//! Segments crossing the antimeridian are not modelled.

use geo::{Distance, Haversine, LineString, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metric used to measure distances between points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceMethod {
    /// Great-circle distance in metres.
    #[default]
    Haversine,
    /// Straight-line distance in coordinate units.
    Euclidean,
}

impl DistanceMethod {
    /// Distance between two points under this metric.
    ///
    /// # Examples
    /// ```
    /// use geo::Point;
    /// use haulroute_core::DistanceMethod;
    ///
    /// let d = DistanceMethod::Euclidean.distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
    /// assert_eq!(d, 5.0);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "planar distance needs coordinate deltas"
    )]
    pub fn distance(self, from: Point<f64>, to: Point<f64>) -> f64 {
        match self {
            Self::Haversine => Haversine.distance(from, to),
            Self::Euclidean => (to.x() - from.x()).hypot(to.y() - from.y()),
        }
    }

    /// Scale applied to longitude deltas when projecting near `origin`.
    ///
    /// Haversine projection works in a local equirectangular frame, where a
    /// degree of longitude shrinks with the cosine of the latitude.
    fn longitude_scale(self, origin: Point<f64>) -> f64 {
        match self {
            Self::Haversine => origin.y().to_radians().cos(),
            Self::Euclidean => 1.0,
        }
    }
}

/// Closest approach of a point to a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Distance from the point to the closest point on the polyline.
    pub distance: f64,
    /// Distance along the polyline from its first vertex to that closest point.
    pub position: f64,
}

/// Project `point` onto `polyline`.
///
/// Returns `None` for an empty polyline. A single-vertex polyline projects
/// onto that vertex at position zero. When two segments are equally close
/// the earlier one wins.
///
/// # Examples
/// ```
/// use geo::{LineString, Point};
/// use haulroute_core::geometry::{DistanceMethod, project};
///
/// let route = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
/// let hit = project(Point::new(4.0, 3.0), &route, DistanceMethod::Euclidean)
///     .expect("non-empty route");
/// assert_eq!(hit.distance, 3.0);
/// assert_eq!(hit.position, 4.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "positions accumulate segment lengths"
)]
pub fn project(
    point: Point<f64>,
    polyline: &LineString<f64>,
    method: DistanceMethod,
) -> Option<Projection> {
    let mut points = polyline.points();
    let first = points.next()?;
    let mut best = Projection {
        distance: method.distance(point, first),
        position: 0.0,
    };
    let mut walked = 0.0;
    let mut start = first;
    for end in points {
        let closest = closest_on_segment(point, start, end, method);
        let distance = method.distance(point, closest);
        if distance < best.distance {
            best = Projection {
                distance,
                position: walked + method.distance(start, closest),
            };
        }
        walked += method.distance(start, end);
        start = end;
    }
    Some(best)
}

/// Minimum distance from `point` to any segment of `polyline`.
///
/// An empty polyline is infinitely far away; a single vertex degrades to a
/// point-to-point distance.
///
/// # Examples
/// ```
/// use geo::{LineString, Point};
/// use haulroute_core::geometry::{DistanceMethod, distance_to_polyline};
///
/// let empty = LineString::<f64>::new(Vec::new());
/// assert_eq!(
///     distance_to_polyline(Point::new(1.0, 1.0), &empty, DistanceMethod::Haversine),
///     f64::INFINITY,
/// );
/// ```
#[must_use]
pub fn distance_to_polyline(
    point: Point<f64>,
    polyline: &LineString<f64>,
    method: DistanceMethod,
) -> f64 {
    project(point, polyline, method).map_or(f64::INFINITY, |hit| hit.distance)
}

/// Cumulative distance along `polyline` to the projection of `point`.
///
/// Returns `None` for an empty polyline.
#[must_use]
pub fn projected_position(
    point: Point<f64>,
    polyline: &LineString<f64>,
    method: DistanceMethod,
) -> Option<f64> {
    project(point, polyline, method).map(|hit| hit.position)
}

/// Total length of `polyline` under `method`.
#[must_use]
pub fn polyline_length(polyline: &LineString<f64>, method: DistanceMethod) -> f64 {
    polyline
        .lines()
        .map(|line| method.distance(line.start_point(), line.end_point()))
        .sum()
}

#[expect(
    clippy::float_arithmetic,
    reason = "segment projection is plain vector arithmetic"
)]
fn closest_on_segment(
    point: Point<f64>,
    start: Point<f64>,
    end: Point<f64>,
    method: DistanceMethod,
) -> Point<f64> {
    let scale = method.longitude_scale(point);
    let seg_x = (end.x() - start.x()) * scale;
    let seg_y = end.y() - start.y();
    let rel_x = (point.x() - start.x()) * scale;
    let rel_y = point.y() - start.y();
    let length_sq = seg_x.mul_add(seg_x, seg_y * seg_y);
    if length_sq <= 0.0 {
        return start;
    }
    let t = (rel_x.mul_add(seg_x, rel_y * seg_y) / length_sq).clamp(0.0, 1.0);
    Point::new(
        (end.x() - start.x()).mul_add(t, start.x()),
        (end.y() - start.y()).mul_add(t, start.y()),
    )
}
