//! Read-only catalogs of fuel stations and rest areas.
//!
//! A catalog supplies candidates beyond those carried on the truck profile.
//! The planner queries it with the route's bounding box widened by the
//! on-route tolerance, then applies the exact tolerance filter itself, so a
//! catalog only needs to be conservative.

use geo::{BoundingRect, Coord, LineString, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::geometry::DistanceMethod;
use crate::{FuelStation, RestArea, Waypoint};

/// Metres per degree of latitude on the mean Earth sphere.
const METERS_PER_DEGREE: f64 = 111_195.08;

/// Smallest cosine used when widening longitudes near the poles.
const MIN_LONGITUDE_SCALE: f64 = 0.01;

/// Read access to stop candidates within a bounding box.
///
/// # Examples
///
/// ```
/// use geo::{Coord, Point, Rect};
/// use haulroute_core::{FuelStation, StationCatalog, catalog::IndexedCatalog};
///
/// let catalog = IndexedCatalog::new(
///     vec![
///         FuelStation::new(1, Point::new(13.4, 52.5)),
///         FuelStation::new(2, Point::new(2.35, 48.85)),
///     ],
///     Vec::new(),
/// );
/// let bbox = Rect::new(Coord { x: 13.0, y: 52.0 }, Coord { x: 14.0, y: 53.0 });
/// let ids: Vec<_> = catalog.stations_near(&bbox).iter().map(|s| s.id).collect();
/// assert_eq!(ids, [1]);
/// ```
pub trait StationCatalog {
    /// Fuel stations whose location lies inside `bbox`, ordered by id.
    fn stations_near(&self, bbox: &Rect<f64>) -> Vec<FuelStation>;

    /// Rest areas whose location lies inside `bbox`, ordered by id.
    fn rest_areas_near(&self, bbox: &Rect<f64>) -> Vec<RestArea>;
}

impl<C: StationCatalog + ?Sized> StationCatalog for &C {
    fn stations_near(&self, bbox: &Rect<f64>) -> Vec<FuelStation> {
        (**self).stations_near(bbox)
    }

    fn rest_areas_near(&self, bbox: &Rect<f64>) -> Vec<RestArea> {
        (**self).rest_areas_near(bbox)
    }
}

/// R\*-tree entry wrapping a stop.
#[derive(Debug, Clone)]
struct Indexed<T>(T);

impl<T: Waypoint> RTreeObject for Indexed<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let location = self.0.location();
        AABB::from_point([location.x(), location.y()])
    }
}

/// Catalog backed by an in-memory R\*-tree.
#[derive(Debug)]
pub struct IndexedCatalog {
    stations: RTree<Indexed<FuelStation>>,
    rest_areas: RTree<Indexed<RestArea>>,
}

impl IndexedCatalog {
    /// Bulk-load the catalog.
    #[must_use]
    pub fn new(stations: Vec<FuelStation>, rest_areas: Vec<RestArea>) -> Self {
        Self {
            stations: RTree::bulk_load(stations.into_iter().map(Indexed).collect()),
            rest_areas: RTree::bulk_load(rest_areas.into_iter().map(Indexed).collect()),
        }
    }

    /// Number of stations and rest areas held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.size() + self.rest_areas.size()
    }

    /// Whether the catalog holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn locate<T: Waypoint + Clone>(tree: &RTree<Indexed<T>>, bbox: &Rect<f64>) -> Vec<T> {
    let envelope = AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
    let mut found: Vec<T> = tree
        .locate_in_envelope_intersecting(&envelope)
        .map(|entry| entry.0.clone())
        .collect();
    found.sort_unstable_by_key(Waypoint::id);
    found
}

impl StationCatalog for IndexedCatalog {
    fn stations_near(&self, bbox: &Rect<f64>) -> Vec<FuelStation> {
        locate(&self.stations, bbox)
    }

    fn rest_areas_near(&self, bbox: &Rect<f64>) -> Vec<RestArea> {
        locate(&self.rest_areas, bbox)
    }
}

/// Bounding box of `route` widened so it holds every point within
/// `tolerance` of the route.
///
/// For [`DistanceMethod::Haversine`] the tolerance is in metres and the
/// widening is converted to degrees at the box's most poleward latitude.
/// Returns `None` for an empty route.
///
/// # Examples
/// ```
/// use geo::LineString;
/// use haulroute_core::{catalog::search_area, geometry::DistanceMethod};
///
/// let route = LineString::from(vec![(0.0, 0.0), (10.0, 5.0)]);
/// let area = search_area(&route, 1.0, DistanceMethod::Euclidean).expect("non-empty");
/// assert_eq!((area.min().x, area.max().y), (-1.0, 6.0));
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "widening converts metres into degree offsets"
)]
pub fn search_area(
    route: &LineString<f64>,
    tolerance: f64,
    method: DistanceMethod,
) -> Option<Rect<f64>> {
    let bounds = route.bounding_rect()?;
    let margin = tolerance.max(0.0);
    let (dx, dy) = match method {
        DistanceMethod::Euclidean => (margin, margin),
        DistanceMethod::Haversine => {
            let degrees = margin / METERS_PER_DEGREE;
            let poleward = (bounds.max().y.abs().max(bounds.min().y.abs()) + degrees).min(90.0);
            let scale = poleward.to_radians().cos().max(MIN_LONGITUDE_SCALE);
            (degrees / scale, degrees)
        }
    };
    Some(Rect::new(
        Coord {
            x: bounds.min().x - dx,
            y: bounds.min().y - dy,
        },
        Coord {
            x: bounds.max().x + dx,
            y: bounds.max().y + dy,
        },
    ))
}
