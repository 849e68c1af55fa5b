//! Truck profiles: the physical and operational description of a vehicle.
//!
//! A [`TruckProfile`] is supplied by the caller once per planning request and
//! is never mutated by the engine. Restriction, traffic and weather entries
//! are kept as the raw strings the caller provided; the constraint resolver
//! decides which of them it understands.

use std::collections::{BTreeMap, BTreeSet};

use geo::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical envelope of the vehicle in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    /// Overall height including load.
    pub height: f64,
    /// Overall width.
    pub width: f64,
    /// Overall length including trailer.
    pub length: f64,
}

/// Kind of freight carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CargoType {
    /// Ordinary freight.
    #[default]
    General,
    /// Time-sensitive goods such as chilled food.
    Perishable,
    /// Dangerous goods.
    Hazardous,
}

/// A named place with WGS84 coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Free-form postal address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Construct a location without an address.
    ///
    /// # Examples
    /// ```
    /// use haulroute_core::Location;
    ///
    /// let depot = Location::at(52.509, 13.429);
    /// assert!(depot.address.is_empty());
    /// ```
    #[must_use]
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            address: String::new(),
            latitude,
            longitude,
        }
    }

    /// Return the location as a `geo` point (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Anything that can be inserted into a route as an intermediate stop.
pub trait Waypoint {
    /// Catalog identifier, used for deterministic ordering.
    fn id(&self) -> u64;
    /// Position of the stop (`x = longitude`, `y = latitude`).
    fn location(&self) -> Point<f64>;
}

/// A refuelling station from the caller's catalog.
///
/// # Examples
/// ```
/// use geo::Point;
/// use haulroute_core::{FuelStation, Waypoint};
///
/// let station = FuelStation::new(7, Point::new(13.4, 52.5));
/// assert_eq!(station.id(), 7);
/// assert!(station.amenities.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuelStation {
    /// Catalog identifier.
    pub id: u64,
    /// Station position (`x = longitude`, `y = latitude`).
    pub location: Point<f64>,
    /// Services offered, e.g. `"showers"` or `"adblue"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amenities: BTreeSet<String>,
}

impl FuelStation {
    /// Construct a station without amenities.
    #[must_use]
    pub const fn new(id: u64, location: Point<f64>) -> Self {
        Self {
            id,
            location,
            amenities: BTreeSet::new(),
        }
    }
}

impl Waypoint for FuelStation {
    fn id(&self) -> u64 {
        self.id
    }

    fn location(&self) -> Point<f64> {
        self.location
    }
}

/// A rest area where the driver can take a mandated break.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RestArea {
    /// Catalog identifier.
    pub id: u64,
    /// Rest area position (`x = longitude`, `y = latitude`).
    pub location: Point<f64>,
    /// Facilities available on site.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amenities: BTreeSet<String>,
}

impl RestArea {
    /// Construct a rest area without amenities.
    #[must_use]
    pub const fn new(id: u64, location: Point<f64>) -> Self {
        Self {
            id,
            location,
            amenities: BTreeSet::new(),
        }
    }
}

impl Waypoint for RestArea {
    fn id(&self) -> u64 {
        self.id
    }

    fn location(&self) -> Point<f64> {
        self.location
    }
}

/// Description of a vehicle, its load and its driver's situation.
///
/// `axle_weights` should sum to `weight`; the resolver reports a mismatch as
/// a warning rather than rejecting the profile.
///
/// # Examples
/// ```
/// use haulroute_core::{Dimensions, Location, TruckProfile};
///
/// let truck = TruckProfile::new(
///     Dimensions { height: 4.0, width: 2.55, length: 16.5 },
///     40_000,
///     Location::at(52.50931, 13.42936),
///     Location::at(52.50274, 13.43872),
/// );
/// assert!(truck.validate().is_ok());
/// assert!(!truck.has_toll_transponder());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TruckProfile {
    /// Vehicle envelope in metres.
    pub dimensions: Dimensions,
    /// Gross weight in kilograms.
    pub weight: u32,
    /// Per-axle weights in kilograms, front to back.
    pub axle_weights: Vec<u32>,
    /// Whether dangerous goods placards apply.
    pub hazmat: bool,
    /// Whether the load is refrigerated.
    pub refrigeration: bool,
    /// Kind of freight.
    pub cargo_type: CargoType,
    /// Usable fuel on board, in caller-defined fuel units.
    pub fuel_capacity: u32,
    /// Candidate refuelling stations; not necessarily on the route.
    pub fuel_stations: Vec<FuelStation>,
    /// Hours the driver has already driven in the current shift.
    pub driver_hours_elapsed: u32,
    /// Candidate rest areas; not necessarily on the route.
    pub rest_areas: Vec<RestArea>,
    /// Declared avoidances such as `"ferries"` or `"tollRoads"`.
    pub route_restrictions: Vec<String>,
    /// Traffic level (`Low`, `Medium`, `High`) keyed by zone identifier.
    pub traffic_patterns: BTreeMap<String, String>,
    /// Weather (`Sunny`, `Rainy`, `Snowy`) keyed by zone identifier.
    pub weather_patterns: BTreeMap<String, String>,
    /// Toll transponder system; absent or blank when the truck has none.
    pub toll_system: Option<String>,
    /// Where the trip starts.
    pub current_location: Location,
    /// Where the trip ends.
    pub destination: Location,
}

impl Default for TruckProfile {
    fn default() -> Self {
        Self::new(
            Dimensions {
                height: 4.0,
                width: 2.55,
                length: 16.5,
            },
            0,
            Location::at(0.0, 0.0),
            Location::at(0.0, 0.0),
        )
    }
}

/// Contract violations detected by [`TruckProfile::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TruckProfileError {
    /// A dimension was zero, negative or not finite.
    #[error("truck {field} must be a positive finite number of metres, got {value}")]
    InvalidDimension {
        /// Name of the offending dimension.
        field: &'static str,
        /// Value supplied by the caller.
        value: f64,
    },
    /// A coordinate was outside the WGS84 range.
    #[error("{field} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// Which location was rejected.
        field: &'static str,
        /// Latitude supplied by the caller.
        latitude: f64,
        /// Longitude supplied by the caller.
        longitude: f64,
    },
}

impl TruckProfile {
    /// Construct a profile with the mandatory attributes and empty pools.
    #[must_use]
    pub const fn new(
        dimensions: Dimensions,
        weight: u32,
        current_location: Location,
        destination: Location,
    ) -> Self {
        Self {
            dimensions,
            weight,
            axle_weights: Vec::new(),
            hazmat: false,
            refrigeration: false,
            cargo_type: CargoType::General,
            fuel_capacity: 0,
            fuel_stations: Vec::new(),
            driver_hours_elapsed: 0,
            rest_areas: Vec::new(),
            route_restrictions: Vec::new(),
            traffic_patterns: BTreeMap::new(),
            weather_patterns: BTreeMap::new(),
            toll_system: None,
            current_location,
            destination,
        }
    }

    /// Whether the truck carries a usable toll transponder.
    #[must_use]
    pub fn has_toll_transponder(&self) -> bool {
        self.toll_system
            .as_deref()
            .is_some_and(|system| !system.trim().is_empty())
    }

    /// Check the caller contract before any planning work starts.
    ///
    /// # Errors
    ///
    /// Returns [`TruckProfileError`] when a dimension is not a positive
    /// finite number or a location lies outside WGS84 bounds.
    pub fn validate(&self) -> Result<(), TruckProfileError> {
        let Dimensions {
            height,
            width,
            length,
        } = self.dimensions;
        for (field, value) in [("height", height), ("width", width), ("length", length)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TruckProfileError::InvalidDimension { field, value });
            }
        }
        check_location("current_location", &self.current_location)?;
        check_location("destination", &self.destination)
    }
}

fn check_location(field: &'static str, location: &Location) -> Result<(), TruckProfileError> {
    let Location {
        latitude,
        longitude,
        ..
    } = *location;
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(TruckProfileError::InvalidCoordinates {
            field,
            latitude,
            longitude,
        })
    }
}
