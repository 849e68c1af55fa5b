//! Routing constraints derived from a truck profile.
//!
//! [`resolve_constraints`] folds every constraint a profile implies into a
//! single [`RouteConstraints`] value. Decisions are expressed as
//! [`ConstraintKind`] values and reduced in one place, which keeps the
//! zone-disjointness invariant enforced by construction.

mod resolver;
mod warning;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use resolver::{Resolution, resolve_constraints};
pub use warning::ConstraintWarning;

/// Road features the backend should route around.
///
/// The declaration order is the canonical rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Avoidance {
    /// Road tunnels.
    Tunnels,
    /// Tolled roads.
    TollRoads,
    /// Motorways.
    Motorways,
    /// Ferry crossings.
    Ferries,
}

impl Avoidance {
    /// Return the canonical parameter spelling.
    ///
    /// # Examples
    /// ```
    /// use haulroute_core::Avoidance;
    ///
    /// assert_eq!(Avoidance::TollRoads.as_str(), "TollRoads");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tunnels => "Tunnels",
            Self::TollRoads => "TollRoads",
            Self::Motorways => "Motorways",
            Self::Ferries => "Ferries",
        }
    }
}

impl fmt::Display for Avoidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Avoidance {
    type Err = String;

    /// Parse a restriction, ignoring case and `_`/`-` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalised.as_str() {
            "tunnels" => Ok(Self::Tunnels),
            "tollroads" => Ok(Self::TollRoads),
            "motorways" => Ok(Self::Motorways),
            "ferries" => Ok(Self::Ferries),
            _ => Err(format!("unknown route restriction '{s}'")),
        }
    }
}

/// Congestion level reported for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficLevel {
    /// Free-flowing traffic.
    Low,
    /// Slow traffic worth watching.
    Medium,
    /// Congestion severe enough to route around.
    High,
}

impl FromStr for TrafficLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown traffic level '{s}'")),
        }
    }
}

/// Weather reported for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    /// Dry conditions.
    Sunny,
    /// Wet roads.
    Rainy,
    /// Snow or ice.
    Snowy,
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunny" => Ok(Self::Sunny),
            "rainy" => Ok(Self::Rainy),
            "snowy" => Ok(Self::Snowy),
            _ => Err(format!("unknown weather '{s}'")),
        }
    }
}

/// A single routing decision implied by a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Avoid a class of road feature.
    Avoid(Avoidance),
    /// Route around a zone entirely.
    AvoidZone(String),
    /// Pass through a zone but keep an eye on it.
    MonitorZone(String),
    /// Favour travel time over distance.
    PreferFastest,
}

/// Normalised routing constraints for one planning request.
///
/// `avoid_zones` and `monitored_zones` never share a zone; avoidance wins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteConstraints {
    /// Maximum vehicle height in metres.
    pub max_height: f64,
    /// Maximum vehicle width in metres.
    pub max_width: f64,
    /// Maximum vehicle length in metres.
    pub max_length: f64,
    /// Gross weight in kilograms.
    pub max_weight: u32,
    /// Road features to avoid.
    pub avoid: BTreeSet<Avoidance>,
    /// Zones to pass through under observation.
    pub monitored_zones: BTreeSet<String>,
    /// Zones to route around.
    pub avoid_zones: BTreeSet<String>,
    /// Per-axle weights in kilograms, front to back.
    pub axle_weights: Vec<u32>,
    /// Whether the fastest rather than the shortest route is wanted.
    pub prefer_fastest: bool,
}

impl RouteConstraints {
    /// Constraints carrying only dimension and weight limits.
    #[must_use]
    pub const fn with_limits(
        max_height: f64,
        max_width: f64,
        max_length: f64,
        max_weight: u32,
    ) -> Self {
        Self {
            max_height,
            max_width,
            max_length,
            max_weight,
            avoid: BTreeSet::new(),
            monitored_zones: BTreeSet::new(),
            avoid_zones: BTreeSet::new(),
            axle_weights: Vec::new(),
            prefer_fastest: false,
        }
    }

    /// Fold one decision into the constraints.
    ///
    /// Applying the same decision twice is a no-op. Avoiding a zone removes it
    /// from the monitored set, and a zone already avoided is never monitored.
    ///
    /// # Examples
    /// ```
    /// use haulroute_core::{ConstraintKind, RouteConstraints};
    ///
    /// let mut constraints = RouteConstraints::with_limits(4.0, 2.5, 16.5, 40_000);
    /// constraints.apply(ConstraintKind::MonitorZone("A9".into()));
    /// constraints.apply(ConstraintKind::AvoidZone("A9".into()));
    /// assert!(constraints.avoid_zones.contains("A9"));
    /// assert!(constraints.monitored_zones.is_empty());
    /// ```
    pub fn apply(&mut self, kind: ConstraintKind) {
        match kind {
            ConstraintKind::Avoid(avoidance) => {
                self.avoid.insert(avoidance);
            }
            ConstraintKind::AvoidZone(zone) => {
                self.monitored_zones.remove(&zone);
                self.avoid_zones.insert(zone);
            }
            ConstraintKind::MonitorZone(zone) => {
                if !self.avoid_zones.contains(&zone) {
                    self.monitored_zones.insert(zone);
                }
            }
            ConstraintKind::PreferFastest => self.prefer_fastest = true,
        }
    }
}
