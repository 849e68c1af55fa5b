//! Mapping from a [`TruckProfile`] to [`RouteConstraints`].

use super::{
    Avoidance, ConstraintKind, ConstraintWarning, RouteConstraints, TrafficLevel, Weather,
};
use crate::{CargoType, TruckProfile};

/// Constraints resolved from a profile together with any ignored input.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The normalised constraints.
    pub constraints: RouteConstraints,
    /// Input that was skipped or looked inconsistent.
    pub warnings: Vec<ConstraintWarning>,
}

/// Resolve the routing constraints implied by `truck`.
///
/// Resolution is total: unknown restrictions, traffic levels and weather
/// values are skipped and reported as warnings. A truck without a toll
/// transponder always avoids toll roads.
///
/// # Examples
/// ```
/// use haulroute_core::{Avoidance, Dimensions, Location, TruckProfile, resolve_constraints};
///
/// let mut truck = TruckProfile::new(
///     Dimensions { height: 4.0, width: 2.55, length: 16.5 },
///     40_000,
///     Location::at(52.5, 13.4),
///     Location::at(48.1, 11.6),
/// );
/// truck.hazmat = true;
/// truck.route_restrictions = vec!["ferries".into(), "cobblestones".into()];
///
/// let resolution = resolve_constraints(&truck);
/// let avoid: Vec<_> = resolution.constraints.avoid.into_iter().collect();
/// assert_eq!(avoid, [Avoidance::Tunnels, Avoidance::TollRoads, Avoidance::Ferries]);
/// assert_eq!(resolution.warnings.len(), 1);
/// ```
#[must_use]
pub fn resolve_constraints(truck: &TruckProfile) -> Resolution {
    let mut warnings = Vec::new();
    let mut constraints = RouteConstraints::with_limits(
        truck.dimensions.height,
        truck.dimensions.width,
        truck.dimensions.length,
        truck.weight,
    );
    constraints.axle_weights.clone_from(&truck.axle_weights);
    if let Some(warning) = axle_weight_mismatch(truck) {
        warnings.push(warning);
    }

    for kind in decisions(truck, &mut warnings) {
        constraints.apply(kind);
    }

    Resolution {
        constraints,
        warnings,
    }
}

/// Collect every decision the profile implies, in application order.
///
/// Traffic decisions come before weather so that a congested zone is never
/// downgraded to merely monitored.
fn decisions(truck: &TruckProfile, warnings: &mut Vec<ConstraintWarning>) -> Vec<ConstraintKind> {
    let mut kinds = Vec::new();

    if truck.hazmat {
        kinds.push(ConstraintKind::Avoid(Avoidance::Tunnels));
    }
    if truck.cargo_type == CargoType::Hazardous {
        if !truck.hazmat {
            warnings.push(ConstraintWarning::HazmatFlagMismatch);
        }
        kinds.push(ConstraintKind::Avoid(Avoidance::Tunnels));
    }

    for restriction in &truck.route_restrictions {
        match restriction.parse::<Avoidance>() {
            Ok(avoidance) => kinds.push(ConstraintKind::Avoid(avoidance)),
            Err(_) => warnings.push(ConstraintWarning::UnknownRestriction {
                value: restriction.clone(),
            }),
        }
    }

    for (zone, level) in &truck.traffic_patterns {
        match level.parse::<TrafficLevel>() {
            Ok(TrafficLevel::High) => kinds.push(ConstraintKind::AvoidZone(zone.clone())),
            Ok(TrafficLevel::Medium) => kinds.push(ConstraintKind::MonitorZone(zone.clone())),
            Ok(TrafficLevel::Low) => {}
            Err(_) => warnings.push(ConstraintWarning::UnknownTrafficLevel {
                zone: zone.clone(),
                level: level.clone(),
            }),
        }
    }

    for (zone, weather) in &truck.weather_patterns {
        match weather.parse::<Weather>() {
            Ok(Weather::Rainy | Weather::Snowy) => {
                kinds.push(ConstraintKind::MonitorZone(zone.clone()));
            }
            Ok(Weather::Sunny) => {}
            Err(_) => warnings.push(ConstraintWarning::UnknownWeather {
                zone: zone.clone(),
                weather: weather.clone(),
            }),
        }
    }

    if !truck.has_toll_transponder() {
        kinds.push(ConstraintKind::Avoid(Avoidance::TollRoads));
    }

    if truck.refrigeration || truck.cargo_type == CargoType::Perishable {
        kinds.push(ConstraintKind::PreferFastest);
    }

    kinds
}

fn axle_weight_mismatch(truck: &TruckProfile) -> Option<ConstraintWarning> {
    if truck.axle_weights.is_empty() {
        return None;
    }
    let axle_total: u64 = truck.axle_weights.iter().copied().map(u64::from).sum();
    (axle_total != u64::from(truck.weight)).then_some(ConstraintWarning::AxleWeightMismatch {
        declared: truck.weight,
        axle_total,
    })
}
