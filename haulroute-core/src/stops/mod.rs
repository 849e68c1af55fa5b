//! Selection of fuel and rest stops along a candidate route.
//!
//! Filtering ([`stations_along_route`]) keeps the candidates within tolerance
//! of the route geometry and orders them by projected position. Refuelling
//! stops are then chosen by [`select_refuel_stops`], a greedy covering that
//! works on plain positions. Rest areas have no capacity trade-off, so every
//! matched rest area is kept once the driver is over the hours threshold.

mod filter;
mod refuel;

use geo::{LineString, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use filter::{OnRoute, stations_along_route};
pub use refuel::{InfeasibleFuelPlan, select_refuel_stops};

use crate::geometry::polyline_length;
use crate::{FuelStation, PlannerConfig, RestArea, TruckProfile, Waypoint};

/// Stops to insert into a route, each ordered by position along it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StopPlan {
    /// Refuelling stops.
    pub fuel_stops: Vec<OnRoute<FuelStation>>,
    /// Rest stops.
    pub rest_stops: Vec<OnRoute<RestArea>>,
}

impl StopPlan {
    /// Whether no stop was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fuel_stops.is_empty() && self.rest_stops.is_empty()
    }

    /// Every stop location, merged in route order.
    ///
    /// Fuel and rest stops at the same position keep fuel first.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Point<f64>> {
        let mut merged: Vec<(f64, u8, u64, Point<f64>)> = self
            .fuel_stops
            .iter()
            .map(|s| (s.position, 0, s.stop.id, s.stop.location))
            .chain(
                self.rest_stops
                    .iter()
                    .map(|s| (s.position, 1, s.stop.id, s.stop.location)),
            )
            .collect();
        merged.sort_by(|lhs, rhs| {
            lhs.0
                .total_cmp(&rhs.0)
                .then(lhs.1.cmp(&rhs.1))
                .then(lhs.2.cmp(&rhs.2))
        });
        merged.into_iter().map(|(.., location)| location).collect()
    }

    /// Identity of the selected stops, used to detect changes between fetches.
    pub(crate) fn signature(&self) -> (Vec<u64>, Vec<u64>) {
        (
            self.fuel_stops.iter().map(|s| s.stop.id()).collect(),
            self.rest_stops.iter().map(|s| s.stop.id()).collect(),
        )
    }
}

/// Candidate pools the selector chooses from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopCandidates {
    /// Candidate refuelling stations.
    pub fuel_stations: Vec<FuelStation>,
    /// Candidate rest areas.
    pub rest_areas: Vec<RestArea>,
}

impl StopCandidates {
    /// Candidates taken from the truck's own pools.
    #[must_use]
    pub fn from_profile(truck: &TruckProfile) -> Self {
        Self {
            fuel_stations: truck.fuel_stations.clone(),
            rest_areas: truck.rest_areas.clone(),
        }
    }

    /// Add catalog candidates, skipping ids already present.
    pub fn extend(&mut self, fuel_stations: Vec<FuelStation>, rest_areas: Vec<RestArea>) {
        extend_unique(&mut self.fuel_stations, fuel_stations);
        extend_unique(&mut self.rest_areas, rest_areas);
    }
}

fn extend_unique<T: Waypoint>(pool: &mut Vec<T>, extra: Vec<T>) {
    for candidate in extra {
        if !pool.iter().any(|existing| existing.id() == candidate.id()) {
            pool.push(candidate);
        }
    }
}

/// Chooses fuel and rest stops for a route.
///
/// The selector is stateless apart from its configuration and can be shared
/// between threads.
///
/// # Examples
/// ```
/// use geo::{LineString, Point};
/// use haulroute_core::{
///     Dimensions, FuelStation, Location, PlannerConfig, StopSelector, TruckProfile,
///     geometry::DistanceMethod, stops::StopCandidates,
/// };
///
/// let config = PlannerConfig::default()
///     .with_distance_method(DistanceMethod::Euclidean)
///     .with_tolerance_meters(5.0)
///     .with_fuel_range_coefficient(1.0);
/// let mut truck = TruckProfile::new(
///     Dimensions { height: 4.0, width: 2.5, length: 16.0 },
///     40_000,
///     Location::at(0.0, 0.0),
///     Location::at(0.0, 500.0),
/// );
/// truck.fuel_capacity = 200;
/// truck.fuel_stations = vec![
///     FuelStation::new(1, Point::new(150.0, 0.0)),
///     FuelStation::new(2, Point::new(310.0, 0.0)),
/// ];
/// let route = LineString::from(vec![(0.0, 0.0), (500.0, 0.0)]);
///
/// let plan = StopSelector::new(&config)
///     .select(&route, &truck, &StopCandidates::from_profile(&truck))?;
/// assert_eq!(plan.fuel_stops.len(), 2);
/// # Ok::<(), haulroute_core::stops::InfeasibleFuelPlan>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StopSelector {
    config: PlannerConfig,
}

impl StopSelector {
    /// Build a selector from planner configuration.
    #[must_use]
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Fuel needed to drive `route_length`, in fuel units.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "fuel is proportional to distance"
    )]
    pub fn fuel_needed(&self, route_length: f64) -> f64 {
        route_length / self.config.fuel_range_coefficient
    }

    /// Distance the truck covers on a full tank.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "range is capacity times the coefficient"
    )]
    pub fn effective_range(&self, fuel_capacity: u32) -> f64 {
        f64::from(fuel_capacity) * self.config.fuel_range_coefficient
    }

    /// Whether the truck needs to refuel to cover `route_length`.
    #[must_use]
    pub fn needs_refuel(&self, fuel_capacity: u32, route_length: f64) -> bool {
        f64::from(fuel_capacity) < self.fuel_needed(route_length)
    }

    /// Whether the driver must be offered rest stops.
    #[must_use]
    pub const fn needs_rest(&self, driver_hours_elapsed: u32) -> bool {
        driver_hours_elapsed > self.config.rest_hours_threshold
    }

    /// Select the stops for `route`.
    ///
    /// # Errors
    ///
    /// Returns [`InfeasibleFuelPlan`] when refuelling is required but the
    /// matched stations cannot be chained within the truck's range.
    pub fn select(
        &self,
        route: &LineString<f64>,
        truck: &TruckProfile,
        candidates: &StopCandidates,
    ) -> Result<StopPlan, InfeasibleFuelPlan> {
        let method = self.config.distance_method;
        let tolerance = self.config.tolerance_meters;
        let route_length = polyline_length(route, method);

        let fuel_stops = if self.needs_refuel(truck.fuel_capacity, route_length) {
            let matched =
                stations_along_route(route, &candidates.fuel_stations, tolerance, method);
            let positions: Vec<f64> = matched.iter().map(|m| m.position).collect();
            let chosen = select_refuel_stops(
                &positions,
                route_length,
                self.effective_range(truck.fuel_capacity),
            )?;
            chosen
                .into_iter()
                .filter_map(|index| matched.get(index).cloned())
                .collect()
        } else {
            Vec::new()
        };

        let rest_stops = if self.needs_rest(truck.driver_hours_elapsed) {
            stations_along_route(route, &candidates.rest_areas, tolerance, method)
        } else {
            Vec::new()
        };

        Ok(StopPlan {
            fuel_stops,
            rest_stops,
        })
    }

    /// Re-measure stops a route was requested through against the route the
    /// backend returned.
    ///
    /// Positions and distances are taken on `route`; stops outside tolerance
    /// of it are dropped. No new stop is chosen, but the kept fuel stops must
    /// still carry the truck to the end of `route`.
    ///
    /// # Errors
    ///
    /// Returns [`InfeasibleFuelPlan`] when refuelling is required and the
    /// kept fuel stops leave a gap longer than the truck's range.
    pub fn reconcile(
        &self,
        route: &LineString<f64>,
        truck: &TruckProfile,
        routed: &StopPlan,
    ) -> Result<StopPlan, InfeasibleFuelPlan> {
        let method = self.config.distance_method;
        let tolerance = self.config.tolerance_meters;
        let route_length = polyline_length(route, method);

        let stations: Vec<FuelStation> =
            routed.fuel_stops.iter().map(|s| s.stop.clone()).collect();
        let fuel_stops = stations_along_route(route, &stations, tolerance, method);
        if self.needs_refuel(truck.fuel_capacity, route_length) {
            let positions: Vec<f64> = fuel_stops.iter().map(|m| m.position).collect();
            select_refuel_stops(
                &positions,
                route_length,
                self.effective_range(truck.fuel_capacity),
            )?;
        }

        let areas: Vec<RestArea> = routed.rest_stops.iter().map(|s| s.stop.clone()).collect();
        let rest_stops = stations_along_route(route, &areas, tolerance, method);

        Ok(StopPlan {
            fuel_stops,
            rest_stops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DistanceMethod;
    use crate::{Dimensions, Location};
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> PlannerConfig {
        PlannerConfig::default()
            .with_distance_method(DistanceMethod::Euclidean)
            .with_tolerance_meters(5.0)
            .with_fuel_range_coefficient(1.0)
    }

    #[fixture]
    fn route() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (500.0, 0.0)])
    }

    #[fixture]
    fn truck() -> TruckProfile {
        let mut truck = TruckProfile::new(
            Dimensions {
                height: 4.0,
                width: 2.5,
                length: 16.0,
            },
            40_000,
            Location::at(0.0, 0.0),
            Location::at(0.0, 500.0),
        );
        truck.fuel_capacity = 200;
        truck.fuel_stations = [0.0, 150.0, 310.0, 480.0]
            .into_iter()
            .zip(1..)
            .map(|(x, id)| FuelStation::new(id, Point::new(x, 1.0)))
            .collect();
        truck.rest_areas = vec![
            RestArea::new(20, Point::new(400.0, -2.0)),
            RestArea::new(21, Point::new(100.0, 2.0)),
            RestArea::new(22, Point::new(250.0, 40.0)),
        ];
        truck
    }

    #[rstest]
    fn selects_greedy_fuel_stops(config: PlannerConfig, route: LineString<f64>, truck: TruckProfile) {
        let plan = StopSelector::new(&config)
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("coverable");
        let ids: Vec<_> = plan.fuel_stops.iter().map(|s| s.stop.id).collect();
        assert_eq!(ids, [2, 3]);
        assert!(plan.rest_stops.is_empty());
    }

    #[rstest]
    fn no_fuel_stops_when_tank_suffices(
        config: PlannerConfig,
        route: LineString<f64>,
        mut truck: TruckProfile,
    ) {
        truck.fuel_capacity = 600;
        let plan = StopSelector::new(&config)
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("no refuel needed");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn infeasible_when_stations_too_sparse(
        config: PlannerConfig,
        route: LineString<f64>,
        mut truck: TruckProfile,
    ) {
        truck.fuel_stations = vec![
            FuelStation::new(1, Point::new(0.0, 0.0)),
            FuelStation::new(2, Point::new(450.0, 0.0)),
        ];
        let err = StopSelector::new(&config)
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect_err("gap too wide");
        assert_eq!(err.next_candidate, Some(450.0));
    }

    #[rstest]
    fn rest_areas_pass_through_when_over_hours(
        config: PlannerConfig,
        route: LineString<f64>,
        mut truck: TruckProfile,
    ) {
        truck.fuel_capacity = 600;
        truck.driver_hours_elapsed = 9;
        let plan = StopSelector::new(&config)
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("no refuel needed");
        let ids: Vec<_> = plan.rest_stops.iter().map(|s| s.stop.id).collect();
        assert_eq!(ids, [21, 20]);
    }

    #[rstest]
    fn waypoints_merge_in_route_order(
        config: PlannerConfig,
        route: LineString<f64>,
        mut truck: TruckProfile,
    ) {
        truck.driver_hours_elapsed = 9;
        let plan = StopSelector::new(&config)
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("coverable");
        let xs: Vec<_> = plan.waypoints().into_iter().map(Point::x).collect();
        assert_eq!(xs, [100.0, 150.0, 310.0, 400.0]);
    }

    #[rstest]
    fn reconcile_remeasures_stops_on_new_route(
        config: PlannerConfig,
        route: LineString<f64>,
        truck: TruckProfile,
    ) {
        let selector = StopSelector::new(&config);
        let selected = selector
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("coverable");
        let through_stops = LineString::from(vec![
            (0.0, 0.0),
            (150.0, 1.0),
            (310.0, 1.0),
            (500.0, 0.0),
        ]);

        let plan = selector
            .reconcile(&through_stops, &truck, &selected)
            .expect("still coverable");

        let ids: Vec<_> = plan.fuel_stops.iter().map(|s| s.stop.id).collect();
        assert_eq!(ids, [2, 3]);
        for stop in &plan.fuel_stops {
            assert!(stop.distance < 1e-9, "stop lies on the routed geometry");
        }
        let first = plan.fuel_stops.first().expect("first stop");
        assert!((first.position - 150.003_333).abs() < 1e-3);
    }

    #[rstest]
    fn reconcile_rejects_route_the_stops_cannot_cover(
        config: PlannerConfig,
        route: LineString<f64>,
        truck: TruckProfile,
    ) {
        let selector = StopSelector::new(&config);
        let selected = selector
            .select(&route, &truck, &StopCandidates::from_profile(&truck))
            .expect("coverable");
        // Leaves northwards for 300 units before turning back to the stops.
        let detour = LineString::from(vec![
            (0.0, 0.0),
            (0.0, 300.0),
            (150.0, 1.0),
            (310.0, 1.0),
            (500.0, 0.0),
        ]);

        let err = selector
            .reconcile(&detour, &truck, &selected)
            .expect_err("first stop is out of range");
        assert_eq!(err.reached, 0.0);
    }

    #[rstest]
    fn extend_skips_known_ids(truck: TruckProfile) {
        let mut candidates = StopCandidates::from_profile(&truck);
        candidates.extend(
            vec![
                FuelStation::new(1, Point::new(9.0, 9.0)),
                FuelStation::new(99, Point::new(9.0, 9.0)),
            ],
            Vec::new(),
        );
        assert_eq!(candidates.fuel_stations.len(), 5);
    }
}
