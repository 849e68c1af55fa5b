#![expect(
    clippy::expect_used,
    reason = "scenarios should fail fast when a step breaks"
)]

//! Behavioural tests for the route planner state machine.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use geo::Point;
use haulroute_core::request::{AVOID, WAYPOINT};
use haulroute_core::test_support::{ScriptedBackend, sample_truck};
use haulroute_core::{
    BackendError, DistanceMethod, FuelStation, Location, PlanError, PlanOutcome, Planner,
    PlannerConfig, RouteRequest, TruckProfile,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// World state for planner scenarios.
#[derive(Debug, Default)]
struct PlannerWorld {
    truck: RefCell<Option<TruckProfile>>,
    config: RefCell<PlannerConfig>,
    backend: RefCell<Option<ScriptedBackend>>,
    cancel: AtomicBool,
    result: RefCell<Option<Result<PlanOutcome, PlanError>>>,
    requests: RefCell<Vec<RouteRequest>>,
}

impl PlannerWorld {
    fn result(&self) -> Result<PlanOutcome, PlanError> {
        self.result
            .borrow()
            .clone()
            .expect("the route should have been planned")
    }

    fn planned(&self) -> haulroute_core::RoutePlan {
        match self.result() {
            Ok(PlanOutcome::Planned(plan)) => plan,
            other => panic!("expected a route plan, got {other:?}"),
        }
    }
}

/// Truck driving five degrees east along the equator, planned in degrees.
fn equator_truck(stations: &[f64]) -> TruckProfile {
    let mut truck = sample_truck();
    truck.current_location = Location::at(0.0, 0.0);
    truck.destination = Location::at(0.0, 5.0);
    truck.fuel_capacity = 2;
    truck.fuel_stations = stations
        .iter()
        .zip(1_u64..)
        .map(|(&lon, id)| FuelStation::new(id, Point::new(lon, 0.01)))
        .collect();
    truck
}

fn degree_config() -> PlannerConfig {
    PlannerConfig::default()
        .with_distance_method(DistanceMethod::Euclidean)
        .with_tolerance_meters(0.05)
        .with_fuel_range_coefficient(1.05)
}

#[fixture]
fn world() -> PlannerWorld {
    PlannerWorld::default()
}

#[given("a hazmat truck with a blank toll system declaring ferries")]
fn given_hazmat_truck(world: &PlannerWorld) {
    let mut truck = sample_truck();
    truck.hazmat = true;
    truck.toll_system = Some(String::new());
    truck.route_restrictions = vec!["ferries".to_owned()];
    world.truck.replace(Some(truck));
}

#[given("a standard truck")]
fn given_standard_truck(world: &PlannerWorld) {
    world.truck.replace(Some(sample_truck()));
}

#[given("a truck with a small tank and stations along the route")]
fn given_small_tank(world: &PlannerWorld) {
    world.truck.replace(Some(equator_truck(&[0.5, 1.5, 3.0, 4.5])));
    world.config.replace(degree_config());
}

#[given("a truck with a small tank and sparse stations")]
fn given_sparse_stations(world: &PlannerWorld) {
    world.truck.replace(Some(equator_truck(&[0.5, 4.5])));
    world.config.replace(degree_config());
}

#[given("a backend that answers with a straight route")]
fn given_straight_backend(world: &PlannerWorld) {
    world.backend.replace(Some(ScriptedBackend::default()));
}

#[given("a backend that finds no route")]
fn given_empty_backend(world: &PlannerWorld) {
    world
        .backend
        .replace(Some(ScriptedBackend::default().then_no_route()));
}

#[given("a backend that times out")]
fn given_timeout_backend(world: &PlannerWorld) {
    world
        .backend
        .replace(Some(ScriptedBackend::default().then_error(BackendError::Timeout {
            url: "http://routing.test".to_owned(),
            timeout_secs: 30,
        })));
}

#[given("a backend that is unreachable")]
fn given_unreachable_backend(world: &PlannerWorld) {
    world
        .backend
        .replace(Some(ScriptedBackend::default().then_error(BackendError::Network {
            url: "http://routing.test".to_owned(),
            message: "connection refused".to_owned(),
        })));
}

#[given("the request has been cancelled")]
fn given_cancelled(world: &PlannerWorld) {
    world.cancel.store(true, Ordering::Release);
}

#[when("the route is planned")]
fn when_planned(world: &PlannerWorld) {
    let backend = world
        .backend
        .borrow_mut()
        .take()
        .expect("backend should be configured");
    let planner = Planner::new(backend, world.config.borrow().clone());
    let truck = world.truck.borrow();
    let result = planner.plan(truck.as_ref().expect("truck should be set"), &world.cancel);
    world.requests.replace(planner.backend().requests());
    world.result.replace(Some(result));
}

#[then("a route plan is returned")]
fn then_plan_returned(world: &PlannerWorld) {
    let plan = world.planned();
    assert!(plan.geometry.0.len() >= 2);
}

#[then("the base request avoids exactly tunnels, toll roads and ferries")]
fn then_base_avoidances(world: &PlannerWorld) {
    let requests = world.requests.borrow();
    let base = requests.first().expect("a base request should be sent");
    let avoid: Vec<_> = base.values(AVOID).collect();
    assert_eq!(avoid, ["Tunnels", "TollRoads", "Ferries"]);
}

#[then("no waypoint was requested")]
fn then_no_waypoint(world: &PlannerWorld) {
    assert!(
        world
            .requests
            .borrow()
            .iter()
            .all(|request| request.values(WAYPOINT).next().is_none())
    );
}

#[then("the backend was called once")]
fn then_called_once(world: &PlannerWorld) {
    assert_eq!(world.requests.borrow().len(), 1);
}

#[then("the backend was called twice")]
fn then_called_twice(world: &PlannerWorld) {
    assert_eq!(world.requests.borrow().len(), 2);
    assert_eq!(world.planned().backend_calls, 2);
}

#[then("the backend was not called")]
fn then_not_called(world: &PlannerWorld) {
    assert!(world.requests.borrow().is_empty());
}

#[then("the plan contains two fuel stops")]
fn then_two_fuel_stops(world: &PlannerWorld) {
    let ids: Vec<_> = world
        .planned()
        .stops
        .fuel_stops
        .iter()
        .map(|stop| stop.stop.id)
        .collect();
    assert_eq!(ids, [2, 3]);
}

#[then("the second request carries both fuel stops as waypoints")]
fn then_waypoints_sent(world: &PlannerWorld) {
    let requests = world.requests.borrow();
    let refined = requests.get(1).expect("a second request should be sent");
    let waypoints: Vec<_> = refined.values(WAYPOINT).collect();
    assert_eq!(waypoints, ["0.01,1.5", "0.01,3"]);
}

#[then("no route is found")]
fn then_no_route(world: &PlannerWorld) {
    let outcome = world.result().expect("an empty answer is not an error");
    assert!(matches!(outcome, PlanOutcome::NoRouteFound { .. }));
    assert!(outcome.route_plan().is_none());
}

#[then("planning fails with a backend timeout")]
fn then_timeout(world: &PlannerWorld) {
    assert!(matches!(
        world.result(),
        Err(PlanError::BackendTimeout { .. })
    ));
}

#[then("planning fails with the backend unavailable")]
fn then_unavailable(world: &PlannerWorld) {
    assert!(matches!(
        world.result(),
        Err(PlanError::BackendUnavailable { .. })
    ));
}

#[then("planning fails with an infeasible fuel plan")]
fn then_infeasible(world: &PlannerWorld) {
    assert!(matches!(world.result(), Err(PlanError::InfeasibleFuelPlan(_))));
}

#[then("planning is cancelled")]
fn then_cancelled(world: &PlannerWorld) {
    assert_eq!(world.result(), Err(PlanError::Cancelled { stage: "Init" }));
}

#[scenario(path = "tests/features/route_planner.feature", index = 0)]
fn trip_within_range(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 1)]
fn refuelling_re_request(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 2)]
fn no_route_found(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 3)]
fn backend_timeout(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 4)]
fn backend_unreachable(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 5)]
fn infeasible_fuel(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 6)]
fn cancelled_request(world: PlannerWorld) {
    let _ = world;
}
