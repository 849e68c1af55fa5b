//! Focused unit tests covering plan CLI configuration and input loading.

use super::helpers::{temp_root, write_profile, write_utf8};
use super::*;
use crate::plan::{PlanConfig, config_from_layers_for_test, load_catalog, load_truck_profile};
use camino::Utf8PathBuf;
use geo::Point;
use haulroute_core::test_support::sample_truck;
use haulroute_core::{DistanceMethod, FuelStation, PlannerConfig, RestArea};
use rstest::rstest;
use std::time::Duration;

fn args_with_profile(profile: &str) -> PlanArgs {
    PlanArgs {
        profile_path: Some(profile.into()),
        api_key: Some("test-key".to_owned()),
        ..PlanArgs::default()
    }
}

#[rstest]
fn converting_plan_without_profile_errors() {
    let args = PlanArgs {
        api_key: Some("test-key".to_owned()),
        ..PlanArgs::default()
    };

    let err = PlanConfig::try_from(args).expect_err("missing profile should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_PROFILE);
            assert_eq!(env, ENV_PLAN_PROFILE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::absent(None)]
#[case::blank(Some("   "))]
fn converting_plan_without_api_key_errors(#[case] key: Option<&str>) {
    let args = PlanArgs {
        profile_path: Some("truck.json".into()),
        api_key: key.map(str::to_owned),
        ..PlanArgs::default()
    };

    let err = PlanConfig::try_from(args).expect_err("missing key should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_API_KEY);
            assert_eq!(env, ENV_PLAN_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_uses_defaults_when_unset() {
    let config = PlanConfig::try_from(args_with_profile("truck.json")).expect("config");

    assert_eq!(config.profile_path, Utf8PathBuf::from("truck.json"));
    assert_eq!(config.base_url, haulroute_data::DEFAULT_BASE_URL);
    assert_eq!(config.api_key, "test-key");
    assert!(config.catalog.is_none());
    assert_eq!(config.planner, PlannerConfig::default());
}

#[rstest]
fn plan_config_applies_planner_overrides() {
    let args = PlanArgs {
        tolerance_meters: Some(250.0),
        fuel_range_coefficient: Some(2_500.0),
        max_re_requests: Some(3),
        rest_hours_threshold: Some(6),
        distance_method: Some("Euclidean".to_owned()),
        timeout_secs: Some(5),
        base_url: Some("http://localhost:8080".to_owned()),
        ..args_with_profile("truck.json")
    };

    let config = PlanConfig::try_from(args).expect("config");

    let expected = PlannerConfig::default()
        .with_tolerance_meters(250.0)
        .with_fuel_range_coefficient(2_500.0)
        .with_max_re_requests(3)
        .with_rest_hours_threshold(6)
        .with_distance_method(DistanceMethod::Euclidean)
        .with_backend_timeout(Duration::from_secs(5));
    assert_eq!(config.planner, expected);
    assert_eq!(config.base_url, "http://localhost:8080");
}

#[rstest]
fn plan_config_rejects_unknown_distance_method() {
    let args = PlanArgs {
        distance_method: Some("manhattan".to_owned()),
        ..args_with_profile("truck.json")
    };

    let err = PlanConfig::try_from(args).expect_err("unknown metric should error");
    match err {
        CliError::InvalidArgument { field, value, .. } => {
            assert_eq!(field, ARG_PLAN_DISTANCE_METHOD);
            assert_eq!(value, "manhattan");
        }
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
#[case::zero_tolerance(Some(0.0), None, ARG_PLAN_TOLERANCE)]
#[case::negative_tolerance(Some(-5.0), None, ARG_PLAN_TOLERANCE)]
#[case::nan_coefficient(None, Some(f64::NAN), ARG_PLAN_FUEL_COEFFICIENT)]
fn plan_config_rejects_non_positive_numbers(
    #[case] tolerance: Option<f64>,
    #[case] coefficient: Option<f64>,
    #[case] expected_field: &'static str,
) {
    let args = PlanArgs {
        tolerance_meters: tolerance,
        fuel_range_coefficient: coefficient,
        ..args_with_profile("truck.json")
    };

    let err = PlanConfig::try_from(args).expect_err("value should be rejected");
    match err {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_rejects_zero_timeout() {
    let args = PlanArgs {
        timeout_secs: Some(0),
        ..args_with_profile("truck.json")
    };

    let err = PlanConfig::try_from(args).expect_err("zero timeout should be rejected");
    match err {
        CliError::InvalidArgument { field, value, .. } => {
            assert_eq!(field, ARG_PLAN_TIMEOUT);
            assert_eq!(value, "0");
        }
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
#[case::missing_profile(ARG_PLAN_PROFILE, false, true)]
#[case::missing_catalog(ARG_PLAN_CATALOG, true, false)]
fn validate_sources_reports_missing_inputs(
    #[case] expected_field: &'static str,
    #[case] write_profile_file: bool,
    #[case] write_catalog_file: bool,
) {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");
    let catalog_path = root.join("stops.json");
    if write_profile_file {
        write_utf8(&profile_path, b"{}");
    }
    if write_catalog_file {
        write_utf8(&catalog_path, b"{}");
    }

    let config = PlanConfig {
        profile_path,
        catalog: Some(catalog_path),
        base_url: haulroute_data::DEFAULT_BASE_URL.to_owned(),
        api_key: "test-key".to_owned(),
        planner: PlannerConfig::default(),
    };

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");
    std::fs::create_dir(&profile_path).expect("profile directory");

    let config = PlanConfig {
        profile_path: profile_path.clone(),
        catalog: None,
        base_url: haulroute_data::DEFAULT_BASE_URL.to_owned(),
        api_key: "test-key".to_owned(),
        planner: PlannerConfig::default(),
    };

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_PLAN_PROFILE);
            assert_eq!(path, profile_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_truck_profile_decodes_json() {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");
    let truck = sample_truck();
    write_profile(&profile_path, &truck);

    let decoded = load_truck_profile(&profile_path).expect("profile should decode");
    assert_eq!(decoded, truck);
}

#[rstest]
fn load_truck_profile_fills_missing_fields_with_defaults() {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");
    write_utf8(
        &profile_path,
        br#"{
            "weight": 18000,
            "current_location": { "latitude": 52.5, "longitude": 13.4 },
            "destination": { "latitude": 52.4, "longitude": 13.1 }
        }"#,
    );

    let decoded = load_truck_profile(&profile_path).expect("profile should decode");
    assert_eq!(decoded.weight, 18_000);
    assert!(decoded.fuel_stations.is_empty());
    assert!(decoded.toll_system.is_none());
    assert!(decoded.validate().is_ok());
}

#[rstest]
fn load_truck_profile_rejects_invalid_json() {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");
    write_utf8(&profile_path, b"{ not valid json");

    let err = load_truck_profile(&profile_path).expect_err("invalid json should error");
    match err {
        CliError::ParseInput { field, path, .. } => {
            assert_eq!(field, ARG_PLAN_PROFILE);
            assert_eq!(path, profile_path);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_truck_profile_io_error_returns_open_error() {
    let (_tmp, root) = temp_root();
    let profile_path = root.join("truck.json");

    let err = load_truck_profile(&profile_path).expect_err("missing profile should error");
    match err {
        CliError::OpenInput { path, .. } => assert_eq!(path, profile_path),
        other => panic!("expected OpenInput, found {other:?}"),
    }
}

#[rstest]
fn load_catalog_decodes_stations_and_rest_areas() {
    use serde_json::json;

    let (_tmp, root) = temp_root();
    let catalog_path = root.join("stops.json");
    let station = FuelStation::new(11, Point::new(12.9, 50.8));
    let rest_area = RestArea::new(21, Point::new(11.9, 49.4));
    let payload = json!({
        "fuel_stations": [station],
        "rest_areas": [rest_area],
    });
    write_utf8(&catalog_path, payload.to_string().as_bytes());

    let catalog = load_catalog(&catalog_path).expect("catalog should decode");
    assert_eq!(catalog.fuel_stations, vec![station]);
    assert_eq!(catalog.rest_areas, vec![rest_area]);
}

#[rstest]
fn load_catalog_accepts_partial_files() {
    let (_tmp, root) = temp_root();
    let catalog_path = root.join("stops.json");
    write_utf8(&catalog_path, b"{}");

    let catalog = load_catalog(&catalog_path).expect("empty catalog should decode");
    assert!(catalog.fuel_stations.is_empty());
    assert!(catalog.rest_areas.is_empty());
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "max_re_requests": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "api_key": "from-file",
            "tolerance_meters": 500.0,
            "base_url": "http://from-file:8080",
        }),
        None,
    );
    composer.push_environment(json!({
        "profile_path": "from-env.json",
        "api_key": "from-env",
    }));
    composer.push_cli(json!({
        "distance_method": "euclidean",
        "base_url": "http://from-cli:8080",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.profile_path, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.base_url, "http://from-cli:8080");
    assert_eq!(config.planner.tolerance_meters, 500.0);
    assert_eq!(config.planner.distance_method, DistanceMethod::Euclidean);
}
