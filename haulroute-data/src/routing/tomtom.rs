//! TomTom Calculate Route API response types.
//!
//! Only the fields the engine consumes are modelled: the per-route summary
//! and the leg point lists. Unknown fields are ignored.
//!
//! See: <https://developer.tomtom.com/routing-api/documentation/tomtom-maps/calculate-route>

use serde::Deserialize;

/// Error code TomTom reports when no route satisfies the request.
pub const NO_ROUTE_FOUND: &str = "NO_ROUTE_FOUND";

/// Calculate Route response body.
///
/// Successful responses carry `routes`; failures carry `detailedError`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRouteResponse {
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Present when the service rejected the request.
    pub detailed_error: Option<DetailedError>,
}

/// Structured error returned by the service.
#[derive(Debug, Deserialize)]
pub struct DetailedError {
    /// Machine-readable code such as `NO_ROUTE_FOUND`.
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
}

impl DetailedError {
    /// Whether the error means the service found no route.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == NO_ROUTE_FOUND
    }
}

/// One candidate route.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Totals for the whole route.
    pub summary: Summary,
    /// Legs between consecutive locations.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Route totals.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Length in metres.
    #[serde(default)]
    pub length_in_meters: f64,
    /// Travel time in seconds.
    #[serde(default)]
    pub travel_time_in_seconds: f64,
    /// Delay caused by traffic in seconds.
    #[serde(default)]
    pub traffic_delay_in_seconds: f64,
}

/// A leg between two consecutive locations.
#[derive(Debug, Deserialize)]
pub struct Leg {
    /// Leg polyline.
    #[serde(default)]
    pub points: Vec<LatLon>,
}

/// A WGS84 coordinate as TomTom spells it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "formatVersion": "0.0.12",
            "routes": [{
                "summary": {
                    "lengthInMeters": 1200,
                    "travelTimeInSeconds": 95,
                    "trafficDelayInSeconds": 10,
                    "departureTime": "2025-01-01T10:00:00+01:00"
                },
                "legs": [{
                    "summary": { "lengthInMeters": 1200 },
                    "points": [
                        { "latitude": 52.5, "longitude": 13.4 },
                        { "latitude": 52.51, "longitude": 13.41 }
                    ]
                }]
            }]
        }"#;

        let response: CalculateRouteResponse =
            serde_json::from_str(json).expect("should deserialise");

        assert!(response.detailed_error.is_none());
        let route = response.routes.first().expect("one route");
        assert_eq!(route.summary.length_in_meters, 1200.0);
        assert_eq!(route.summary.traffic_delay_in_seconds, 10.0);
        let leg = route.legs.first().expect("one leg");
        assert_eq!(leg.points.len(), 2);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "formatVersion": "0.0.12",
            "detailedError": {
                "code": "NO_ROUTE_FOUND",
                "message": "Unable to find a route"
            }
        }"#;

        let response: CalculateRouteResponse =
            serde_json::from_str(json).expect("should deserialise");

        assert!(response.routes.is_empty());
        let error = response.detailed_error.expect("error present");
        assert!(error.is_no_route());
        assert_eq!(error.message, "Unable to find a route");
    }
}
