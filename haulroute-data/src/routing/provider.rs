//! HTTP-based `RouteBackend` using TomTom's Calculate Route API.
//!
//! This module provides [`HttpRouteBackend`], an implementation of the
//! [`RouteBackend`] trait that fetches truck routes from the TomTom routing
//! service via HTTP.
//!
//! # Architecture
//!
//! The [`RouteBackend`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This backend bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Request mapping
//!
//! | Engine parameter | TomTom parameter                         |
//! |------------------|------------------------------------------|
//! | `maxHeight`      | `vehicleHeight`                          |
//! | `maxWidth`       | `vehicleWidth`                           |
//! | `maxLength`      | `vehicleLength`                          |
//! | `maxWeight`      | `vehicleWeight`                          |
//! | `routeType`      | `routeType`                              |
//! | `avoid`          | `avoid` (`tunnels`, `tollRoads`, ...)    |
//! | `waypoint`       | inserted into the location path          |
//! | `axleWeight`     | `vehicleAxleWeight` (heaviest axle)      |
//!
//! TomTom has no named-zone parameters, so `avoidZone` and `monitorZone`
//! are logged at debug level and dropped.

use std::fmt;
use std::time::Duration;

use geo::{Coord, LineString};
use haulroute_core::request::{
    AVOID, AXLE_WEIGHT, MAX_HEIGHT, MAX_LENGTH, MAX_WEIGHT, MAX_WIDTH, ROUTE_TYPE, WAYPOINT,
};
use haulroute_core::{BackendError, BackendRoute, RouteBackend, RouteRequest, RouteSummary};
use log::debug;
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::tomtom::{CalculateRouteResponse, Leg};

/// Error type for [`HttpRouteBackend`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// The base URL could not be parsed.
    InvalidBaseUrl {
        /// The rejected URL.
        base_url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The base URL cannot carry a path (for example `mailto:`).
    UnsupportedBaseUrl {
        /// The rejected URL.
        base_url: String,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { base_url, source } => {
                write!(f, "invalid routing base URL {base_url:?}: {source}")
            }
            Self::UnsupportedBaseUrl { base_url } => {
                write!(f, "routing base URL {base_url:?} cannot carry a path")
            }
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::UnsupportedBaseUrl { .. } => None,
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "haulroute-routing/0.1";

/// Default TomTom API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com";

/// Default connect timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpRouteBackend`].
#[derive(Clone)]
pub struct HttpRouteBackendConfig {
    /// Base URL for the routing service (e.g., `"https://api.tomtom.com"`).
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Connect timeout. Each call also receives the planner's timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for HttpRouteBackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouteBackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpRouteBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRouteBackendConfig {
    /// Create a new configuration with the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based route backend using the TomTom Calculate Route API.
///
/// This backend implements the synchronous [`RouteBackend`] trait by
/// internally blocking on asynchronous HTTP requests. It owns a Tokio runtime
/// that is reused across calls, and the underlying [`Client`] pools
/// connections, so one backend can be shared by a planner serving many
/// concurrent requests.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the backend uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the backend
/// falls back to using its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may lead to deadlocks if the caller's
/// runtime is driving IO or timers that this request depends on.
pub struct HttpRouteBackend {
    client: Client,
    config: HttpRouteBackendConfig,
    base: Url,
    runtime: Runtime,
}

impl fmt::Debug for HttpRouteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouteBackend")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpRouteBackend {
    /// Create a backend for the default TomTom endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteBackendConfig::new(DEFAULT_BASE_URL, api_key))
    }

    /// Create a backend with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpRouteBackendConfig) -> Result<Self, ProviderBuildError> {
        let base =
            Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                base_url: config.base_url.clone(),
                source,
            })?;
        if base.cannot_be_a_base() {
            return Err(ProviderBuildError::UnsupportedBaseUrl {
                base_url: config.base_url.clone(),
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HttpRouteBackendConfig {
        &self.config
    }

    /// Build the Calculate Route URL for `request`.
    ///
    /// The URL format is
    /// `{base_url}/routing/1/calculateRoute/{locations}/json?key=...`
    /// where locations are colon-separated `lat,lon` pairs running from the
    /// origin through each waypoint to the destination.
    fn build_route_url(&self, request: &RouteRequest) -> Url {
        let locations = route_locations(request);
        let mut url = self.base.clone();
        // `with_config` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "routing",
                "1",
                "calculateRoute",
                locations.as_str(),
                "json",
            ]);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.config.api_key);
            query.append_pair("travelMode", "truck");
            for (name, value) in query_params(request) {
                query.append_pair(name, &value);
            }
        }
        url
    }

    /// Fetch the route asynchronously.
    async fn fetch_route_async(
        &self,
        request: &RouteRequest,
        timeout: Duration,
    ) -> Result<Option<BackendRoute>, BackendError> {
        let url = self.build_route_url(request);
        let endpoint = redact(&url);
        debug!("requesting truck route from {endpoint}");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &endpoint, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return convert_error_body(&endpoint, status.as_u16(), &body);
        }

        let body: CalculateRouteResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                convert_reqwest_error(err, &endpoint, timeout)
            } else {
                BackendError::Parse {
                    message: err.without_url().to_string(),
                }
            }
        })?;

        convert_response(body)
    }
}

impl RouteBackend for HttpRouteBackend {
    /// Fetch the first route TomTom proposes for `request`.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`). If called from within a
    /// `current_thread` runtime, the method falls back to using its own
    /// internal runtime, which may block the caller's runtime.
    fn fetch_route(
        &self,
        request: &RouteRequest,
        timeout: Duration,
    ) -> Result<Option<BackendRoute>, BackendError> {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        let future = self.fetch_route_async(request, timeout);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Colon-separated `lat,lon` locations: origin, waypoints, destination.
fn route_locations(request: &RouteRequest) -> String {
    let origin = format!("{},{}", request.origin.latitude, request.origin.longitude);
    let destination = format!(
        "{},{}",
        request.destination.latitude, request.destination.longitude
    );
    std::iter::once(origin)
        .chain(request.values(WAYPOINT).map(str::to_owned))
        .chain(std::iter::once(destination))
        .collect::<Vec<_>>()
        .join(":")
}

/// Map engine parameters onto TomTom query parameters, in request order.
fn query_params(request: &RouteRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(request.params.len());
    for param in &request.params {
        let value = param.value.as_str();
        match param.key {
            MAX_HEIGHT => params.push(("vehicleHeight", value.to_owned())),
            MAX_WIDTH => params.push(("vehicleWidth", value.to_owned())),
            MAX_LENGTH => params.push(("vehicleLength", value.to_owned())),
            MAX_WEIGHT => params.push(("vehicleWeight", value.to_owned())),
            ROUTE_TYPE => params.push(("routeType", value.to_owned())),
            AVOID => match tomtom_avoidance(value) {
                Some(avoid) => params.push(("avoid", avoid.to_owned())),
                None => debug!("unsupported avoidance {value}; dropped"),
            },
            AXLE_WEIGHT => {
                if let Some(heaviest) = heaviest_axle(value) {
                    params.push(("vehicleAxleWeight", heaviest.to_string()));
                }
            }
            // Waypoints travel in the location path.
            WAYPOINT => {}
            other => debug!("no TomTom equivalent for {other}={value}; dropped"),
        }
    }
    params
}

fn tomtom_avoidance(value: &str) -> Option<&'static str> {
    match value {
        "Tunnels" => Some("tunnels"),
        "TollRoads" => Some("tollRoads"),
        "Motorways" => Some("motorways"),
        "Ferries" => Some("ferries"),
        _ => None,
    }
}

fn heaviest_axle(value: &str) -> Option<u32> {
    value
        .split(',')
        .filter_map(|weight| weight.trim().parse::<u32>().ok())
        .max()
}

/// The URL without its query string, so the API key never reaches logs.
fn redact(url: &Url) -> String {
    let mut endpoint = url.clone();
    endpoint.set_query(None);
    endpoint.into()
}

/// Seconds in `timeout`, rounded up so sub-second limits never read as zero.
fn whole_seconds(timeout: Duration) -> u64 {
    timeout
        .as_secs()
        .saturating_add(u64::from(timeout.subsec_nanos() > 0))
}

/// Convert a reqwest error to a `BackendError`.
///
/// The request URL is stripped from the message because it carries the key.
fn convert_reqwest_error(error: reqwest::Error, url: &str, timeout: Duration) -> BackendError {
    let error = error.without_url();
    if error.is_timeout() {
        return BackendError::Timeout {
            url: url.to_owned(),
            timeout_secs: whole_seconds(timeout),
        };
    }

    if let Some(status) = error.status() {
        return BackendError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    BackendError::Network {
        url: url.to_owned(),
        message: error_chain(&error),
    }
}

/// Render an error with its sources so connection failures stay readable.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Interpret a non-success HTTP response.
///
/// TomTom reports "no route" as a client error carrying a
/// `NO_ROUTE_FOUND` detailed error; that is an empty answer, not a failure.
fn convert_error_body(
    url: &str,
    status: u16,
    body: &str,
) -> Result<Option<BackendRoute>, BackendError> {
    let detailed = serde_json::from_str::<CalculateRouteResponse>(body)
        .ok()
        .and_then(|response| response.detailed_error);
    match detailed {
        Some(error) if error.is_no_route() => Ok(None),
        Some(error) => Err(BackendError::Http {
            url: url.to_owned(),
            status,
            message: format!("{}: {}", error.code, error.message),
        }),
        None => Err(BackendError::Http {
            url: url.to_owned(),
            status,
            message: body.trim().to_owned(),
        }),
    }
}

/// Convert a TomTom response to the first backend route.
fn convert_response(
    response: CalculateRouteResponse,
) -> Result<Option<BackendRoute>, BackendError> {
    if let Some(error) = response.detailed_error {
        if error.is_no_route() {
            return Ok(None);
        }
        return Err(BackendError::Service {
            code: error.code,
            message: error.message,
        });
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Ok(None);
    };

    let geometry = route_geometry(&route.legs);
    if geometry.0.len() < 2 {
        return Err(BackendError::Parse {
            message: "route geometry has fewer than two points".to_owned(),
        });
    }

    Ok(Some(BackendRoute {
        geometry,
        summary: RouteSummary {
            length_meters: route.summary.length_in_meters,
            travel_time_seconds: route.summary.travel_time_in_seconds,
            traffic_delay_seconds: route.summary.traffic_delay_in_seconds,
        },
    }))
}

/// Concatenate leg polylines, dropping the point shared by adjacent legs.
fn route_geometry(legs: &[Leg]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = legs
        .iter()
        .flat_map(|leg| leg.points.iter())
        .map(|point| Coord {
            x: point.longitude,
            y: point.latitude,
        })
        .collect();
    coords.dedup();
    LineString::new(coords)
}
