//! Routing service adapters for the haulroute engine.
//!
//! The core crate only knows the [`RouteBackend`](haulroute_core::RouteBackend)
//! trait. This crate provides the HTTP implementation that talks to the
//! TomTom Calculate Route API.
#![forbid(unsafe_code)]

pub mod routing;

pub use routing::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRouteBackend, HttpRouteBackendConfig,
    ProviderBuildError,
};
