//! Core library for the `vane` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location source, geocoding and weather gateways
//! - The orchestrator that turns their events into one view-state
//! - Temperature palettes for the presentation layer
//!
//! It is used by `vane-cli`, but any front end can drive an
//! [`OrchestratorHandle`] and render the [`OrchestratorState`] it publishes.

pub mod config;
pub mod error;
pub mod gradient;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;

pub use config::Config;
pub use error::{GeocodeError, LocationError, OrchestratorError, WeatherError};
pub use gradient::{Palette, Rgb};
pub use location::{LocationBackend, LocationEvent, LocationSource, StaticBackend};
pub use model::{AuthorizationState, CityRef, Coordinates, WeatherSnapshot};
pub use orchestrator::{OrchestratorHandle, OrchestratorState, Phase};
pub use provider::{GeocodeGateway, Gateways, WeatherGateway, gateways_from_config};
