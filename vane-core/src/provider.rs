use crate::{
    Config,
    error::{GeocodeError, WeatherError},
    model::{CityRef, Coordinates, WeatherSnapshot},
    provider::{geonames::GeonamesGateway, openweather::OpenWeatherGateway},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod geonames;
pub mod openweather;

/// Default number of candidates requested from city search.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Coordinates to city name, and city name prefix to candidates.
#[async_trait]
pub trait GeocodeGateway: Send + Sync + Debug {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<CityRef, GeocodeError>;

    async fn search_cities(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CityRef>, GeocodeError>;
}

/// Current conditions by city name.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch_current(&self, city_name: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// The pair of gateways the orchestrator drives.
#[derive(Debug, Clone)]
pub struct Gateways {
    pub geocode: Arc<dyn GeocodeGateway>,
    pub weather: Arc<dyn WeatherGateway>,
}

impl Gateways {
    pub fn new(geocode: Arc<dyn GeocodeGateway>, weather: Arc<dyn WeatherGateway>) -> Self {
        Self { geocode, weather }
    }
}

/// Construct the GeoNames and OpenWeather gateways from config.
///
/// Credentials are resolved once here and injected; nothing below reads
/// the environment.
pub fn gateways_from_config(config: &Config) -> Gateways {
    let geocode = GeonamesGateway::with_base_url(
        config.geonames.base_url.clone(),
        config.geonames.username.clone(),
    );
    let weather =
        OpenWeatherGateway::with_base_url(config.weather.base_url.clone(), config.weather_api_key());

    if config.geonames.username.is_empty() {
        tracing::warn!("No GeoNames username configured; geocoding requests will be rejected");
    }

    Gateways::new(Arc::new(geocode), Arc::new(weather))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
