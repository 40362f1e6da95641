use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    config::DEFAULT_WEATHER_BASE_URL,
    error::WeatherError,
    model::WeatherSnapshot,
    provider::truncate_body,
};

use super::WeatherGateway;

/// Shown when the provider does not describe the conditions.
pub const FALLBACK_DESCRIPTION: &str = "Sunny";

#[derive(Clone)]
pub struct OpenWeatherGateway {
    base_url: String,
    api_key: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherGateway {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(DEFAULT_WEATHER_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key, http: Client::new() }
    }

    fn current_url(&self, city_name: &str) -> Result<Url, WeatherError> {
        let endpoint = format!("{}/weather", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[("q", city_name), ("appid", self.api_key.as_str()), ("units", "metric")],
        )
        .map_err(|e| WeatherError::InvalidRequest(format!("{endpoint}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    dt: Option<i64>,
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn fetch_current(&self, city_name: &str) -> Result<WeatherSnapshot, WeatherError> {
        let url = self.current_url(city_name)?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(WeatherError::Transport(format!(
                "status {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Decode(e.to_string()))?;

        let snapshot = snapshot_from_response(parsed);
        tracing::debug!(
            city = city_name,
            temperature_c = snapshot.temperature_c,
            "Fetched current weather"
        );
        Ok(snapshot)
    }
}

fn snapshot_from_response(parsed: OwCurrentResponse) -> WeatherSnapshot {
    let description = parsed
        .weather
        .first()
        .and_then(|w| w.description.as_deref())
        .filter(|d| !d.trim().is_empty())
        .map(title_case)
        .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

    let observed_at =
        parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)).unwrap_or_else(Utc::now);

    WeatherSnapshot {
        temperature_c: truncate_celsius(parsed.main.temp),
        feels_like_c: truncate_celsius(parsed.main.feels_like),
        temp_min_c: truncate_celsius(parsed.main.temp_min),
        temp_max_c: truncate_celsius(parsed.main.temp_max),
        humidity_pct: parsed.main.humidity,
        description,
        observed_at,
    }
}

/// Drop the fractional part, rounding toward zero.
pub fn truncate_celsius(value: f64) -> i32 {
    value.trunc() as i32
}

/// "light rain" -> "Light Rain".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
