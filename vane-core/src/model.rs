use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position fix reported by the location backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A city as the weather provider knows it.
///
/// `name` is used verbatim as the weather lookup key. `country` is only
/// filled in for search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRef {
    pub name: String,
    pub country: Option<String>,
}

impl CityRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), country: None }
    }

    pub fn with_country(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: Some(country.into()) }
    }

    /// "Paris, France" for search results, just the name otherwise.
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

/// Current conditions for one city. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub temp_min_c: i32,
    pub temp_max_c: i32,
    pub humidity_pct: i32,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

/// OS-level location permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationState {
    Undetermined,
    /// Denied by the user or restricted by policy.
    Denied,
    Authorized,
}
