use serde::Serialize;

use crate::{gradient::Palette, model::WeatherSnapshot};

/// City name shown until a location or a manual choice resolves one.
pub const FETCHING_LOCATION: &str = "Fetching location...";

pub const PLACEHOLDER_TEMPERATURE: &str = "--°C";
pub const PLACEHOLDER_PERCENT: &str = "--%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    AwaitingLocation,
    ResolvingCity,
    FetchingWeather,
    Ready,
    LocationError,
    WeatherError,
}

/// Everything the presentation layer renders.
///
/// `weather` and `weather_error` are never both set, and `is_loading` is
/// only true while a weather fetch is outstanding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorState {
    pub city_name: String,
    pub weather: Option<WeatherSnapshot>,
    pub location_error: Option<String>,
    pub weather_error: Option<String>,
    pub is_loading: bool,
    pub phase: Phase,
    pub palette: Option<Palette>,
}

impl Default for OrchestratorState {
    fn default() -> Self {
        Self {
            city_name: FETCHING_LOCATION.to_string(),
            weather: None,
            location_error: None,
            weather_error: None,
            is_loading: false,
            phase: Phase::AwaitingLocation,
            palette: None,
        }
    }
}

impl OrchestratorState {
    pub fn has_city(&self) -> bool {
        self.city_name != FETCHING_LOCATION
    }

    /// True once nothing is in flight and the state will not change
    /// without an external trigger.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::LocationError | Phase::WeatherError)
            && !self.is_loading
    }

    /// The message that replaces the main view, if any. Location errors
    /// win over weather errors.
    pub fn blocking_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn temperature_label(&self) -> String {
        self.celsius(|w| w.temperature_c)
    }

    pub fn feels_like_label(&self) -> String {
        self.celsius(|w| w.feels_like_c)
    }

    pub fn temp_min_label(&self) -> String {
        self.celsius(|w| w.temp_min_c)
    }

    pub fn temp_max_label(&self) -> String {
        self.celsius(|w| w.temp_max_c)
    }

    pub fn humidity_label(&self) -> String {
        match &self.weather {
            Some(w) => format!("{}%", w.humidity_pct),
            None => PLACEHOLDER_PERCENT.to_string(),
        }
    }

    pub fn description_label(&self) -> &str {
        self.weather.as_ref().map(|w| w.description.as_str()).unwrap_or("")
    }

    fn celsius(&self, field: impl Fn(&WeatherSnapshot) -> i32) -> String {
        match &self.weather {
            Some(w) => format!("{}°C", field(w)),
            None => PLACEHOLDER_TEMPERATURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 17,
            feels_like_c: 16,
            temp_min_c: 15,
            temp_max_c: 19,
            humidity_pct: 72,
            description: "Light Rain".into(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn initial_state_shows_sentinel_and_placeholders() {
        let state = OrchestratorState::default();
        assert_eq!(state.city_name, FETCHING_LOCATION);
        assert!(!state.has_city());
        assert_eq!(state.temperature_label(), "--°C");
        assert_eq!(state.humidity_label(), "--%");
        assert!(!state.is_settled());
    }

    #[test]
    fn labels_format_snapshot() {
        let state = OrchestratorState {
            weather: Some(snapshot()),
            phase: Phase::Ready,
            ..Default::default()
        };
        assert_eq!(state.temperature_label(), "17°C");
        assert_eq!(state.feels_like_label(), "16°C");
        assert_eq!(state.temp_min_label(), "15°C");
        assert_eq!(state.temp_max_label(), "19°C");
        assert_eq!(state.humidity_label(), "72%");
        assert_eq!(state.description_label(), "Light Rain");
        assert!(state.is_settled());
    }
}
