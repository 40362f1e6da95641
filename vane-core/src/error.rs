//! Error types for the location source, gateways and orchestrator handle.

use thiserror::Error;

/// Failures reported by the location source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access denied. Enable location services or search for a city.")]
    PermissionDenied,

    #[error("Unable to determine location: {0}")]
    Unavailable(String),
}

/// Failures from reverse geocoding and city search.
///
/// A `Provider` error coming out of `search_cities` is a search failure;
/// callers report it next to the search input rather than on the main view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("No city found for this location")]
    NotFound,

    #[error("Geocoding provider error: {0}")]
    Provider(String),
}

/// Failures from the current-weather lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Invalid weather request: {0}")]
    InvalidRequest(String),

    #[error("Weather service unreachable: {0}")]
    Transport(String),

    #[error("Unexpected weather response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("Weather orchestrator has shut down")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_message_is_user_facing() {
        let msg = LocationError::PermissionDenied.to_string();
        assert!(msg.starts_with("Location access denied"));
    }

    #[test]
    fn weather_errors_carry_detail() {
        let err = WeatherError::Transport("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
