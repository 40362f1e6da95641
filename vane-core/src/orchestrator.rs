//! The state machine tying location, geocoding and weather together.
//!
//! [`Orchestrator`] is synchronous: each input mutates the state and may
//! return an [`Effect`] describing the call to make next. The actor in
//! [`runtime`] performs effects and feeds their results back in, so every
//! mutation happens on one task.

use crate::{
    error::{GeocodeError, LocationError, WeatherError},
    gradient,
    location::LocationEvent,
    model::{AuthorizationState, CityRef, Coordinates, WeatherSnapshot},
};

pub mod runtime;
pub mod state;

pub use runtime::{OrchestratorHandle, spawn};
pub use state::{FETCHING_LOCATION, OrchestratorState, Phase};

/// Work the runtime must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReverseGeocode { generation: u64, coordinates: Coordinates },
    FetchWeather { generation: u64, city_name: String },
    RequestAuthorization,
}

/// Commands accepted from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectCity(CityRef),
    Refresh,
    RequestAuthorization,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    state: OrchestratorState,
    /// Stamp of the latest reverse geocode; older completions are dropped.
    resolve_generation: u64,
    /// Stamp of the latest weather fetch; older completions are dropped.
    weather_generation: u64,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn handle_command(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::SelectCity(city) => self.select_city(city),
            Command::Refresh => self.refresh(),
            Command::RequestAuthorization => Some(self.request_authorization()),
        }
    }

    pub fn handle_location(&mut self, event: LocationEvent) -> Option<Effect> {
        match event {
            LocationEvent::AuthorizationChanged(AuthorizationState::Denied) => {
                self.location_failed(LocationError::PermissionDenied.to_string());
                None
            }
            LocationEvent::AuthorizationChanged(state) => {
                tracing::debug!(?state, "Waiting for a position fix");
                None
            }
            LocationEvent::PositionUpdated(coordinates) => {
                self.resolve_generation += 1;
                self.state.phase = Phase::ResolvingCity;
                tracing::debug!(?coordinates, generation = self.resolve_generation, "Resolving city");
                Some(Effect::ReverseGeocode { generation: self.resolve_generation, coordinates })
            }
            LocationEvent::Failed(error) => {
                self.location_failed(error.to_string());
                None
            }
        }
    }

    pub fn city_resolved(
        &mut self,
        generation: u64,
        result: Result<CityRef, GeocodeError>,
    ) -> Option<Effect> {
        if generation != self.resolve_generation {
            tracing::debug!(generation, current = self.resolve_generation, "Dropping stale city");
            return None;
        }

        match result {
            Ok(city) => {
                tracing::info!(city = %city.name, "Resolved current city");
                self.state.city_name = city.name;
                self.state.location_error = None;
                self.begin_fetch()
            }
            Err(error) => {
                self.location_failed(format!("Unable to determine your city: {error}"));
                None
            }
        }
    }

    pub fn weather_fetched(
        &mut self,
        generation: u64,
        result: Result<WeatherSnapshot, WeatherError>,
    ) {
        if generation != self.weather_generation {
            tracing::debug!(generation, current = self.weather_generation, "Dropping stale weather");
            return;
        }

        self.state.is_loading = false;
        let phase = match result {
            Ok(snapshot) => {
                self.state.weather_error = None;
                self.state.palette = Some(gradient::select(snapshot.temperature_c));
                self.state.weather = Some(snapshot);
                Phase::Ready
            }
            Err(error) => {
                tracing::warn!(city = %self.state.city_name, %error, "Weather fetch failed");
                self.state.weather = None;
                self.state.palette = None;
                self.state.weather_error = Some(error.to_string());
                Phase::WeatherError
            }
        };

        // A location failure reported mid-fetch still owns the view.
        if self.state.location_error.is_none() {
            self.state.phase = phase;
        }
    }

    /// Manual choice always wins over location: it clears any location
    /// error and drops a reverse geocode still in flight.
    pub fn select_city(&mut self, city: CityRef) -> Option<Effect> {
        tracing::debug!(city = %city.name, "City selected");
        self.resolve_generation += 1;
        self.state.city_name = city.name;
        self.state.location_error = None;
        self.begin_fetch()
    }

    /// No-op while a fetch is outstanding.
    pub fn refresh(&mut self) -> Option<Effect> {
        if self.state.is_loading {
            tracing::debug!("Refresh ignored; fetch already in flight");
            return None;
        }
        self.begin_fetch()
    }

    pub fn request_authorization(&mut self) -> Effect {
        if !self.state.has_city() && self.state.phase == Phase::LocationError {
            self.state.phase = Phase::AwaitingLocation;
        }
        Effect::RequestAuthorization
    }

    fn begin_fetch(&mut self) -> Option<Effect> {
        if !self.state.has_city() {
            tracing::debug!("No city yet; skipping weather fetch");
            return None;
        }

        self.weather_generation += 1;
        self.state.is_loading = true;
        self.state.phase = Phase::FetchingWeather;
        Some(Effect::FetchWeather {
            generation: self.weather_generation,
            city_name: self.state.city_name.clone(),
        })
    }

    /// A denial arrives as `AuthorizationChanged(Denied)` followed by
    /// `Failed(PermissionDenied)`; the repeat is a no-op.
    fn location_failed(&mut self, message: String) {
        if self.state.phase == Phase::LocationError
            && self.state.location_error.as_deref() == Some(message.as_str())
        {
            tracing::trace!(%message, "Location failure already reported");
            return;
        }

        tracing::warn!(%message, "Location unavailable");
        // Supersede any resolution still in flight.
        self.resolve_generation += 1;
        self.state.location_error = Some(message);
        self.state.phase = Phase::LocationError;
    }
}
