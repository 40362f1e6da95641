//! Actor that owns the [`Orchestrator`] and performs its effects.
//!
//! Gateway calls run on their own tasks and post completions back to the
//! actor's inbox, so the state is only ever written from the actor task.
//! Observers read it through a `watch` channel.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    time::timeout,
};

use crate::{
    error::{GeocodeError, OrchestratorError, WeatherError},
    location::{LocationEvent, LocationSource},
    model::{CityRef, WeatherSnapshot},
    provider::{DEFAULT_MAX_RESULTS, GeocodeGateway, Gateways},
};

use super::{Command, Effect, Orchestrator, OrchestratorState};

/// Shorter search queries return no candidates without a network call.
pub const MIN_SEARCH_QUERY_LEN: usize = 3;

#[derive(Debug)]
enum Completion {
    City { generation: u64, result: Result<CityRef, GeocodeError> },
    Weather { generation: u64, result: Result<WeatherSnapshot, WeatherError> },
}

/// Presentation-facing side of a running orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<OrchestratorState>,
    geocode: Arc<dyn GeocodeGateway>,
}

/// Start the orchestrator actor on the current tokio runtime.
///
/// The actor stops once every handle has been dropped.
pub fn spawn(
    gateways: Gateways,
    location: LocationSource,
    location_events: mpsc::UnboundedReceiver<LocationEvent>,
    request_timeout: Duration,
) -> OrchestratorHandle {
    let orchestrator = Orchestrator::new();
    let (state_tx, state_rx) = watch::channel(orchestrator.state().clone());
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();

    let handle = OrchestratorHandle {
        commands: commands_tx,
        state: state_rx,
        geocode: gateways.geocode.clone(),
    };

    let actor = Actor { orchestrator, gateways, location, request_timeout, state_tx, completions_tx };
    tokio::spawn(actor.run(commands_rx, location_events, completions_rx));

    handle
}

impl OrchestratorHandle {
    pub fn select_city(&self, city: CityRef) -> Result<(), OrchestratorError> {
        self.send(Command::SelectCity(city))
    }

    pub fn refresh(&self) -> Result<(), OrchestratorError> {
        self.send(Command::Refresh)
    }

    pub fn request_authorization(&self) -> Result<(), OrchestratorError> {
        self.send(Command::RequestAuthorization)
    }

    /// Copy of the latest published state.
    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.clone()
    }

    /// Wait until the orchestrator has nothing in flight.
    pub async fn settled(&self) -> Result<OrchestratorState, OrchestratorError> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(OrchestratorState::is_settled)
            .await
            .map_err(|_| OrchestratorError::Closed)?;
        Ok(state.clone())
    }

    /// City suggestions for a search box. Does not touch the state.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityRef>, GeocodeError> {
        self.search_cities_with_limit(query, DEFAULT_MAX_RESULTS).await
    }

    pub async fn search_cities_with_limit(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CityRef>, GeocodeError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Ok(Vec::new());
        }
        self.geocode.search_cities(query, max_results).await
    }

    fn send(&self, command: Command) -> Result<(), OrchestratorError> {
        self.commands.send(command).map_err(|_| OrchestratorError::Closed)
    }
}

struct Actor {
    orchestrator: Orchestrator,
    gateways: Gateways,
    location: LocationSource,
    request_timeout: Duration,
    state_tx: watch::Sender<OrchestratorState>,
    completions_tx: mpsc::UnboundedSender<Completion>,
}

impl Actor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut location_events: mpsc::UnboundedReceiver<LocationEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        let mut location_open = true;

        loop {
            // Location events first, so events queued by an effect are
            // handled before any command sent after they were published.
            let effect = tokio::select! {
                biased;

                event = location_events.recv(), if location_open => match event {
                    Some(event) => self.orchestrator.handle_location(event),
                    None => {
                        location_open = false;
                        continue;
                    }
                },
                Some(done) = completions.recv() => match done {
                    Completion::City { generation, result } => {
                        self.orchestrator.city_resolved(generation, result)
                    }
                    Completion::Weather { generation, result } => {
                        self.orchestrator.weather_fetched(generation, result);
                        None
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => self.orchestrator.handle_command(command),
                    None => break,
                },
            };

            self.publish();
            if let Some(effect) = effect {
                self.perform(effect);
            }
        }

        tracing::debug!("Orchestrator stopped");
    }

    fn publish(&self) {
        let next = self.orchestrator.state();
        self.state_tx.send_if_modified(|current| {
            if *current == *next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
    }

    fn perform(&self, effect: Effect) {
        let limit = self.request_timeout;

        match effect {
            Effect::ReverseGeocode { generation, coordinates } => {
                let geocode = self.gateways.geocode.clone();
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = match timeout(limit, geocode.reverse_geocode(coordinates)).await {
                        Ok(result) => result,
                        Err(_) => Err(GeocodeError::Provider(timed_out(limit))),
                    };
                    let _ = tx.send(Completion::City { generation, result });
                });
            }
            Effect::FetchWeather { generation, city_name } => {
                let weather = self.gateways.weather.clone();
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = match timeout(limit, weather.fetch_current(&city_name)).await {
                        Ok(result) => result,
                        Err(_) => Err(WeatherError::Transport(timed_out(limit))),
                    };
                    let _ = tx.send(Completion::Weather { generation, result });
                });
            }
            Effect::RequestAuthorization => self.location.request_authorization(),
        }
    }
}

fn timed_out(limit: Duration) -> String {
    format!("request timed out after {}s", limit.as_secs())
}
