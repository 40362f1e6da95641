use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use vane_core::{
    CityRef, Config, Coordinates, LocationSource, OrchestratorHandle, StaticBackend,
    gateways_from_config,
    orchestrator::{self, FETCHING_LOCATION},
    provider::DEFAULT_MAX_RESULTS,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "vane", version, about = "Current weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the GeoNames username, API key variable and location.
    Configure,

    /// Show current weather for your location or a chosen city.
    Show {
        /// City to look up instead of resolving the current location.
        #[arg(long, value_parser = parse_city)]
        city: Option<String>,

        /// Latitude of the current position; overrides the configured one.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the current position; overrides the configured one.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Suggest cities whose name starts with QUERY.
    Search {
        query: String,

        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max: u32,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!(command = ?self.command, "Running command");

        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon } => {
                let config = Config::load()?;
                let position = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
                    _ => config.location,
                };
                let handle = start(&config, position);

                match city {
                    Some(name) => handle.select_city(CityRef::new(name))?,
                    None => handle.request_authorization()?,
                }

                let state = handle.settled().await?;
                print!("{}", render::render_state(&state, render::use_color()));
                Ok(())
            }
            Command::Search { query, max } => {
                let config = Config::load()?;
                let handle = start(&config, None);

                let cities = handle
                    .search_cities_with_limit(&query, max)
                    .await
                    .context("City search failed")?;

                print!("{}", render::render_candidates(&query, &cities));
                Ok(())
            }
        }
    }
}

/// A city name the orchestrator can fetch: not blank and not the
/// placeholder shown while the location is still unknown.
fn parse_city(value: &str) -> Result<String, String> {
    let name = value.trim();
    if name.is_empty() {
        return Err("city name must not be empty".into());
    }
    if name == FETCHING_LOCATION {
        return Err(format!("\"{FETCHING_LOCATION}\" is not a city name"));
    }
    Ok(name.to_string())
}

fn start(config: &Config, position: Option<Coordinates>) -> OrchestratorHandle {
    tracing::debug!(?position, timeout = ?config.request_timeout(), "Starting orchestrator");
    let (location, events) = LocationSource::new(Arc::new(StaticBackend::new(position)));
    orchestrator::spawn(gateways_from_config(config), location, events, config.request_timeout())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let username = config.geonames.username.clone();
    config.geonames.username =
        Text::new("GeoNames username:").with_default(&username).prompt()?;

    let api_key_env = config.weather.api_key_env.clone();
    config.weather.api_key_env = Text::new("Environment variable holding the OpenWeather key:")
        .with_default(&api_key_env)
        .prompt()?;

    let fixed = Confirm::new("Use a fixed location when no location service is available?")
        .with_default(config.location.is_some())
        .prompt()?;

    config.location = if fixed {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    if config.weather_api_key().is_empty() {
        println!(
            "Note: ${} is not set; weather lookups will fail until it is.",
            config.weather.api_key_env
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["vane", "show", "--lat", "51.5", "--lon", "-0.12"])
            .expect("arguments must parse");

        match cli.command {
            Command::Show { lat, lon, city } => {
                assert_eq!(lat, Some(51.5));
                assert_eq!(lon, Some(-0.12));
                assert!(city.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["vane", "show", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn show_rejects_placeholder_city() {
        assert!(Cli::try_parse_from(["vane", "show", "--city", "Fetching location..."]).is_err());
        assert!(Cli::try_parse_from(["vane", "show", "--city", "  "]).is_err());
    }

    #[test]
    fn show_trims_city() {
        let cli = Cli::try_parse_from(["vane", "show", "--city", " Oslo "])
            .expect("arguments must parse");
        match cli.command {
            Command::Show { city, .. } => assert_eq!(city.as_deref(), Some("Oslo")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn search_defaults_to_ten_results() {
        let cli = Cli::try_parse_from(["vane", "search", "Par"]).expect("arguments must parse");
        match cli.command {
            Command::Search { query, max } => {
                assert_eq!(query, "Par");
                assert_eq!(max, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
