use std::{fmt::Write, io::IsTerminal};

use chrono::Local;
use vane_core::{CityRef, OrchestratorState, Rgb, orchestrator::runtime::MIN_SEARCH_QUERY_LEN};

pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Text rendering of the view-state. A location error replaces everything
/// else; a weather error keeps the city and shows placeholders.
pub fn render_state(state: &OrchestratorState, color: bool) -> String {
    let mut out = String::new();

    if let Some(error) = state.blocking_error() {
        let _ = writeln!(out, "{error}");
        return out;
    }

    let _ = writeln!(out, "{}", state.city_name);

    let headline = format!("  {}  {}", state.temperature_label(), state.description_label());
    let tint = state.palette.and_then(|p| p.colors().first().copied());
    match tint {
        Some(rgb) if color => {
            let _ = writeln!(out, "{}", paint(headline.trim_end(), rgb));
        }
        _ => {
            let _ = writeln!(out, "{}", headline.trim_end());
        }
    }

    let _ = writeln!(
        out,
        "  Feels like {} · Min {} · Max {} · Humidity {}",
        state.feels_like_label(),
        state.temp_min_label(),
        state.temp_max_label(),
        state.humidity_label(),
    );

    if let Some(weather) = &state.weather {
        let local = weather.observed_at.with_timezone(&Local);
        let _ = writeln!(out, "  Updated {}", local.format("%H:%M"));
    }

    if let Some(error) = &state.weather_error {
        let _ = writeln!(out, "  {error}");
    }

    out
}

pub fn render_candidates(query: &str, cities: &[CityRef]) -> String {
    if query.trim().chars().count() < MIN_SEARCH_QUERY_LEN {
        return format!("Type at least {MIN_SEARCH_QUERY_LEN} characters to search.\n");
    }
    if cities.is_empty() {
        return format!("No cities match \"{}\".\n", query.trim());
    }

    cities.iter().fold(String::new(), |mut out, city| {
        let _ = writeln!(out, "{}", city.label());
        out
    })
}

fn paint(text: &str, Rgb(r, g, b): Rgb) -> String {
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}
