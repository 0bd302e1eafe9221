//! Plain-text renderings of the two screens.

use std::fmt::Write;
use weatherway_core::{CurrentWeather, Forecast, PipelineError, ScreenState, Source};

const OFFLINE_BANNER: &str =
    "No internet connection detected. Showing the last saved data.";

pub fn current(state: &ScreenState<CurrentWeather>) -> String {
    match state {
        ScreenState::Loading => "Loading...".to_string(),
        ScreenState::Error(e) => error_text(&e.to_string(), state.is_offline()),
        ScreenState::Ready { data, source } => {
            let mut out = String::new();
            push_banner(&mut out, *source);

            let _ = writeln!(out, "Current Weather");
            let _ = writeln!(out, "  {:.1}°C  {}", data.temperature, data.description);
            let humidity = data
                .humidity_pct()
                .map_or_else(|| "n/a".to_string(), |h| format!("{h}%"));
            let wind = data
                .wind_speed_kmh()
                .map_or_else(|| "n/a".to_string(), |w| format!("{w:.1} km/h"));
            let _ = writeln!(out, "  Humidity: {humidity}");
            let _ = write!(out, "  Wind:     {wind}");
            if !data.icon.is_empty() {
                let _ = write!(out, "\n  Icon:     {}", data.icon);
            }
            out
        }
    }
}

pub fn forecast(state: &ScreenState<Forecast>) -> String {
    match state {
        ScreenState::Loading => "Loading...".to_string(),
        ScreenState::Error(e) => error_text(forecast_message(e), state.is_offline()),
        ScreenState::Ready { data, source } => {
            let mut out = String::new();
            push_banner(&mut out, *source);

            let _ = write!(out, "5-Day Forecast");
            if data.is_empty() {
                let _ = write!(out, "\n  No forecast days returned");
            }
            for day in data {
                let _ = write!(
                    out,
                    "\n  {}  {:>6.1}°C  {}",
                    day.date_time, day.temperature, day.description
                );
            }
            out
        }
    }
}

/// The forecast screen words its failures in terms of the forecast; the
/// current-weather screen uses the [`PipelineError`] text as is.
fn forecast_message(error: &PipelineError) -> &'static str {
    match error {
        PipelineError::FetchFailed => "Error fetching forecast",
        PipelineError::ParseFailed => "Could not load forecast",
        PipelineError::NoCachedData => "No cached forecast available",
        PipelineError::LocationUnavailable => "Unable to get location",
    }
}

fn push_banner(out: &mut String, source: Source) {
    if source == Source::Cache {
        let _ = writeln!(out, "{OFFLINE_BANNER}\n");
    }
}

fn error_text(message: &str, offline: bool) -> String {
    if offline {
        format!("No internet connection detected. {message}")
    } else {
        message.to_string()
    }
}
