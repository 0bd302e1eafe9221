use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode};
use std::{path::PathBuf, sync::Arc};
use weatherway_core::{
    Config, Connectivity, Coordinates, CurrentWeatherScreen, FetchHandle, FileStore, FixedLocation,
    ForecastScreen, KeyValueStore, LocationProvider, MemoryStore, NoLocation, RefreshOutcome,
    ScreenState, TcpProbe, VisualCrossingClient, WeatherCache, WeatherPipeline, connectivity::Fixed,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and an optional default location.
    Configure,

    /// Show current conditions.
    Current(ScreenArgs),

    /// Show the 5-day forecast.
    Forecast(ScreenArgs),
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Latitude in degrees; defaults to the configured location.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees; defaults to the configured location.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Skip the network and show the last cached response.
    #[arg(long)]
    pub offline: bool,

    /// Directory holding the response cache.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Keep responses in memory only.
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_cache: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current(args) => {
                let screen = CurrentWeatherScreen::new(build_pipeline(&args)?);
                let state = refresh(&screen).await?;
                report(render::current(&state), &state)
            }
            Command::Forecast(args) => {
                let screen = ForecastScreen::new(build_pipeline(&args)?);
                let state = refresh(&screen).await?;
                report(render::forecast(&state), &state)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Visual Crossing API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.api_key = Some(api_key.trim().to_owned());

    let latitude = CustomType::<f64>::new("Default latitude (Esc to skip):")
        .with_error_message("Enter a number, e.g. 52.52")
        .prompt_skippable()?;
    let longitude = match latitude {
        Some(_) => CustomType::<f64>::new("Default longitude:")
            .with_error_message("Enter a number, e.g. 13.405")
            .prompt_skippable()?,
        None => None,
    };
    if let (Some(lat), Some(lon)) = (latitude, longitude) {
        config.location = Some(Coordinates::new(lat, lon));
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_pipeline(args: &ScreenArgs) -> anyhow::Result<WeatherPipeline> {
    let config = Config::load()?;
    let base_url = config.base_url().to_owned();
    tracing::debug!(%base_url, offline = args.offline, "building pipeline");

    let store: Arc<dyn KeyValueStore> = if args.no_cache {
        Arc::new(MemoryStore::new())
    } else {
        match args.cache_dir.as_ref().or(config.cache_dir.as_ref()) {
            Some(dir) => Arc::new(FileStore::in_dir(dir)),
            None => Arc::new(FileStore::default_location()?),
        }
    };

    let location: Arc<dyn LocationProvider> = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Arc::new(FixedLocation(Coordinates::new(lat, lon))),
        _ => match config.location {
            Some(at) => Arc::new(FixedLocation(at)),
            None => Arc::new(NoLocation),
        },
    };

    let connectivity: Arc<dyn Connectivity> = if args.offline {
        Arc::new(Fixed(false))
    } else {
        match TcpProbe::for_url(&base_url) {
            Some(probe) => Arc::new(probe),
            None => return Err(anyhow!("Invalid base URL in config: {base_url}")),
        }
    };

    // The API key is only needed once we go online.
    let api_key = if args.offline {
        config.api_key.clone().unwrap_or_default()
    } else {
        config.resolve_api_key()?
    };
    let client = VisualCrossingClient::with_base_url(api_key, &base_url);

    Ok(WeatherPipeline::new(
        WeatherCache::new(store),
        FetchHandle::spawn(Arc::new(client)),
        location,
        connectivity,
    ))
}

async fn refresh<F: weatherway_core::Feed>(
    screen: &weatherway_core::Screen<F>,
) -> anyhow::Result<ScreenState<F::Model>> {
    match screen.refresh().await {
        RefreshOutcome::Completed => Ok(screen.state()),
        outcome => Err(anyhow!("Refresh did not complete: {outcome:?}")),
    }
}

fn report<T>(output: String, state: &ScreenState<T>) -> anyhow::Result<()> {
    if matches!(state, ScreenState::Error(_)) {
        return Err(anyhow!(output));
    }
    println!("{output}");
    Ok(())
}
