//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The Visual Crossing API client and the single background fetch worker
//! - Parsing of raw responses into current conditions and forecast days
//! - The raw-response cache used when the device is offline
//! - Screen controllers that publish refresh state
//!
//! Components are constructed explicitly and wired into a [`WeatherPipeline`];
//! there is no process-wide state.

pub mod api;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod location;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod screen;
pub mod worker;

pub use api::{VisualCrossingClient, WeatherApi};
pub use cache::{CacheCategory, FileStore, KeyValueStore, MemoryStore, WeatherCache};
pub use config::Config;
pub use connectivity::{Connectivity, TcpProbe};
pub use error::{CacheError, FetchError, LocationError, ParseError, PipelineError};
pub use location::{FixedLocation, LocationProvider, NoLocation};
pub use model::{Coordinates, CurrentWeather, Forecast, ForecastDay, ForecastRange};
pub use pipeline::{CurrentFeed, Feed, ForecastFeed, Loaded, RefreshError, Source, WeatherPipeline};
pub use screen::{CurrentWeatherScreen, ForecastScreen, RefreshOutcome, Screen, ScreenState};
pub use worker::{FetchHandle, FetchRequest};
