//! Location → fetch → parse → cache orchestration.
//!
//! The cache is consulted only when offline. A fresh payload that fails to
//! parse is reported as such and never replaced by a cached one.

use chrono::{Local, NaiveDate};
use std::{fmt::Debug, sync::Arc};
use tokio_util::sync::CancellationToken;

use crate::{
    cache::{CacheCategory, WeatherCache},
    connectivity::Connectivity,
    error::{FetchError, ParseError, PipelineError},
    location::LocationProvider,
    model::{Coordinates, CurrentWeather, Forecast, ForecastRange},
    parser,
    worker::{FetchHandle, FetchRequest},
};

/// One kind of data a screen shows.
pub trait Feed: Send + Sync + 'static {
    type Model: Clone + Debug + Send + Sync + 'static;

    const CATEGORY: CacheCategory;

    fn request(at: Coordinates, today: NaiveDate) -> FetchRequest;

    fn parse(raw: &str) -> Result<Self::Model, ParseError>;
}

#[derive(Debug, Clone, Copy)]
pub struct CurrentFeed;

impl Feed for CurrentFeed {
    type Model = CurrentWeather;

    const CATEGORY: CacheCategory = CacheCategory::Current;

    fn request(at: Coordinates, _today: NaiveDate) -> FetchRequest {
        FetchRequest::Current(at)
    }

    fn parse(raw: &str) -> Result<CurrentWeather, ParseError> {
        parser::parse_current(raw)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastFeed;

impl Feed for ForecastFeed {
    type Model = Forecast;

    const CATEGORY: CacheCategory = CacheCategory::Forecast;

    fn request(at: Coordinates, today: NaiveDate) -> FetchRequest {
        FetchRequest::Forecast(at, ForecastRange::starting(today))
    }

    fn parse(raw: &str) -> Result<Forecast, ParseError> {
        parser::parse_forecast(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub source: Source,
}

/// Why a refresh produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    Failed(PipelineError),
    /// The owner went away; nothing should be shown or stored.
    Cancelled,
}

impl From<PipelineError> for RefreshError {
    fn from(e: PipelineError) -> Self {
        RefreshError::Failed(e)
    }
}

/// Explicitly wired pipeline. Cloning shares the same cache, worker and sources.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    cache: WeatherCache,
    fetcher: FetchHandle,
    location: Arc<dyn LocationProvider>,
    connectivity: Arc<dyn Connectivity>,
    today: fn() -> NaiveDate,
}

impl WeatherPipeline {
    pub fn new(
        cache: WeatherCache,
        fetcher: FetchHandle,
        location: Arc<dyn LocationProvider>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            location,
            connectivity,
            today: local_today,
        }
    }

    /// Override the date forecasts start from.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub async fn refresh<F: Feed>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Loaded<F::Model>, RefreshError> {
        if self.connectivity.is_online().await {
            self.refresh_online::<F>(cancel).await
        } else {
            tracing::info!(category = F::CATEGORY.key(), "offline, reading cache");
            self.load_cached::<F>().map_err(RefreshError::from)
        }
    }

    fn load_cached<F: Feed>(&self) -> Result<Loaded<F::Model>, PipelineError> {
        let raw = match self.cache.get(F::CATEGORY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(PipelineError::NoCachedData),
            Err(e) => {
                tracing::warn!("Failed to read cache: {e}");
                return Err(PipelineError::NoCachedData);
            }
        };

        let data = F::parse(&raw).map_err(|_| PipelineError::NoCachedData)?;
        Ok(Loaded {
            data,
            source: Source::Cache,
        })
    }

    async fn refresh_online<F: Feed>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Loaded<F::Model>, RefreshError> {
        let at = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RefreshError::Cancelled),
            fix = self.location.current_location() => fix.map_err(|e| {
                tracing::warn!("No location fix: {e}");
                PipelineError::LocationUnavailable
            })?,
        };

        let request = F::request(at, (self.today)());
        let raw = match self.fetcher.fetch(request, cancel).await {
            Ok(raw) => raw,
            Err(FetchError::Cancelled) => return Err(RefreshError::Cancelled),
            Err(e) => {
                tracing::warn!(category = F::CATEGORY.key(), "fetch failed: {e}");
                return Err(PipelineError::FetchFailed.into());
            }
        };

        let data = F::parse(&raw).map_err(|_| PipelineError::ParseFailed)?;

        if cancel.is_cancelled() {
            return Err(RefreshError::Cancelled);
        }

        if let Err(e) = self.cache.put(F::CATEGORY, &raw) {
            tracing::warn!("Failed to write cache: {e}");
        }

        Ok(Loaded {
            data,
            source: Source::Network,
        })
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
