use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Coordinates, ForecastRange},
};

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/";

/// Source of raw weather payloads.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch_current(&self, at: Coordinates) -> Result<String, FetchError>;

    async fn fetch_forecast(
        &self,
        at: Coordinates,
        range: ForecastRange,
    ) -> Result<String, FetchError>;
}

/// Visual Crossing timeline API.
#[derive(Debug, Clone)]
pub struct VisualCrossingClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl VisualCrossingClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let mut base_url = base_url.to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// URL without the key.
    pub fn current_url(&self, at: Coordinates) -> String {
        format!("{}{}", self.base_url, at)
    }

    /// URL without the key.
    pub fn forecast_url(&self, at: Coordinates, range: ForecastRange) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            at,
            range.start_param(),
            range.end_param()
        )
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, "GET");

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error making GET request: {e}");
                FetchError::Transport(e)
            })?;

        let status = res.status();
        tracing::debug!("Response Code: {status}");

        if status != StatusCode::OK {
            tracing::error!("Error response code: {status}");
            return Err(FetchError::Status(status));
        }

        res.text().await.map_err(|e| {
            tracing::error!("Error reading response body: {e}");
            FetchError::Body(e)
        })
    }
}

#[async_trait]
impl WeatherApi for VisualCrossingClient {
    async fn fetch_current(&self, at: Coordinates) -> Result<String, FetchError> {
        self.get_text(&self.current_url(at)).await
    }

    async fn fetch_forecast(
        &self,
        at: Coordinates,
        range: ForecastRange,
    ) -> Result<String, FetchError> {
        self.get_text(&self.forecast_url(at, range)).await
    }
}
