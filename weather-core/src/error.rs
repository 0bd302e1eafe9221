use thiserror::Error;

/// A request that produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("weather API responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("request to weather API failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read weather API response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("fetch worker is no longer running")]
    WorkerGone,

    #[error("fetch cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("no location fix available")]
    Unavailable,
}

/// Outcome of a failed refresh, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Error fetching weather data")]
    FetchFailed,

    #[error("Unable to load weather data")]
    ParseFailed,

    #[error("Unable to get location")]
    LocationUnavailable,

    #[error("No cached weather data available")]
    NoCachedData,
}
