//! End-to-end tests for the pipeline against a mock Visual Crossing server.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use weatherway_core::{
    CacheCategory, Coordinates, CurrentFeed, FetchHandle, FileStore, FixedLocation, ForecastFeed,
    PipelineError, RefreshError, Source, VisualCrossingClient, WeatherCache, WeatherPipeline,
    connectivity::Fixed, parser,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAT_LON: &str = "40.7128,-74.006";

fn forecast_body() -> String {
    json!({
        "resolvedAddress": "New York, NY, United States",
        "days": [
            { "datetime": "2024-03-01", "temp": 4.2, "description": "Cloudy skies throughout the day.", "icon": "cloudy" },
            { "datetime": "2024-03-02", "temp": 6.8, "description": "Rain in the afternoon.", "icon": "rain" },
            { "datetime": "2024-03-03", "temp": 9.1, "icon": "clear-day" }
        ]
    })
    .to_string()
}

fn pipeline(server: &MockServer, cache: WeatherCache, online: bool) -> WeatherPipeline {
    let client = VisualCrossingClient::with_base_url(
        "TEST_KEY".into(),
        &format!("{}/timeline/", server.uri()),
    );

    WeatherPipeline::new(
        cache,
        FetchHandle::spawn(Arc::new(client)),
        Arc::new(FixedLocation(Coordinates::new(40.7128, -74.006))),
        Arc::new(Fixed(online)),
    )
    .with_today(|| NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

#[tokio::test]
async fn test_forecast_success_is_cached_to_disk() {
    let server = MockServer::start().await;
    let body = forecast_body();

    Mock::given(method("GET"))
        .and(path(format!("/timeline/{LAT_LON}/2024-03-01/2024-03-06")))
        .and(query_param("key", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = WeatherCache::new(Arc::new(FileStore::in_dir(dir.path())));
    let p = pipeline(&server, cache, true);

    let loaded = p.refresh::<ForecastFeed>(&CancellationToken::new()).await.unwrap();
    assert_eq!(loaded.source, Source::Network);
    assert_eq!(loaded.data.len(), 3);
    assert_eq!(loaded.data[1].description, "Rain in the afternoon.");
    assert_eq!(loaded.data[2].description, "No description");

    let reopened = WeatherCache::new(Arc::new(FileStore::in_dir(dir.path())));
    assert_eq!(reopened.get(CacheCategory::Forecast).unwrap(), Some(body));
}

#[tokio::test]
async fn test_forecast_500_keeps_previous_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let cache = WeatherCache::in_memory();
    cache.put(CacheCategory::Forecast, "previous").unwrap();
    let p = pipeline(&server, cache, true);

    let err = p.refresh::<ForecastFeed>(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err, RefreshError::Failed(PipelineError::FetchFailed));
    assert_eq!(
        p.cache().get(CacheCategory::Forecast).unwrap().as_deref(),
        Some("previous")
    );
}

#[tokio::test]
async fn test_offline_current_served_from_cache_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let blob = r#"{"currentConditions":{"temp":-3.5,"conditions":"Snow","icon":"snow"}}"#;
    let cache = WeatherCache::in_memory();
    cache.put(CacheCategory::Current, blob).unwrap();
    let p = pipeline(&server, cache, false);

    let loaded = p.refresh::<CurrentFeed>(&CancellationToken::new()).await.unwrap();

    let direct = parser::parse_current(blob).unwrap();
    assert_eq!(loaded.source, Source::Cache);
    assert_eq!(loaded.data, direct);
    assert_eq!(loaded.data.humidity_pct(), None);
    assert_eq!(loaded.data.wind_speed_kmh(), None);
}
