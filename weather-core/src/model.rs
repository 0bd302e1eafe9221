use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days past the start date a forecast request covers.
pub const FORECAST_SPAN_DAYS: u64 = 5;

pub const NO_DESCRIPTION: &str = "No description";

/// Sentinel stored in [`CurrentWeather::humidity`] when the provider omits it.
pub const HUMIDITY_ABSENT: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Inclusive date window for a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ForecastRange {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// `start` through `start + FORECAST_SPAN_DAYS`.
    pub fn starting(start: NaiveDate) -> Self {
        let end = start
            .checked_add_days(Days::new(FORECAST_SPAN_DAYS))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Range starting today in the local calendar.
    pub fn from_today() -> Self {
        Self::starting(Local::now().date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Snapshot of the weather "now" at a coordinate.
///
/// Absent optional fields are kept as numeric sentinels: `humidity == -1` and
/// `wind_speed` NaN. Use [`CurrentWeather::humidity_pct`] and
/// [`CurrentWeather::wind_speed_kmh`] for an `Option` view.
///
/// Equality treats two NaN wind speeds as equal, so a model without wind
/// data still compares equal to itself.
#[derive(Debug, Clone)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub description: String,
    pub humidity: i32,
    pub wind_speed: f64,
    pub icon: String,
}

impl PartialEq for CurrentWeather {
    fn eq(&self, other: &Self) -> bool {
        self.temperature == other.temperature
            && self.description == other.description
            && self.humidity == other.humidity
            && (self.wind_speed == other.wind_speed
                || (self.wind_speed.is_nan() && other.wind_speed.is_nan()))
            && self.icon == other.icon
    }
}

impl CurrentWeather {
    pub fn humidity_pct(&self) -> Option<i32> {
        (self.humidity != HUMIDITY_ABSENT).then_some(self.humidity)
    }

    pub fn wind_speed_kmh(&self) -> Option<f64> {
        (!self.wind_speed.is_nan()).then_some(self.wind_speed)
    }
}

/// One day's summary within a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// ISO date as sent by the provider, e.g. `2024-03-01`.
    pub date_time: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

/// Days in provider order, which is chronological.
pub type Forecast = Vec<ForecastDay>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn range_ends_five_days_after_start() {
        let range = ForecastRange::starting(date(2024, 3, 1));
        assert_eq!(range.end(), date(2024, 3, 6));
        assert_eq!(range.start_param(), "2024-03-01");
        assert_eq!(range.end_param(), "2024-03-06");
    }

    #[test]
    fn range_crosses_month_and_leap_day() {
        let range = ForecastRange::starting(date(2024, 2, 27));
        assert_eq!(range.end_param(), "2024-03-03");
    }

    #[test]
    fn range_rejects_end_before_start() {
        assert!(ForecastRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_none());
        assert!(ForecastRange::new(date(2024, 3, 1), date(2024, 3, 1)).is_some());
    }

    #[test]
    fn sentinels_map_to_none() {
        let w = CurrentWeather {
            temperature: 3.0,
            description: NO_DESCRIPTION.into(),
            humidity: HUMIDITY_ABSENT,
            wind_speed: f64::NAN,
            icon: String::new(),
        };
        assert_eq!(w.humidity_pct(), None);
        assert_eq!(w.wind_speed_kmh(), None);
    }

    #[test]
    fn missing_wind_speed_still_compares_equal() {
        let w = CurrentWeather {
            temperature: -3.5,
            description: "Snow".into(),
            humidity: HUMIDITY_ABSENT,
            wind_speed: f64::NAN,
            icon: "snow".into(),
        };
        assert_eq!(w, w.clone());

        let windy = CurrentWeather {
            wind_speed: 12.0,
            ..w.clone()
        };
        assert_ne!(w, windy);
    }

    #[test]
    fn coordinates_display_as_path_segment() {
        assert_eq!(Coordinates::new(51.5, -0.12).to_string(), "51.5,-0.12");
    }
}
