//! Converts raw Visual Crossing timeline responses into model records.
//!
//! Required fields fail the whole call when absent or mistyped. Optional
//! fields fall back to their sentinels; `null` and wrong-typed values count
//! as absent.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::ParseError,
    model::{CurrentWeather, Forecast, ForecastDay, HUMIDITY_ABSENT, NO_DESCRIPTION},
};

#[derive(Debug, Deserialize)]
struct VcCurrentResponse {
    #[serde(rename = "currentConditions")]
    current_conditions: Option<VcConditions>,
}

#[derive(Debug, Deserialize)]
struct VcConditions {
    temp: Option<Value>,
    conditions: Option<Value>,
    humidity: Option<Value>,
    windspeed: Option<Value>,
    icon: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VcForecastResponse {
    days: Option<Vec<VcDay>>,
}

#[derive(Debug, Deserialize)]
struct VcDay {
    datetime: Option<Value>,
    temp: Option<Value>,
    description: Option<Value>,
    icon: Option<Value>,
}

/// Parse a current-conditions payload.
pub fn parse_current(raw: &str) -> Result<CurrentWeather, ParseError> {
    current_from_str(raw).inspect_err(|e| {
        tracing::error!("Error parsing current weather: {e}");
    })
}

/// Parse a forecast payload. An empty `days` array is a valid, empty forecast.
pub fn parse_forecast(raw: &str) -> Result<Forecast, ParseError> {
    forecast_from_str(raw).inspect_err(|e| {
        tracing::error!("Error parsing forecast: {e}");
    })
}

fn current_from_str(raw: &str) -> Result<CurrentWeather, ParseError> {
    let parsed: VcCurrentResponse = serde_json::from_str(raw)?;
    let cc = parsed
        .current_conditions
        .ok_or(ParseError::Missing("currentConditions"))?;

    Ok(CurrentWeather {
        temperature: required_f64(cc.temp, "temp")?,
        description: optional_string(cc.conditions).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        humidity: optional_f64(cc.humidity).map_or(HUMIDITY_ABSENT, |h| h as i32),
        wind_speed: optional_f64(cc.windspeed).unwrap_or(f64::NAN),
        icon: optional_string(cc.icon).unwrap_or_default(),
    })
}

fn forecast_from_str(raw: &str) -> Result<Forecast, ParseError> {
    let parsed: VcForecastResponse = serde_json::from_str(raw)?;
    let days = parsed.days.ok_or(ParseError::Missing("days"))?;

    days.into_iter()
        .map(|day| {
            Ok(ForecastDay {
                date_time: required_string(day.datetime, "datetime")?,
                temperature: required_f64(day.temp, "temp")?,
                description: optional_string(day.description)
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                icon: optional_string(day.icon).unwrap_or_default(),
            })
        })
        .collect()
}

fn required_f64(value: Option<Value>, field: &'static str) -> Result<f64, ParseError> {
    match value {
        None | Some(Value::Null) => Err(ParseError::Missing(field)),
        Some(Value::Number(n)) => n.as_f64().ok_or(ParseError::WrongType {
            field,
            expected: "a number",
        }),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "a number",
        }),
    }
}

fn required_string(value: Option<Value>, field: &'static str) -> Result<String, ParseError> {
    match value {
        None | Some(Value::Null) => Err(ParseError::Missing(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn optional_f64(value: Option<Value>) -> Option<f64> {
    value.and_then(|v| v.as_f64())
}

fn optional_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_full_payload() {
        let raw = json!({
            "currentConditions": {
                "temp": 12.4,
                "conditions": "Partially cloudy",
                "humidity": 71.0,
                "windspeed": 14.8,
                "icon": "partly-cloudy-day"
            }
        })
        .to_string();

        let w = parse_current(&raw).expect("should parse");
        assert_eq!(w.temperature, 12.4);
        assert_eq!(w.description, "Partially cloudy");
        assert_eq!(w.humidity, 71);
        assert_eq!(w.wind_speed, 14.8);
        assert_eq!(w.icon, "partly-cloudy-day");
    }

    #[test]
    fn current_temperature_is_exact() {
        for t in [-40.0, 0.0, 0.1, 21.37, 1e-9, 47.123456789] {
            let raw = json!({ "currentConditions": { "temp": t } }).to_string();
            assert_eq!(parse_current(&raw).expect("should parse").temperature, t);
        }
    }

    #[test]
    fn current_missing_optionals_use_sentinels() {
        let raw = r#"{"currentConditions":{"temp":5}}"#;
        let w = parse_current(raw).expect("should parse");

        assert_eq!(w.temperature, 5.0);
        assert_eq!(w.humidity, -1);
        assert!(w.wind_speed.is_nan());
        assert_eq!(w.description, "No description");
        assert_eq!(w.icon, "");
    }

    #[test]
    fn current_null_optionals_use_sentinels() {
        let raw = r#"{"currentConditions":{"temp":5,"humidity":null,"windspeed":null,"conditions":null}}"#;
        let w = parse_current(raw).expect("should parse");

        assert_eq!(w.humidity, -1);
        assert!(w.wind_speed.is_nan());
        assert_eq!(w.description, "No description");
    }

    #[test]
    fn current_fractional_humidity_truncates() {
        let raw = r#"{"currentConditions":{"temp":5,"humidity":64.9}}"#;
        assert_eq!(parse_current(raw).expect("should parse").humidity, 64);
    }

    #[test]
    fn current_missing_temp_fails() {
        let raw = r#"{"currentConditions":{"humidity":40}}"#;
        assert!(matches!(parse_current(raw), Err(ParseError::Missing("temp"))));
    }

    #[test]
    fn current_string_temp_fails() {
        let raw = r#"{"currentConditions":{"temp":"warm"}}"#;
        assert!(matches!(
            parse_current(raw),
            Err(ParseError::WrongType { field: "temp", .. })
        ));
    }

    #[test]
    fn current_missing_block_fails() {
        let raw = r#"{"days":[]}"#;
        assert!(matches!(
            parse_current(raw),
            Err(ParseError::Missing("currentConditions"))
        ));
    }

    #[test]
    fn current_malformed_json_fails() {
        assert!(matches!(parse_current("{not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn forecast_preserves_order_and_length() {
        let raw = json!({
            "days": [
                { "datetime": "2024-03-01", "temp": 8.1, "description": "Rain", "icon": "rain" },
                { "datetime": "2024-03-02", "temp": 9.5 },
                { "datetime": "2024-03-03", "temp": 11.0, "description": "Clear" }
            ]
        })
        .to_string();

        let days = parse_forecast(&raw).expect("should parse");
        let dates: Vec<_> = days.iter().map(|d| d.date_time.as_str()).collect();
        assert_eq!(dates, ["2024-03-01", "2024-03-02", "2024-03-03"]);
        assert_eq!(days[0].icon, "rain");
        assert_eq!(days[1].description, "No description");
        assert_eq!(days[1].icon, "");
        assert_eq!(days[2].temperature, 11.0);
    }

    #[test]
    fn forecast_empty_days_is_not_a_failure() {
        let days = parse_forecast(r#"{"days":[]}"#).expect("empty is valid");
        assert!(days.is_empty());
    }

    #[test]
    fn forecast_missing_days_fails() {
        assert!(matches!(
            parse_forecast(r#"{"currentConditions":{"temp":1}}"#),
            Err(ParseError::Missing("days"))
        ));
    }

    #[test]
    fn forecast_one_bad_day_fails_whole_call() {
        let raw = json!({
            "days": [
                { "datetime": "2024-03-01", "temp": 8.1 },
                { "datetime": "2024-03-02" }
            ]
        })
        .to_string();

        assert!(matches!(parse_forecast(&raw), Err(ParseError::Missing("temp"))));
    }
}
