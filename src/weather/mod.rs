//! Weather observations, forecasts and the upstream payload formats they
//! are decoded from.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub mod cache;
pub mod classifier;
pub mod source;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Current conditions at a point. Field names follow the live weather
/// payload (`current.temperature`, `current.windSpeed`, `current.condition`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    #[serde(rename = "temperature")]
    pub temperature_celsius: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed_kmh: f64,
    pub condition: String,
    #[serde(default, rename = "timestamp", with = "time::serde::rfc3339::option")]
    pub observed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub has_fog: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveWeather {
    pub current: WeatherObservation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: String,
    pub weather_code: u8,
    pub condition: String,
    pub temperature_max_celsius: f64,
    pub temperature_min_celsius: f64,
    pub precipitation_probability_max: Option<u8>,
    pub wind_speed_max_kmh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyForecast {
    pub days: Vec<DailyForecast>,
}

/// Anything the weather cache can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Live(WeatherObservation),
    Weekly(WeeklyForecast),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("dns error: {0}")]
    Dns(String),
    #[error("connect error: {0}")]
    Connect(std::io::Error),
    #[error("io error: {0}")]
    Io(std::io::Error),
    #[error("http status {0} ({1})")]
    Http(u16, String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("weather source disabled")]
    Disabled,
    #[error("weather task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Cache(#[from] AppError),
}

/// Condition label for a WMO weather interpretation code.
pub fn condition_for_code(code: u8) -> &'static str {
    match code {
        0 => "Ciel dégagé",
        1..=3 => "Partiellement nuageux",
        45 | 48 => "Brouillard",
        51..=55 => "Bruine",
        61..=65 => "Pluie",
        71..=77 => "Neige",
        80..=82 => "Averses",
        95..=99 => "Orage",
        _ => "Variable",
    }
}

pub fn is_fog_code(code: u8) -> bool {
    matches!(code, 45 | 48)
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrentResponse {
    current_weather: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature: f64,
    windspeed: f64,
    weathercode: u8,
}

/// Decodes an Open-Meteo `current_weather=true` response body.
pub fn parse_live_payload(
    body: &str,
    observed_at: OffsetDateTime,
) -> Result<WeatherObservation, WeatherError> {
    let response: OpenMeteoCurrentResponse = serde_json::from_str(body)?;
    let current = response.current_weather;
    Ok(WeatherObservation {
        temperature_celsius: current.temperature,
        wind_speed_kmh: current.windspeed,
        condition: condition_for_code(current.weathercode).to_string(),
        observed_at: Some(observed_at),
        has_fog: is_fog_code(current.weathercode),
    })
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDailyResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<String>,
    weathercode: Vec<u8>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_probability_max: Vec<Option<u8>>,
    #[serde(default)]
    windspeed_10m_max: Option<Vec<f64>>,
}

/// Decodes an Open-Meteo daily forecast body. The parallel arrays are
/// indexed by day and must all have the same length.
pub fn parse_weekly_payload(body: &str) -> Result<WeeklyForecast, WeatherError> {
    let response: OpenMeteoDailyResponse = serde_json::from_str(body)?;
    let daily = response.daily;
    let days = daily.time.len();

    let mut lengths = vec![
        ("weathercode", daily.weathercode.len()),
        ("temperature_2m_max", daily.temperature_2m_max.len()),
        ("temperature_2m_min", daily.temperature_2m_min.len()),
        (
            "precipitation_probability_max",
            daily.precipitation_probability_max.len(),
        ),
    ];
    if let Some(wind) = daily.windspeed_10m_max.as_ref() {
        lengths.push(("windspeed_10m_max", wind.len()));
    }
    if let Some((name, len)) = lengths.into_iter().find(|(_, len)| *len != days) {
        return Err(WeatherError::MalformedPayload(format!(
            "daily.{name} has {len} entries, expected {days}"
        )));
    }

    let forecast = daily
        .time
        .into_iter()
        .enumerate()
        .map(|(index, date)| {
            let code = daily.weathercode[index];
            DailyForecast {
                date,
                weather_code: code,
                condition: condition_for_code(code).to_string(),
                temperature_max_celsius: daily.temperature_2m_max[index],
                temperature_min_celsius: daily.temperature_2m_min[index],
                precipitation_probability_max: daily.precipitation_probability_max[index],
                wind_speed_max_kmh: daily
                    .windspeed_10m_max
                    .as_ref()
                    .map(|wind| wind[index]),
            }
        })
        .collect();

    Ok(WeeklyForecast { days: forecast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn wmo_codes_map_to_condition_labels() {
        assert_eq!(condition_for_code(0), "Ciel dégagé");
        assert_eq!(condition_for_code(2), "Partiellement nuageux");
        assert_eq!(condition_for_code(48), "Brouillard");
        assert_eq!(condition_for_code(53), "Bruine");
        assert_eq!(condition_for_code(63), "Pluie");
        assert_eq!(condition_for_code(75), "Neige");
        assert_eq!(condition_for_code(81), "Averses");
        assert_eq!(condition_for_code(96), "Orage");
        assert_eq!(condition_for_code(4), "Variable");
    }

    #[test]
    fn live_payload_maps_code_and_fog() -> Result<(), Box<dyn std::error::Error>> {
        let body = r#"{
            "latitude": 33.57,
            "longitude": -7.59,
            "current_weather": {
                "temperature": 14.2,
                "windspeed": 12.5,
                "winddirection": 270,
                "weathercode": 45,
                "time": "2026-10-19T08:00"
            }
        }"#;

        let observation = parse_live_payload(body, datetime!(2026-10-19 8:05 UTC))?;

        assert_eq!(observation.temperature_celsius, 14.2);
        assert_eq!(observation.wind_speed_kmh, 12.5);
        assert_eq!(observation.condition, "Brouillard");
        assert!(observation.has_fog);
        assert_eq!(observation.observed_at, Some(datetime!(2026-10-19 8:05 UTC)));
        Ok(())
    }

    #[test]
    fn live_payload_without_current_weather_is_json_error() {
        let result = parse_live_payload(r#"{"latitude": 1.0}"#, datetime!(2026-10-19 8:05 UTC));

        assert!(matches!(result, Err(WeatherError::Json(_))));
    }

    #[test]
    fn weekly_payload_is_indexed_by_day() -> Result<(), Box<dyn std::error::Error>> {
        let body = json!({
            "daily": {
                "time": ["2026-10-19", "2026-10-20"],
                "weathercode": [61, 0],
                "temperature_2m_max": [21.0, 24.5],
                "temperature_2m_min": [14.0, 15.5],
                "precipitation_probability_max": [80, null],
                "windspeed_10m_max": [30.0, 12.0]
            }
        })
        .to_string();

        let forecast = parse_weekly_payload(&body)?;

        assert_eq!(forecast.days.len(), 2);
        assert_eq!(forecast.days[0].condition, "Pluie");
        assert_eq!(forecast.days[0].precipitation_probability_max, Some(80));
        assert_eq!(forecast.days[1].date, "2026-10-20");
        assert_eq!(forecast.days[1].temperature_max_celsius, 24.5);
        assert_eq!(forecast.days[1].precipitation_probability_max, None);
        assert_eq!(forecast.days[1].wind_speed_max_kmh, Some(12.0));
        Ok(())
    }

    #[test]
    fn weekly_payload_rejects_mismatched_arrays() {
        let body = json!({
            "daily": {
                "time": ["2026-10-19", "2026-10-20"],
                "weathercode": [61],
                "temperature_2m_max": [21.0, 24.5],
                "temperature_2m_min": [14.0, 15.5],
                "precipitation_probability_max": [80, 10]
            }
        })
        .to_string();

        let result = parse_weekly_payload(&body);

        assert!(matches!(result, Err(WeatherError::MalformedPayload(_))));
    }

    #[test]
    fn observation_uses_live_payload_field_names() -> Result<(), Box<dyn std::error::Error>> {
        let observation: WeatherObservation = serde_json::from_value(json!({
            "temperature": 9.5,
            "windSpeed": 50.0,
            "condition": "Orage"
        }))?;

        assert_eq!(observation.wind_speed_kmh, 50.0);
        assert_eq!(observation.observed_at, None);
        assert!(!observation.has_fog);
        Ok(())
    }
}
