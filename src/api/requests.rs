use crate::prediction::{RouteLeg, TravelMode};
use crate::weather::{Coordinates, WeatherObservation};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub mode: TravelMode,
    #[serde(with = "time::serde::rfc3339")]
    pub departure: OffsetDateTime,
    /// `null` when the routing service could not answer.
    #[serde(default)]
    pub route: Option<RouteLeg>,
    #[serde(default)]
    pub weather: Option<WeatherObservation>,
    /// Used to look up live weather when `weather` is absent.
    #[serde(default)]
    pub origin: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: f64,
    pub lng: f64,
}

impl From<CoordinatesQuery> for Coordinates {
    fn from(query: CoordinatesQuery) -> Self {
        Coordinates {
            lat: query.lat,
            lng: query.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assessment_request_accepts_camel_case_route() -> Result<(), Box<dyn std::error::Error>> {
        let request: AssessmentRequest = serde_json::from_value(json!({
            "mode": "driving",
            "departure": "2026-10-19T18:00:00+01:00",
            "route": {
                "distanceMeters": 8000.0,
                "durationSeconds": 1080,
                "durationInTrafficSeconds": 1680
            },
            "weather": {
                "temperature": 15.0,
                "windSpeed": 10.0,
                "condition": "Pluie"
            }
        }))?;

        assert_eq!(request.mode, TravelMode::Driving);
        assert_eq!(request.departure.hour(), 18);
        let route = request.route.ok_or("route missing")?;
        assert_eq!(route.duration_in_traffic_seconds, Some(1680));
        assert!(request.origin.is_none());
        Ok(())
    }

    #[test]
    fn null_route_and_missing_weather_are_absent() -> Result<(), Box<dyn std::error::Error>> {
        let request: AssessmentRequest = serde_json::from_value(json!({
            "mode": "walking",
            "departure": "2026-10-19T08:00:00Z",
            "route": null,
            "origin": { "lat": 33.57, "lng": -7.59 }
        }))?;

        assert!(request.route.is_none());
        assert!(request.weather.is_none());
        assert!(request.origin.is_some());
        Ok(())
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result: Result<AssessmentRequest, _> = serde_json::from_value(json!({
            "mode": "cycling",
            "departure": "2026-10-19T08:00:00Z"
        }));

        assert!(result.is_err());
    }
}
