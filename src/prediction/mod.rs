//! Trip risk prediction engine.
//!
//! Every function in this module tree is pure: it reads its arguments and
//! returns a value. Weather and route data arrive already resolved (or
//! explicitly absent); the engine never performs I/O.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use time::{OffsetDateTime, Time};

pub mod advice;
pub mod assembler;
pub mod fallback;
pub mod risk;
pub mod traffic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Transit,
    Walking,
}

/// Ordered three-level label shared by weather impact, risk and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficTier {
    Fluid,
    Moderate,
    Heavy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Info,
}

/// Which path produced an [`AdvisoryModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    Genuine,
    Fallback,
}

/// Metrics of a single route leg as reported by the routing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub duration_in_traffic_seconds: Option<u32>,
}

/// Input of one assessment request.
#[derive(Debug, Clone, PartialEq)]
pub struct TripMetrics {
    pub distance_km: f64,
    pub base_duration_seconds: Option<u32>,
    /// Live-traffic estimate; only meaningful for [`TravelMode::Driving`].
    pub traffic_duration_seconds: Option<u32>,
    pub travel_mode: TravelMode,
    pub departure: OffsetDateTime,
}

impl TripMetrics {
    pub fn new(
        distance_km: f64,
        base_duration_seconds: u32,
        traffic_duration_seconds: Option<u32>,
        travel_mode: TravelMode,
        departure: OffsetDateTime,
    ) -> Self {
        Self {
            distance_km: distance_km.max(0.0),
            base_duration_seconds: Some(base_duration_seconds),
            traffic_duration_seconds,
            travel_mode,
            departure,
        }
    }

    pub fn from_leg(leg: &RouteLeg, travel_mode: TravelMode, departure: OffsetDateTime) -> Self {
        let distance_km = leg
            .distance_meters
            .map(|meters| meters.max(0.0) / 1000.0)
            .unwrap_or(0.0);
        Self {
            distance_km,
            base_duration_seconds: leg.duration_seconds,
            traffic_duration_seconds: leg.duration_in_traffic_seconds,
            travel_mode,
            departure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAvailability {
    pub has_traffic: bool,
    pub has_weather: bool,
    pub has_incidents: bool,
}

/// Output of one assessment. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryModel {
    pub mode: TravelMode,
    pub distance_km: f64,
    pub duration_minutes: u32,
    #[serde(serialize_with = "serialize_clock")]
    pub arrival_time: Time,
    pub traffic_delay_minutes: Option<u32>,
    pub traffic_tier: TrafficTier,
    pub weather_summary: String,
    pub weather_impact_tier: Tier,
    pub peak_hour: bool,
    pub risk_tier: Tier,
    pub risk_score: u8,
    pub confidence_tier: Tier,
    pub advice: Advice,
    pub data_availability: DataAvailability,
    pub current_temperature_celsius: Option<f64>,
    pub weather_condition: Option<String>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error("route data has no usable duration")]
    MissingRouteData,
}

/// Rounds a duration in seconds to whole minutes, halves rounding up.
pub fn round_minutes(seconds: u32) -> u32 {
    (f64::from(seconds) / 60.0).round() as u32
}

/// Adds `minutes` to the departure wall-clock time, wrapping at midnight.
pub fn arrival_clock(departure: OffsetDateTime, minutes: u32) -> Time {
    departure.time() + time::Duration::minutes(i64::from(minutes))
}

fn serialize_clock<S>(clock: &Time, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{:02}:{:02}", clock.hour(), clock.minute()))
}
