//! Placeholder advisory for when the primary computation cannot run.
//!
//! Only the caller's error path uses this; the assembler never does.

use crate::prediction::{
    Advice, AdvisoryModel, DataAvailability, Provenance, Severity, Tier, TrafficTier, TravelMode,
    arrival_clock,
};
use time::OffsetDateTime;

pub const FALLBACK_DURATION_MINUTES: u32 = 20;
pub const FALLBACK_DISTANCE_KM: f64 = 8.0;
pub const FALLBACK_RISK_SCORE: u8 = 15;
pub const FALLBACK_WEATHER_SUMMARY: &str = "Dégagé (estimation)";

pub fn synthesize(mode: TravelMode, departure: OffsetDateTime) -> AdvisoryModel {
    AdvisoryModel {
        mode,
        distance_km: FALLBACK_DISTANCE_KM,
        duration_minutes: FALLBACK_DURATION_MINUTES,
        arrival_time: arrival_clock(departure, FALLBACK_DURATION_MINUTES),
        traffic_delay_minutes: None,
        traffic_tier: TrafficTier::Unknown,
        weather_summary: FALLBACK_WEATHER_SUMMARY.to_string(),
        weather_impact_tier: Tier::Low,
        peak_hour: false,
        risk_tier: Tier::Low,
        risk_score: FALLBACK_RISK_SCORE,
        confidence_tier: Tier::Low,
        advice: Advice {
            title: "Estimation approximative".to_string(),
            body: advice_body(mode).to_string(),
            severity: Severity::Success,
        },
        data_availability: DataAvailability {
            has_traffic: false,
            has_weather: false,
            has_incidents: false,
        },
        current_temperature_celsius: None,
        weather_condition: None,
        provenance: Provenance::Fallback,
    }
}

// Only a road trip can plausibly be described as flowing traffic.
fn advice_body(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "Trafic fluide, météo favorable, aucun accident signalé. Bonne route !",
        TravelMode::Transit | TravelMode::Walking => {
            "Météo favorable, aucun incident signalé. Bon trajet !"
        }
    }
}
