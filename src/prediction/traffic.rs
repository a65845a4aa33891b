//! Traffic classification from route duration vs duration under traffic.

use crate::prediction::{TrafficTier, TravelMode, TripMetrics, round_minutes};

/// Delays at or above this many minutes are classified as heavy traffic.
pub const HEAVY_DELAY_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficAssessment {
    /// `None` when traffic does not apply, never collapsed to zero.
    pub delay_minutes: Option<u32>,
    pub tier: TrafficTier,
    pub has_live_traffic: bool,
}

pub fn classify(metrics: &TripMetrics) -> TrafficAssessment {
    let live = match (metrics.travel_mode, metrics.traffic_duration_seconds) {
        (TravelMode::Driving, Some(seconds)) => Some(seconds),
        _ => None,
    };

    let (Some(traffic_seconds), Some(base_seconds)) = (live, metrics.base_duration_seconds) else {
        return TrafficAssessment {
            delay_minutes: None,
            tier: TrafficTier::Unknown,
            has_live_traffic: live.is_some(),
        };
    };

    let delay = round_minutes(traffic_seconds).saturating_sub(round_minutes(base_seconds));
    TrafficAssessment {
        delay_minutes: Some(delay),
        tier: tier_for_delay(delay),
        has_live_traffic: true,
    }
}

pub fn tier_for_delay(delay_minutes: u32) -> TrafficTier {
    match delay_minutes {
        0 => TrafficTier::Fluid,
        d if d < HEAVY_DELAY_MINUTES => TrafficTier::Moderate,
        _ => TrafficTier::Heavy,
    }
}

/// Reported trip duration in minutes; `None` when the leg carries no duration.
pub fn reported_duration_minutes(metrics: &TripMetrics) -> Option<u32> {
    let live = match metrics.travel_mode {
        TravelMode::Driving => metrics.traffic_duration_seconds,
        TravelMode::Transit | TravelMode::Walking => None,
    };
    live.or(metrics.base_duration_seconds).map(round_minutes)
}
