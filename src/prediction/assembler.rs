//! Orchestrates the classifiers into the final advisory model.

use crate::prediction::advice::{self, AdviceContext};
use crate::prediction::risk::{self, PeakHours};
use crate::prediction::traffic;
use crate::prediction::{
    AdvisoryModel, DataAvailability, PredictionError, Provenance, Tier, TravelMode, TripMetrics,
    arrival_clock,
};
use crate::weather::WeatherObservation;
use crate::weather::classifier;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PredictionAssembler {
    peak_hours: PeakHours,
}

impl PredictionAssembler {
    pub fn new(peak_hours: PeakHours) -> Self {
        Self { peak_hours }
    }

    pub fn peak_hours(&self) -> &PeakHours {
        &self.peak_hours
    }

    pub fn assemble(
        &self,
        metrics: &TripMetrics,
        weather: Option<&WeatherObservation>,
    ) -> Result<AdvisoryModel, PredictionError> {
        let duration_minutes =
            traffic::reported_duration_minutes(metrics).ok_or(PredictionError::MissingRouteData)?;

        let traffic = traffic::classify(metrics);
        let weather_class = classifier::classify(weather);
        let peak_hour = self.peak_hours.is_peak(metrics.departure);
        let risk = risk::score(traffic.tier, weather_class.impact, peak_hour);
        let advice = advice::select(&AdviceContext {
            mode: metrics.travel_mode,
            traffic_delay_minutes: traffic.delay_minutes,
            weather: weather_class.impact,
            peak_hour,
        });

        let has_weather = weather_class.is_available();
        let confidence_tier =
            confidence(metrics.travel_mode, traffic.has_live_traffic, has_weather);

        debug!(
            mode = ?metrics.travel_mode,
            traffic = ?traffic.tier,
            weather = ?weather_class.impact,
            peak_hour,
            risk_score = risk.score,
            "Assembled trip advisory"
        );

        Ok(AdvisoryModel {
            mode: metrics.travel_mode,
            distance_km: metrics.distance_km,
            duration_minutes,
            arrival_time: arrival_clock(metrics.departure, duration_minutes),
            traffic_delay_minutes: traffic.delay_minutes,
            traffic_tier: traffic.tier,
            weather_summary: weather_class.summary,
            weather_impact_tier: weather_class.impact.tier(),
            peak_hour,
            risk_tier: risk.tier,
            risk_score: risk.score,
            confidence_tier,
            advice,
            data_availability: DataAvailability {
                has_traffic: traffic.has_live_traffic,
                has_weather,
                has_incidents: false,
            },
            current_temperature_celsius: weather.map(|w| w.temperature_celsius),
            weather_condition: weather.map(|w| w.condition.clone()),
            provenance: Provenance::Genuine,
        })
    }
}

/// Traffic only counts toward confidence when driving.
pub fn confidence(mode: TravelMode, has_traffic: bool, has_weather: bool) -> Tier {
    match mode {
        TravelMode::Driving => match (has_traffic, has_weather) {
            (true, true) => Tier::High,
            (true, false) | (false, true) => Tier::Medium,
            (false, false) => Tier::Low,
        },
        TravelMode::Transit | TravelMode::Walking => {
            if has_weather {
                Tier::High
            } else {
                Tier::Medium
            }
        }
    }
}
