use smartmove::prediction::assembler::PredictionAssembler;
use smartmove::prediction::{
    PredictionError, Provenance, RouteLeg, Severity, Tier, TrafficTier, TravelMode, TripMetrics,
    fallback,
};
use smartmove::state::AppState;
use smartmove::weather::cache::WeatherCache;
use smartmove::weather::source::{CachedWeather, StaticWeatherSource};
use smartmove::weather::{Coordinates, WeatherObservation};
use std::sync::{Arc, RwLock};
use time::macros::{datetime, time};

fn observation(condition: &str, wind_speed_kmh: f64) -> WeatherObservation {
    WeatherObservation {
        temperature_celsius: 14.0,
        wind_speed_kmh,
        condition: condition.to_string(),
        observed_at: None,
        has_fog: false,
    }
}

#[test]
fn morning_peak_drive_without_weather_is_low_risk() -> Result<(), PredictionError> {
    let metrics = TripMetrics::new(
        8.0,
        1080,
        Some(1080),
        TravelMode::Driving,
        datetime!(2026-10-19 9:00 +01:00),
    );

    let advisory = PredictionAssembler::default().assemble(&metrics, None)?;

    assert_eq!(advisory.traffic_tier, TrafficTier::Fluid);
    assert_eq!(advisory.traffic_delay_minutes, Some(0));
    assert!(advisory.peak_hour);
    assert_eq!(advisory.risk_score, 20);
    assert_eq!(advisory.risk_tier, Tier::Low);
    assert_eq!(advisory.weather_impact_tier, Tier::Low);
    assert_eq!(advisory.confidence_tier, Tier::Medium);
    assert_eq!(advisory.duration_minutes, 18);
    assert_eq!(advisory.arrival_time, time!(9:18));
    assert!(advisory.data_availability.has_traffic);
    assert!(!advisory.data_availability.has_weather);
    assert_eq!(advisory.provenance, Provenance::Genuine);
    Ok(())
}

#[test]
fn evening_rush_in_rain_is_high_risk() -> Result<(), PredictionError> {
    let metrics = TripMetrics::new(
        8.0,
        1080,
        Some(1680),
        TravelMode::Driving,
        datetime!(2026-10-19 18:00 +01:00),
    );
    let rain = observation("Pluie", 12.0);

    let advisory = PredictionAssembler::default().assemble(&metrics, Some(&rain))?;

    assert_eq!(advisory.traffic_delay_minutes, Some(10));
    assert_eq!(advisory.traffic_tier, TrafficTier::Heavy);
    assert_eq!(advisory.weather_impact_tier, Tier::Medium);
    assert_eq!(advisory.risk_score, 80);
    assert_eq!(advisory.risk_tier, Tier::High);
    assert_eq!(advisory.confidence_tier, Tier::High);
    assert_eq!(advisory.arrival_time, time!(18:28));
    // A ten minute delay is below the deferral threshold and rain is not hazardous.
    assert_eq!(advisory.advice.severity, Severity::Success);
    assert_eq!(advisory.weather_condition.as_deref(), Some("Pluie"));
    Ok(())
}

#[test]
fn walking_into_a_storm_warns() -> Result<(), PredictionError> {
    let metrics = TripMetrics::new(
        2.4,
        1800,
        None,
        TravelMode::Walking,
        datetime!(2026-10-19 12:00 +01:00),
    );
    let storm = observation("Orage", 50.0);

    let advisory = PredictionAssembler::default().assemble(&metrics, Some(&storm))?;

    assert_eq!(advisory.weather_impact_tier, Tier::High);
    assert_eq!(advisory.traffic_delay_minutes, None);
    assert_eq!(advisory.risk_score, 40);
    assert_eq!(advisory.risk_tier, Tier::Medium);
    assert_eq!(advisory.confidence_tier, Tier::High);
    assert_eq!(advisory.advice.severity, Severity::Warning);
    assert_eq!(advisory.arrival_time, time!(12:30));
    Ok(())
}

#[test]
fn late_departure_wraps_arrival_past_midnight() -> Result<(), PredictionError> {
    let metrics = TripMetrics::new(
        30.0,
        2700,
        None,
        TravelMode::Transit,
        datetime!(2026-10-19 23:40 +01:00),
    );

    let advisory = PredictionAssembler::default().assemble(&metrics, None)?;

    assert_eq!(advisory.arrival_time, time!(0:25));
    Ok(())
}

#[test]
fn leg_without_durations_cannot_be_assessed() {
    let leg = RouteLeg {
        distance_meters: Some(5000.0),
        duration_seconds: None,
        duration_in_traffic_seconds: None,
    };
    let metrics = TripMetrics::from_leg(&leg, TravelMode::Driving, datetime!(2026-10-19 8:00 UTC));

    let result = PredictionAssembler::default().assemble(&metrics, None);

    assert_eq!(result, Err(PredictionError::MissingRouteData));
}

#[test]
fn fallback_advisory_is_published_and_marked() -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(RwLock::new(AppState::default()));
    let receiver = {
        let guard = state.read().map_err(|_| "state lock poisoned")?;
        guard.subscribe_latest()
    };

    let advisory = fallback::synthesize(TravelMode::Driving, datetime!(2026-10-19 8:00 UTC));
    {
        let mut guard = state.write().map_err(|_| "state lock poisoned")?;
        guard.set_latest(advisory.clone())?;
    }

    let published = receiver.borrow().clone().ok_or("nothing published")?;
    assert_eq!(published.provenance, Provenance::Fallback);
    assert_eq!(published.risk_score, 15);
    assert_eq!(published.confidence_tier, Tier::Low);
    assert_eq!(published, advisory);
    Ok(())
}

#[test]
fn nearby_lookups_share_one_cache_entry() -> Result<(), Box<dyn std::error::Error>> {
    let source = StaticWeatherSource {
        live: Some(observation("Nuageux", 8.0)),
        weekly: None,
    };
    let weather = CachedWeather::new(Arc::new(WeatherCache::default()), Arc::new(source));

    let first = weather.live(Coordinates {
        lat: 33.5731,
        lng: -7.5898,
    })?;
    let second = weather.live(Coordinates {
        lat: 33.5729,
        lng: -7.5902,
    })?;

    assert_eq!(first, second);
    assert_eq!(weather.cache().len()?, 1);
    Ok(())
}
