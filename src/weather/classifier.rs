//! Maps a raw weather observation into impact labels.

use crate::prediction::Tier;
use crate::weather::WeatherObservation;

/// Summary reported when no observation was supplied.
pub const WEATHER_UNAVAILABLE: &str = "Non disponible";
/// Wind speeds strictly above this are severe.
pub const SEVERE_WIND_KMH: f64 = 40.0;

const STORM_TOKENS: &[&str] = &["storm", "orage"];
const RAIN_TOKENS: &[&str] = &["rain", "pluie", "drizzle", "bruine", "averse"];

/// Weather impact with an explicit state for missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherImpact {
    Unknown,
    Low,
    Medium,
    High,
}

impl WeatherImpact {
    /// Display tier. `Unknown` is reported as `Low`; data availability
    /// flags and confidence carry the difference.
    pub fn tier(self) -> Tier {
        match self {
            WeatherImpact::Unknown | WeatherImpact::Low => Tier::Low,
            WeatherImpact::Medium => Tier::Medium,
            WeatherImpact::High => Tier::High,
        }
    }

    pub fn is_adverse(self) -> bool {
        matches!(self, WeatherImpact::Medium | WeatherImpact::High)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherClassification {
    pub impact: WeatherImpact,
    pub summary: String,
}

impl WeatherClassification {
    pub fn is_available(&self) -> bool {
        self.impact != WeatherImpact::Unknown
    }
}

pub fn classify(observation: Option<&WeatherObservation>) -> WeatherClassification {
    let Some(observation) = observation else {
        return WeatherClassification {
            impact: WeatherImpact::Unknown,
            summary: WEATHER_UNAVAILABLE.to_string(),
        };
    };

    let condition = observation.condition.to_lowercase();
    let impact = if observation.wind_speed_kmh > SEVERE_WIND_KMH
        || contains_any(&condition, STORM_TOKENS)
    {
        WeatherImpact::High
    } else if contains_any(&condition, RAIN_TOKENS) {
        WeatherImpact::Medium
    } else {
        WeatherImpact::Low
    };

    let summary = if observation.condition.trim().is_empty() {
        WEATHER_UNAVAILABLE.to_string()
    } else {
        observation.condition.clone()
    };

    WeatherClassification { impact, summary }
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| haystack.contains(token))
}
