//! Additive risk score over traffic, weather and peak-hour context.

use crate::prediction::{Tier, TrafficTier};
use crate::weather::classifier::WeatherImpact;
use serde::Deserialize;
use time::{OffsetDateTime, Weekday};

pub const HIGH_RISK_ABOVE: u8 = 60;
pub const MEDIUM_RISK_ABOVE: u8 = 30;

/// A `[start_hour, end_hour)` window on weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 2]")]
pub struct PeakWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl From<[u8; 2]> for PeakWindow {
    fn from([start_hour, end_hour]: [u8; 2]) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }
}

impl PeakWindow {
    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Weekday windows with elevated ambient traffic. Weekends never count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakHours {
    windows: Vec<PeakWindow>,
}

impl PeakHours {
    pub fn new(windows: Vec<PeakWindow>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[PeakWindow] {
        &self.windows
    }

    /// Evaluated on the wall clock of the instant's own offset.
    pub fn is_peak(&self, at: OffsetDateTime) -> bool {
        if matches!(at.weekday(), Weekday::Saturday | Weekday::Sunday) {
            return false;
        }
        let hour = at.hour();
        self.windows.iter().any(|window| window.contains(hour))
    }
}

impl Default for PeakHours {
    fn default() -> Self {
        Self::new(vec![PeakWindow::from([7, 10]), PeakWindow::from([16, 20])])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: u8,
    pub tier: Tier,
}

pub fn score(traffic: TrafficTier, weather: WeatherImpact, peak_hour: bool) -> RiskAssessment {
    let traffic_points: u8 = match traffic {
        TrafficTier::Heavy => 40,
        TrafficTier::Moderate => 20,
        TrafficTier::Fluid | TrafficTier::Unknown => 0,
    };
    // Unknown weather adds nothing; the missing data shows up in confidence.
    let weather_points: u8 = match weather {
        WeatherImpact::High => 40,
        WeatherImpact::Medium => 20,
        WeatherImpact::Low | WeatherImpact::Unknown => 0,
    };
    let peak_points: u8 = if peak_hour { 20 } else { 0 };

    let score = traffic_points + weather_points + peak_points;
    RiskAssessment {
        score,
        tier: tier_for_score(score),
    }
}

pub fn tier_for_score(score: u8) -> Tier {
    if score > HIGH_RISK_ABOVE {
        Tier::High
    } else if score > MEDIUM_RISK_ABOVE {
        Tier::Medium
    } else {
        Tier::Low
    }
}
