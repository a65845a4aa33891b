//! Prioritized advice rules. The first matching rule wins.

use crate::prediction::{Advice, Severity, TravelMode};
use crate::weather::classifier::WeatherImpact;

/// Delays strictly above this many minutes advise deferring departure.
pub const DEFER_DEPARTURE_DELAY_MINUTES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviceContext {
    pub mode: TravelMode,
    pub traffic_delay_minutes: Option<u32>,
    pub weather: WeatherImpact,
    pub peak_hour: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceRule {
    AdverseWeatherOnFoot,
    HeavyDelayOnRoad,
    CrowdedTransit,
    HazardousWeather,
    Favorable,
}

/// Evaluation order. `Favorable` matches everything and must stay last.
pub const RULES: [AdviceRule; 5] = [
    AdviceRule::AdverseWeatherOnFoot,
    AdviceRule::HeavyDelayOnRoad,
    AdviceRule::CrowdedTransit,
    AdviceRule::HazardousWeather,
    AdviceRule::Favorable,
];

impl AdviceRule {
    pub fn matches(self, ctx: &AdviceContext) -> bool {
        match self {
            AdviceRule::AdverseWeatherOnFoot => {
                ctx.mode == TravelMode::Walking && ctx.weather.is_adverse()
            }
            AdviceRule::HeavyDelayOnRoad => {
                ctx.mode == TravelMode::Driving
                    && ctx
                        .traffic_delay_minutes
                        .is_some_and(|delay| delay > DEFER_DEPARTURE_DELAY_MINUTES)
            }
            AdviceRule::CrowdedTransit => ctx.mode == TravelMode::Transit && ctx.peak_hour,
            AdviceRule::HazardousWeather => ctx.weather == WeatherImpact::High,
            AdviceRule::Favorable => true,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            AdviceRule::AdverseWeatherOnFoot => Severity::Warning,
            AdviceRule::HeavyDelayOnRoad => Severity::Danger,
            AdviceRule::CrowdedTransit => Severity::Info,
            AdviceRule::HazardousWeather => Severity::Danger,
            AdviceRule::Favorable => Severity::Success,
        }
    }

    pub fn outcome(self, ctx: &AdviceContext) -> Advice {
        let (title, body) = match self {
            AdviceRule::AdverseWeatherOnFoot => (
                "Conditions difficiles",
                "Pluie ou vent fort détectés. Envisagez les transports en commun ou un VTC."
                    .to_string(),
            ),
            AdviceRule::HeavyDelayOnRoad => (
                "Trafic perturbé",
                format!(
                    "Retard estimé de {} min. Départ différé conseillé si possible.",
                    ctx.traffic_delay_minutes.unwrap_or_default()
                ),
            ),
            AdviceRule::CrowdedTransit => (
                "Heure de pointe",
                "Les transports peuvent être bondés. Prévoyez une marge de temps.".to_string(),
            ),
            AdviceRule::HazardousWeather => (
                "Météo dangereuse",
                "Visibilité réduite et risques de glissade. Prudence absolue.".to_string(),
            ),
            AdviceRule::Favorable => (
                "Conditions favorables",
                "Bonne route ! Les conditions sont optimales.".to_string(),
            ),
        };
        Advice {
            title: title.to_string(),
            body,
            severity: self.severity(),
        }
    }
}

pub fn select_rule(ctx: &AdviceContext) -> AdviceRule {
    RULES
        .into_iter()
        .find(|rule| rule.matches(ctx))
        .unwrap_or(AdviceRule::Favorable)
}

pub fn select(ctx: &AdviceContext) -> Advice {
    select_rule(ctx).outcome(ctx)
}
