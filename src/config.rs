use crate::prediction::risk::{PeakHours, PeakWindow};
use crate::weather::cache::DEFAULT_TTL;
use crate::weather::source::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub cache: Option<CacheSection>,
    #[serde(default)]
    pub weather: Option<WeatherSection>,
    #[serde(default)]
    pub peak_hours: Option<PeakHoursSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSection {
    /// Entry time-to-live in seconds (default: 600)
    pub ttl_secs: Option<u64>,
    /// Upper bound on cached entries; unbounded when absent
    pub max_entries: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSection {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeakHoursSection {
    /// `[start_hour, end_hour)` pairs, weekdays only
    pub windows: Vec<PeakWindow>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(section) = &self.peak_hours {
            for window in &section.windows {
                if window.start_hour >= window.end_hour || window.end_hour > 24 {
                    return Err(ConfigError::Invalid(format!(
                        "peak window [{}, {}) is not a valid hour range",
                        window.start_hour, window.end_hour
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache
            .as_ref()
            .and_then(|c| c.ttl_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL)
    }

    pub fn cache_max_entries(&self) -> Option<usize> {
        self.cache.as_ref().and_then(|c| c.max_entries)
    }

    pub fn weather_enabled(&self) -> bool {
        self.weather
            .as_ref()
            .and_then(|w| w.enabled)
            .unwrap_or(true)
    }

    pub fn weather_endpoint(&self) -> &str {
        self.weather
            .as_ref()
            .and_then(|w| w.endpoint.as_deref())
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn weather_timeout(&self) -> Duration {
        self.weather
            .as_ref()
            .and_then(|w| w.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn peak_hours(&self) -> PeakHours {
        match &self.peak_hours {
            Some(section) => PeakHours::new(section.windows.clone()),
            None => PeakHours::default(),
        }
    }
}
