use crate::weather::cache::{CacheKey, QueryKind, WeatherCache};
use crate::weather::{
    Coordinates, WeatherError, WeatherObservation, WeatherPayload, WeeklyForecast,
    parse_live_payload, parse_weekly_payload,
};
use std::fmt;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "http://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,precipitation_probability_max,windspeed_10m_max";

/// Upstream provider of weather data. Implementations may block.
pub trait WeatherSource: Send + Sync + fmt::Debug {
    fn live(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherError>;

    fn weekly(&self, coordinates: Coordinates) -> Result<WeeklyForecast, WeatherError>;
}

/// Open-Meteo forecast API over plain HTTP.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    endpoint: String,
    timeout: Duration,
}

impl OpenMeteoSource {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    fn url(&self, coordinates: Coordinates, query: &str) -> String {
        format!(
            "{}?latitude={}&longitude={}&{}",
            self.endpoint, coordinates.lat, coordinates.lng, query
        )
    }
}

impl Default for OpenMeteoSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT.to_string(), DEFAULT_TIMEOUT)
    }
}

impl WeatherSource for OpenMeteoSource {
    fn live(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherError> {
        let url = self.url(coordinates, "current_weather=true");
        let body = send_http_get(&url, self.timeout)?;
        parse_live_payload(&body, OffsetDateTime::now_utc())
    }

    fn weekly(&self, coordinates: Coordinates) -> Result<WeeklyForecast, WeatherError> {
        let url = self.url(coordinates, &format!("daily={DAILY_FIELDS}&timezone=auto"));
        let body = send_http_get(&url, self.timeout)?;
        parse_weekly_payload(&body)
    }
}

/// Serves fixed payloads. Used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWeatherSource {
    pub live: Option<WeatherObservation>,
    pub weekly: Option<WeeklyForecast>,
}

impl WeatherSource for StaticWeatherSource {
    fn live(&self, _coordinates: Coordinates) -> Result<WeatherObservation, WeatherError> {
        self.live.clone().ok_or(WeatherError::Disabled)
    }

    fn weekly(&self, _coordinates: Coordinates) -> Result<WeeklyForecast, WeatherError> {
        self.weekly.clone().ok_or(WeatherError::Disabled)
    }
}

/// Consults the cache before the source and stores fresh fetches.
#[derive(Debug, Clone)]
pub struct CachedWeather {
    cache: Arc<WeatherCache>,
    source: Arc<dyn WeatherSource>,
}

impl CachedWeather {
    pub fn new(cache: Arc<WeatherCache>, source: Arc<dyn WeatherSource>) -> Self {
        Self { cache, source }
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn live(&self, coordinates: Coordinates) -> Result<WeatherObservation, WeatherError> {
        let key = CacheKey::new(coordinates, QueryKind::Live);
        if let Some(WeatherPayload::Live(observation)) = self.cache.get(key)? {
            debug!(key = %key, "Weather cache hit");
            return Ok(observation);
        }
        debug!(key = %key, "Weather cache miss");

        let observation = self.source.live(coordinates).inspect_err(|err| {
            warn!(error = %err, key = %key, "Live weather fetch failed");
        })?;
        self.cache
            .put(key, WeatherPayload::Live(observation.clone()))?;
        Ok(observation)
    }

    pub fn weekly(&self, coordinates: Coordinates) -> Result<WeeklyForecast, WeatherError> {
        let key = CacheKey::new(coordinates, QueryKind::Weekly);
        if let Some(WeatherPayload::Weekly(forecast)) = self.cache.get(key)? {
            debug!(key = %key, "Weather cache hit");
            return Ok(forecast);
        }
        debug!(key = %key, "Weather cache miss");

        let forecast = self.source.weekly(coordinates).inspect_err(|err| {
            warn!(error = %err, key = %key, "Weekly forecast fetch failed");
        })?;
        self.cache
            .put(key, WeatherPayload::Weekly(forecast.clone()))?;
        Ok(forecast)
    }
}

struct ParsedUrl {
    host: String,
    port: u16,
    path: String,
}

fn parse_http_url(endpoint: &str) -> Result<ParsedUrl, WeatherError> {
    let trimmed = endpoint
        .strip_prefix("http://")
        .ok_or_else(|| WeatherError::InvalidUrl("only http:// supported".to_string()))?;

    let split_at = trimmed.find(['/', '?']).unwrap_or(trimmed.len());
    let (host_port, rest) = trimmed.split_at(split_at);
    if host_port.is_empty() {
        return Err(WeatherError::InvalidUrl("missing host".to_string()));
    }
    let path = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    };

    let (host, port) = match host_port.split_once(':') {
        Some((host, port_str)) if !port_str.is_empty() => {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| WeatherError::InvalidUrl("invalid port".to_string()))?;
            (host, port)
        }
        Some((host, _)) => (host, 80),
        None => (host_port, 80),
    };
    if host.is_empty() {
        return Err(WeatherError::InvalidUrl("missing host".to_string()));
    }

    Ok(ParsedUrl {
        host: host.to_string(),
        port,
        path,
    })
}

// HTTP/1.0 keeps the response body unchunked.
fn send_http_get(url: &str, timeout: Duration) -> Result<String, WeatherError> {
    let parsed = parse_http_url(url)?;
    let addr = (parsed.host.as_str(), parsed.port)
        .to_socket_addrs()
        .map_err(|err| WeatherError::Dns(err.to_string()))?
        .next()
        .ok_or_else(|| WeatherError::Dns("no addresses resolved".to_string()))?;

    let mut stream = TcpStream::connect_timeout(&addr, timeout).map_err(WeatherError::Connect)?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(WeatherError::Io)?;
    stream
        .set_write_timeout(Some(timeout))
        .map_err(WeatherError::Io)?;

    let request = format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n\r\n",
        parsed.path, parsed.host
    );
    stream
        .write_all(request.as_bytes())
        .map_err(WeatherError::Io)?;

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .map_err(WeatherError::Io)?;

    split_http_response(&response)
}

fn split_http_response(response: &str) -> Result<String, WeatherError> {
    let (headers, body) = response
        .split_once("\r\n\r\n")
        .ok_or_else(|| WeatherError::Http(0, "invalid http response".to_string()))?;

    let status_line = headers
        .lines()
        .next()
        .ok_or_else(|| WeatherError::Http(0, "missing status line".to_string()))?;
    let status_code = status_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| WeatherError::Http(0, "missing status code".to_string()))?
        .parse::<u16>()
        .map_err(|_| WeatherError::Http(0, "invalid status code".to_string()))?;

    if status_code >= 400 {
        return Err(WeatherError::Http(status_code, body.trim().to_string()));
    }

    Ok(body.to_string())
}
