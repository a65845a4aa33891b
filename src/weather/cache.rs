//! Keyed, TTL-bounded store in front of the weather source.
//!
//! Expired entries are removed lazily by the lookup that finds them. There
//! is no background sweep. An optional capacity bounds memory for
//! long-running processes.

use crate::error::AppError;
use crate::weather::{Coordinates, WeatherPayload};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Live,
    Weekly,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Live => write!(f, "live"),
            QueryKind::Weekly => write!(f, "weekly"),
        }
    }
}

/// Latitude/longitude rounded to two decimals (~1km cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoCell {
    lat_centi: i32,
    lng_centi: i32,
}

impl GeoCell {
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            lat_centi: (coordinates.lat * 100.0).round() as i32,
            lng_centi: (coordinates.lng * 100.0).round() as i32,
        }
    }
}

impl fmt::Display for GeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}-{:.2}",
            f64::from(self.lat_centi) / 100.0,
            f64::from(self.lng_centi) / 100.0
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub cell: GeoCell,
    pub kind: QueryKind,
}

impl CacheKey {
    pub fn new(coordinates: Coordinates, kind: QueryKind) -> Self {
        Self {
            cell: GeoCell::from_coordinates(coordinates),
            kind,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.cell)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: WeatherPayload,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    max_entries: Option<usize>,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl WeatherCache {
    /// Expired entries are dropped lazily on read. A bounded cache
    /// (`max_entries`) also sweeps expired entries when a put finds it full,
    /// before evicting the oldest insertion.
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.filter(|max| *max > 0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: CacheKey) -> Result<Option<WeatherPayload>, AppError> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: CacheKey, now: Instant) -> Result<Option<WeatherPayload>, AppError> {
        {
            let guard = self.entries.read().map_err(|_| AppError::StateLock)?;
            match guard.get(&key) {
                None => return Ok(None),
                Some(entry) if self.is_fresh(entry, now) => {
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => {}
            }
        }

        let mut guard = self.entries.write().map_err(|_| AppError::StateLock)?;
        // A concurrent put may have refreshed the entry between the two locks.
        if let Some(entry) = guard.get(&key) {
            if self.is_fresh(entry, now) {
                return Ok(Some(entry.payload.clone()));
            }
            guard.remove(&key);
            debug!(key = %key, "Evicted expired weather cache entry");
        }
        Ok(None)
    }

    pub fn put(&self, key: CacheKey, payload: WeatherPayload) -> Result<(), AppError> {
        self.put_at(key, payload, Instant::now())
    }

    pub fn put_at(
        &self,
        key: CacheKey,
        payload: WeatherPayload,
        now: Instant,
    ) -> Result<(), AppError> {
        let mut guard = self.entries.write().map_err(|_| AppError::StateLock)?;

        if let Some(max_entries) = self.max_entries
            && !guard.contains_key(&key)
            && guard.len() >= max_entries
        {
            guard.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < self.ttl);
            if guard.len() >= max_entries
                && let Some(oldest) = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| *key)
            {
                guard.remove(&oldest);
                debug!(key = %oldest, "Evicted oldest weather cache entry at capacity");
            }
        }

        guard.insert(
            key,
            CacheEntry {
                payload,
                inserted_at: now,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> Result<usize, AppError> {
        let guard = self.entries.read().map_err(|_| AppError::StateLock)?;
        Ok(guard.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, None)
    }
}
