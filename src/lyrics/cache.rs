//! Time-expiring store of resolved lyrics.
//!
//! Entries are structured JSON records under the `cache:` prefix of the shared
//! key-value storage. Expiry is checked lazily on read; there is no sweep.

use crate::storage::KeyValueStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

const KEY_PREFIX: &str = "cache:";

pub const DEFAULT_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

pub(crate) fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub lyrics: String,
    pub source: String,
    /// Unix milliseconds.
    pub stored_at: i64,
}

impl CacheEntry {
    fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms < self.stored_at.saturating_add(ttl_ms)
    }
}

#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    fn storage_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    /// Fresh entry for `key`. A stale entry is deleted and reported as absent.
    pub fn get(&self, key: &str) -> anyhow::Result<Option<CacheEntry>> {
        let Some(raw) = self.store.get(&Self::storage_key(key))? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("dropping unreadable cache entry {key}: {e}");
                self.delete(key)?;
                return Ok(None);
            }
        };

        if entry.is_fresh(unix_millis(self.clock.now()), self.ttl) {
            Ok(Some(entry))
        } else {
            tracing::debug!("cache entry {key} expired");
            self.delete(key)?;
            Ok(None)
        }
    }

    pub fn put(&self, key: &str, lyrics: &str, source: &str) -> anyhow::Result<()> {
        let entry = CacheEntry {
            lyrics: lyrics.to_string(),
            source: source.to_string(),
            stored_at: unix_millis(self.clock.now()),
        };
        let raw = serde_json::to_string(&entry).context("serialize cache entry")?;
        self.store.put(&Self::storage_key(key), &raw)
    }

    pub fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.store.delete(&Self::storage_key(key))
    }
}

/// Clock pinned to a settable instant.
#[cfg(test)]
#[derive(Debug)]
pub struct FixedClock(std::sync::Mutex<OffsetDateTime>);

#[cfg(test)]
impl FixedClock {
    pub fn new(at: OffsetDateTime) -> Self {
        Self(std::sync::Mutex::new(at))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}
