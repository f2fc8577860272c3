//! Lyrics resolution engine
//!
//! This module provides:
//! - Query normalization and variant generation for noisy tags
//! - Provider clients (LRCLIB, lyrics.ovh, NetEase) behind one trait
//! - Expiring cache and manual override stores
//! - The resolver that cascades variants across providers

pub mod cache;
pub mod connectivity;
pub mod lrc;
pub mod lrclib;
pub mod manual;
pub mod netease;
pub mod normalize;
pub mod ovh;
pub mod resolver;
pub mod source;
pub mod variants;

pub use resolver::Resolver;

use crate::config::Config;
use crate::storage::Storage;
use std::sync::Arc;

/// A song to look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub title: String,
    pub artist: String,
}

impl Query {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() || self.artist.trim().is_empty()
    }

    /// Key shared by the cache and manual stores. Case-insensitive.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.artist.to_lowercase(), self.title.to_lowercase())
    }
}

/// Why a resolution ended in [`ResolutionOutcome::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Blank title or artist. Retrying will not help.
    Validation,
    /// No network and nothing stored locally. Retry later.
    Connectivity,
    /// The caller cancelled the resolution.
    Cancelled,
    /// Storage or task failure outside any single provider.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Success { lyrics: String, source: String },
    NotFound,
    Error { kind: FailureKind, message: String },
}

impl ResolutionOutcome {
    pub(crate) fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }
}

/// Compose a resolver from config: SQLite storage under the data dir, the
/// configured providers, and a route probe unless forced offline.
pub fn build_resolver(cfg: &Config, force_offline: bool) -> anyhow::Result<Resolver> {
    let db_path = cfg.paths.data_dir.join("lyrics.sqlite3");
    let store: Arc<dyn crate::storage::KeyValueStore> = Arc::new(Storage::open(&db_path)?);

    let timeout = cfg.lyrics.timeout();
    let sources = source::build_sources(&cfg.lyrics.sources, timeout, &cfg.lyrics.user_agent)?;

    let gate: Arc<dyn connectivity::ConnectivityGate> = if force_offline || cfg.network.offline {
        Arc::new(connectivity::StaticGate::new(false))
    } else {
        Arc::new(connectivity::RouteProbe::new(cfg.network.probe_addr))
    };

    let clock: Arc<dyn cache::Clock> = Arc::new(cache::SystemClock);
    let cache = cache::CacheStore::new(store.clone(), clock.clone(), cfg.lyrics.cache_ttl());
    let manual = manual::ManualStore::new(store, clock);

    Ok(Resolver::new(sources, cache, manual, gate).with_timeout(timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_case_insensitive() {
        let a = Query::new("Hey Jude", "The Beatles");
        let b = Query::new("HEY JUDE", "the beatles");
        assert_eq!(a.storage_key(), "the beatles_hey jude");
        assert_eq!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn test_blank_detection() {
        assert!(Query::new("", "Artist").is_blank());
        assert!(Query::new("Title", "   ").is_blank());
        assert!(!Query::new("Title", "Artist").is_blank());
    }

    #[test]
    fn test_build_resolver_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.paths.data_dir = dir.path().to_path_buf();

        let resolver = build_resolver(&cfg, true).unwrap();
        assert_eq!(resolver.source_names(), vec!["lrclib", "lyrics_ovh", "netease"]);
        assert!(dir.path().join("lyrics.sqlite3").exists());
    }
}
