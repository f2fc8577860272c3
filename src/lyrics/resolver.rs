//! Resolution orchestration.
//!
//! Order of checks for every call: input validation, manual override, cache,
//! connectivity, then providers. Providers run either as a sequential cascade
//! over all query variants or as a race over the original query only.

use super::cache::CacheStore;
use super::connectivity::ConnectivityGate;
use super::manual::ManualStore;
use super::source::{lookup_bounded, LyricsSource};
use super::variants;
use super::{FailureKind, Query, ResolutionOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Attribution for results served from the manual override store.
pub const MANUAL_SOURCE: &str = "Manual";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cascade,
    Racing,
}

/// Result of the provider phase.
enum Probe {
    Hit { lyrics: String, source: String },
    Exhausted,
    Cancelled,
}

#[derive(Clone)]
pub struct Resolver {
    sources: Vec<Arc<dyn LyricsSource>>,
    cache: CacheStore,
    manual: ManualStore,
    gate: Arc<dyn ConnectivityGate>,
    timeout: Duration,
}

impl Resolver {
    /// `sources` are tried in the given order.
    pub fn new(
        sources: Vec<Arc<dyn LyricsSource>>,
        cache: CacheStore,
        manual: ManualStore,
        gate: Arc<dyn ConnectivityGate>,
    ) -> Self {
        Self {
            sources,
            cache,
            manual,
            gate,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-call bound for each provider lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, title: &str, artist: &str) -> ResolutionOutcome {
        self.resolve_cancellable(title, artist, &CancellationToken::new())
            .await
    }

    pub async fn resolve_cancellable(
        &self,
        title: &str,
        artist: &str,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        self.run(Query::new(title, artist), Mode::Cascade, cancel)
            .await
    }

    /// Ask every provider at once for the unmodified query; first text wins.
    pub async fn resolve_racing(&self, title: &str, artist: &str) -> ResolutionOutcome {
        self.resolve_racing_cancellable(title, artist, &CancellationToken::new())
            .await
    }

    pub async fn resolve_racing_cancellable(
        &self,
        title: &str,
        artist: &str,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        self.run(Query::new(title, artist), Mode::Racing, cancel)
            .await
    }

    /// Store user lyrics for `(title, artist)`. Bypasses providers and cache.
    pub fn save_manual_override(&self, title: &str, artist: &str, lyrics: &str) -> anyhow::Result<()> {
        let query = Query::new(title, artist);
        anyhow::ensure!(!query.is_blank(), "title and artist must not be blank");
        anyhow::ensure!(!lyrics.trim().is_empty(), "lyrics must not be blank");
        self.manual.put(&query.storage_key(), lyrics)?;
        tracing::info!("saved manual lyrics for {title:?} / {artist:?}");
        Ok(())
    }

    pub fn clear_manual_override(&self, title: &str, artist: &str) -> anyhow::Result<()> {
        let query = Query::new(title, artist);
        anyhow::ensure!(!query.is_blank(), "title and artist must not be blank");
        self.manual.delete(&query.storage_key())
    }

    async fn run(&self, query: Query, mode: Mode, cancel: &CancellationToken) -> ResolutionOutcome {
        if query.is_blank() {
            return ResolutionOutcome::error(
                FailureKind::Validation,
                "title and artist must not be blank",
            );
        }

        match self.try_run(&query, mode, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("resolving {:?} / {:?} failed: {e:#}", query.title, query.artist);
                ResolutionOutcome::error(FailureKind::Unexpected, format!("{e:#}"))
            }
        }
    }

    async fn try_run(
        &self,
        query: &Query,
        mode: Mode,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ResolutionOutcome> {
        let key = query.storage_key();

        if let Some(entry) = self.manual.get(&key)? {
            tracing::debug!("manual override for {key}");
            return Ok(ResolutionOutcome::Success {
                lyrics: entry.lyrics,
                source: MANUAL_SOURCE.to_string(),
            });
        }

        if let Some(entry) = self.cache.get(&key)? {
            tracing::debug!("cache hit for {key} ({})", entry.source);
            return Ok(ResolutionOutcome::Success {
                lyrics: entry.lyrics,
                source: entry.source,
            });
        }

        if !self.gate.is_reachable() {
            return Ok(ResolutionOutcome::error(
                FailureKind::Connectivity,
                "no connectivity",
            ));
        }

        let probe = match mode {
            Mode::Cascade => self.cascade(query, cancel).await,
            Mode::Racing => self.race(query, cancel).await,
        };

        match probe {
            Probe::Hit { .. } | Probe::Cancelled if cancel.is_cancelled() => Ok(cancelled()),
            Probe::Hit { lyrics, source } => {
                if let Err(e) = self.cache.put(&key, &lyrics, &source) {
                    tracing::warn!("could not cache lyrics for {key}: {e:#}");
                }
                Ok(ResolutionOutcome::Success { lyrics, source })
            }
            Probe::Cancelled => Ok(cancelled()),
            Probe::Exhausted => {
                tracing::info!("no lyrics for {:?} / {:?}", query.title, query.artist);
                Ok(ResolutionOutcome::NotFound)
            }
        }
    }

    /// Every variant against every source, in order, until the first text.
    async fn cascade(&self, query: &Query, cancel: &CancellationToken) -> Probe {
        let variants = variants::generate(query);
        tracing::debug!("{} variants for {:?} / {:?}", variants.len(), query.title, query.artist);

        for (idx, variant) in variants.iter().enumerate() {
            for source in &self.sources {
                let lookup = lookup_bounded(
                    source.as_ref(),
                    &variant.title,
                    &variant.artist,
                    self.timeout,
                );
                let found = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Probe::Cancelled,
                    found = lookup => found,
                };

                if let Some(lyrics) = found {
                    tracing::info!(
                        "{} matched variant {idx} {:?} / {:?}",
                        source.name(),
                        variant.title,
                        variant.artist
                    );
                    return Probe::Hit {
                        lyrics,
                        source: source.name().to_string(),
                    };
                }
            }
        }

        Probe::Exhausted
    }

    /// All sources concurrently on the original query. Losers are aborted and
    /// their results, if any arrive, are dropped with the set.
    async fn race(&self, query: &Query, cancel: &CancellationToken) -> Probe {
        let mut set = JoinSet::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let title = query.title.clone();
            let artist = query.artist.clone();
            let timeout = self.timeout;
            set.spawn(async move {
                lookup_bounded(source.as_ref(), &title, &artist, timeout)
                    .await
                    .map(|lyrics| (lyrics, source.name().to_string()))
            });
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    set.abort_all();
                    return Probe::Cancelled;
                }
                joined = set.join_next() => joined,
            };

            match joined {
                None => return Probe::Exhausted,
                Some(Ok(Some((lyrics, source)))) => {
                    set.abort_all();
                    tracing::info!("{source} won the race for {:?} / {:?}", query.title, query.artist);
                    return Probe::Hit { lyrics, source };
                }
                Some(Ok(None)) => {}
                Some(Err(e)) => tracing::warn!("racing lookup task failed: {e}"),
            }
        }
    }
}

fn cancelled() -> ResolutionOutcome {
    ResolutionOutcome::error(FailureKind::Cancelled, "cancelled")
}
