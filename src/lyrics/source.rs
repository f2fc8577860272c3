//! Uniform interface over external lyrics providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A lyrics provider. Implementations report transport and decode problems as
/// errors; [`lookup_bounded`] turns those into "no result" for the resolver.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Attribution tag stored alongside cached results.
    fn name(&self) -> &str;

    async fn lookup(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>>;
}

/// Built-in providers, in their default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Lrclib,
    LyricsOvh,
    Netease,
}

impl SourceKind {
    pub const DEFAULT_ORDER: [SourceKind; 3] =
        [SourceKind::Lrclib, SourceKind::LyricsOvh, SourceKind::Netease];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Lrclib => "lrclib",
            SourceKind::LyricsOvh => "lyrics_ovh",
            SourceKind::Netease => "netease",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build provider clients in the configured order. Repeated kinds are kept once.
pub fn build_sources(
    kinds: &[SourceKind],
    timeout: Duration,
    user_agent: &str,
) -> anyhow::Result<Vec<Arc<dyn LyricsSource>>> {
    let mut seen = Vec::new();
    let mut sources: Vec<Arc<dyn LyricsSource>> = Vec::new();
    for kind in kinds {
        if seen.contains(kind) {
            tracing::warn!("source {kind} listed twice, ignoring repeat");
            continue;
        }
        seen.push(*kind);
        let source: Arc<dyn LyricsSource> = match kind {
            SourceKind::Lrclib => Arc::new(super::lrclib::LrclibClient::new(timeout, user_agent)?),
            SourceKind::LyricsOvh => Arc::new(super::ovh::OvhClient::new(timeout, user_agent)?),
            SourceKind::Netease => Arc::new(super::netease::NeteaseClient::new(timeout, user_agent)?),
        };
        sources.push(source);
    }
    Ok(sources)
}

/// Call one source with a hard time bound. Errors, timeouts and blank text
/// all come back as `None`; only the log sees them.
pub async fn lookup_bounded(
    source: &dyn LyricsSource,
    title: &str,
    artist: &str,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, source.lookup(title, artist)).await {
        Ok(Ok(Some(text))) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => {
            tracing::debug!("{}: nothing for {title:?} / {artist:?}", source.name());
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("{} lookup failed: {e:#}", source.name());
            None
        }
        Err(_) => {
            tracing::warn!("{} timed out after {timeout:?}", source.name());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(anyhow::Result<Option<String>>, Duration);

    #[async_trait]
    impl LyricsSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn lookup(&self, _title: &str, _artist: &str) -> anyhow::Result<Option<String>> {
            tokio::time::sleep(self.1).await;
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    const BOUND: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_text_passes_through() {
        let src = Fixed(Ok(Some("words".into())), Duration::ZERO);
        assert_eq!(lookup_bounded(&src, "t", "a", BOUND).await.as_deref(), Some("words"));
    }

    #[tokio::test]
    async fn test_error_becomes_absent() {
        let src = Fixed(Err(anyhow::anyhow!("boom")), Duration::ZERO);
        assert_eq!(lookup_bounded(&src, "t", "a", BOUND).await, None);
    }

    #[tokio::test]
    async fn test_blank_text_becomes_absent() {
        let src = Fixed(Ok(Some(" \n ".into())), Duration::ZERO);
        assert_eq!(lookup_bounded(&src, "t", "a", BOUND).await, None);
    }

    #[tokio::test]
    async fn test_timeout_becomes_absent() {
        let src = Fixed(Ok(Some("late".into())), Duration::from_millis(500));
        assert_eq!(lookup_bounded(&src, "t", "a", Duration::from_millis(20)).await, None);
    }

    #[test]
    fn test_source_kind_names() {
        let names: Vec<&str> = SourceKind::DEFAULT_ORDER.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["lrclib", "lyrics_ovh", "netease"]);

        let parsed: SourceKind = serde_json::from_str("\"lyrics_ovh\"").unwrap();
        assert_eq!(parsed, SourceKind::LyricsOvh);
    }

    #[test]
    fn test_build_sources_keeps_order_and_drops_repeats() {
        let sources = build_sources(
            &[SourceKind::Netease, SourceKind::Lrclib, SourceKind::Netease],
            BOUND,
            "lyricist-test",
        )
        .unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["netease", "lrclib"]);
    }
}
