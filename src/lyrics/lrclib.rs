//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API serving plain and synchronized lyrics.
//! API Documentation: https://lrclib.net/docs

use super::lrc;
use super::source::LyricsSource;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// LRCLIB API response
#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[serde(rename = "plainLyrics")]
    pub plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub instrumental: bool,
}

impl LrclibResponse {
    /// Plain lyrics when present, otherwise synced lyrics without timing.
    pub fn text(&self) -> Option<String> {
        if self.instrumental {
            return None;
        }
        if let Some(plain) = &self.plain_lyrics
            && !plain.trim().is_empty()
        {
            return Some(plain.clone());
        }
        self.synced_lyrics
            .as_deref()
            .map(lrc::to_plain_text)
            .filter(|text| !text.is_empty())
    }
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";

    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .context("build lrclib client")?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Exact match first, then the best search hit.
    pub async fn get_lyrics(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        if let Some(lyrics) = self.get_exact(track_name, artist_name).await?
            && lyrics.text().is_some()
        {
            return Ok(Some(lyrics));
        }

        self.search(track_name, artist_name).await
    }

    async fn get_exact(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        let url = format!(
            "{}/get?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(track_name),
            urlencoding::encode(artist_name)
        );

        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            let lyrics: LrclibResponse = response.json().await.context("decode lrclib get")?;
            Ok(Some(lyrics))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB API error: {}", response.status());
        }
    }

    async fn search(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        let url = format!(
            "{}/search?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(track_name),
            urlencoding::encode(artist_name)
        );

        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            let results: Vec<LrclibResponse> =
                response.json().await.context("decode lrclib search")?;
            Ok(pick_best(results))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB search error: {}", response.status());
        }
    }
}

/// First hit with plain lyrics, else the first with any usable text.
fn pick_best(results: Vec<LrclibResponse>) -> Option<LrclibResponse> {
    let plain = results.iter().position(|r| {
        !r.instrumental && r.plain_lyrics.as_deref().is_some_and(|p| !p.trim().is_empty())
    });
    let idx = plain.or_else(|| results.iter().position(|r| r.text().is_some()))?;
    results.into_iter().nth(idx)
}

#[async_trait]
impl LyricsSource for LrclibClient {
    fn name(&self) -> &str {
        "lrclib"
    }

    async fn lookup(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .get_lyrics(title, artist)
            .await?
            .and_then(|r| r.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> LrclibResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prefers_plain_lyrics() {
        let r = decode(
            r#"{"id":1,"trackName":"T","artistName":"A","plainLyrics":"plain","syncedLyrics":"[00:01.00]timed"}"#,
        );
        assert_eq!(r.text().as_deref(), Some("plain"));
    }

    #[test]
    fn test_falls_back_to_synced() {
        let r = decode(r#"{"plainLyrics":null,"syncedLyrics":"[00:01.00]one\n[00:02.00]two"}"#);
        assert_eq!(r.text().as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn test_instrumental_has_no_text() {
        let r = decode(r#"{"plainLyrics":null,"syncedLyrics":null,"instrumental":true}"#);
        assert_eq!(r.text(), None);
    }

    #[test]
    fn test_pick_best_search_hit() {
        let results: Vec<LrclibResponse> = serde_json::from_str(
            r#"[
                {"plainLyrics":null,"syncedLyrics":null},
                {"plainLyrics":null,"syncedLyrics":"[00:01.00]synced"},
                {"plainLyrics":"plain","syncedLyrics":null}
            ]"#,
        )
        .unwrap();
        assert_eq!(pick_best(results).and_then(|r| r.text()).as_deref(), Some("plain"));

        assert!(pick_best(Vec::new()).is_none());
    }
}
