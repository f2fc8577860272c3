//! NetEase Cloud Music client: song search, then LRC fetch by song id.

use super::lrc;
use super::source::LyricsSource;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct LyricResponse {
    lrc: Option<LyricBlock>,
    #[serde(default)]
    nolyric: bool,
    #[serde(default)]
    uncollected: bool,
}

#[derive(Debug, Deserialize)]
struct LyricBlock {
    lyric: Option<String>,
}

impl LyricResponse {
    fn text(&self) -> Option<String> {
        if self.nolyric || self.uncollected {
            return None;
        }
        let raw = self.lrc.as_ref()?.lyric.as_deref()?;
        let text = if lrc::is_timed(raw) {
            lrc::to_plain_text(raw)
        } else {
            raw.trim().to_string()
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone)]
pub struct NeteaseClient {
    client: reqwest::Client,
    base_url: String,
}

impl NeteaseClient {
    const DEFAULT_BASE_URL: &'static str = "https://music.163.com/api";
    const REFERER: &'static str = "https://music.163.com/";

    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .context("build netease client")?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn search_song_id(&self, title: &str, artist: &str) -> anyhow::Result<Option<u64>> {
        let query = format!("{artist} {title}");
        let url = format!(
            "{}/search/get/?s={}&type=1&limit=1&offset=0",
            self.base_url,
            urlencoding::encode(&query)
        );
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::REFERER, Self::REFERER)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("NetEase search error: {}", response.status());
        }

        // NetEase answers with text/plain, so decode by hand
        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).context("decode netease search")?;
        Ok(parsed
            .result
            .and_then(|r| r.songs.into_iter().next())
            .map(|s| s.id))
    }

    async fn fetch_lyric(&self, song_id: u64) -> anyhow::Result<Option<String>> {
        let url = format!("{}/song/lyric?id={song_id}&lv=1", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::REFERER, Self::REFERER)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("NetEase lyric error: {}", response.status());
        }

        let body = response.text().await?;
        let parsed: LyricResponse = serde_json::from_str(&body).context("decode netease lyric")?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl LyricsSource for NeteaseClient {
    fn name(&self) -> &str {
        "netease"
    }

    async fn lookup(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>> {
        match self.search_song_id(title, artist).await? {
            Some(id) => self.fetch_lyric(id).await,
            None => Ok(None),
        }
    }
}
