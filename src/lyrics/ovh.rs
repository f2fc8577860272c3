//! lyrics.ovh client. Plain lyrics keyed by artist and title path segments.

use super::source::LyricsSource;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct OvhResponse {
    lyrics: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OvhClient {
    client: reqwest::Client,
    base_url: String,
}

impl OvhClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.lyrics.ovh/v1";

    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .context("build lyrics.ovh client")?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }
}

/// lyrics.ovh prefixes some answers with a "Paroles de la chanson" banner line.
fn clean(raw: &str) -> Option<String> {
    let body = match raw.split_once('\n') {
        Some((first, rest)) if first.starts_with("Paroles de la chanson") => rest,
        _ => raw,
    };
    let text = body.replace("\r\n", "\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl LyricsSource for OvhClient {
    fn name(&self) -> &str {
        "lyrics_ovh"
    }

    async fn lookup(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("lyrics.ovh error: {}", response.status());
        }

        let body: OvhResponse = response.json().await.context("decode lyrics.ovh")?;
        Ok(body.lyrics.as_deref().and_then(clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_banner() {
        assert_eq!(
            clean("Paroles de la chanson Song par Artist\r\nLine one\r\nLine two\n").as_deref(),
            Some("Line one\nLine two")
        );
    }

    #[test]
    fn test_clean_blank() {
        assert_eq!(clean("  \n "), None);
    }

    #[test]
    fn test_decode_missing_lyrics() {
        let body: OvhResponse = serde_json::from_str(r#"{"error":"No lyrics found"}"#).unwrap();
        assert!(body.lyrics.is_none());
    }
}
