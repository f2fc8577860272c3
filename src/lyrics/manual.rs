//! User-supplied lyrics. Never expire and always win over fetched results.

use super::cache::{unix_millis, Clock};
use crate::storage::KeyValueStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const KEY_PREFIX: &str = "manual:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub lyrics: String,
    /// Unix milliseconds, informational only.
    #[allow(dead_code)]
    #[serde(default)]
    pub saved_at: i64,
}

#[derive(Clone)]
pub struct ManualStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ManualStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn storage_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<ManualEntry>> {
        match self.store.get(&Self::storage_key(key))? {
            Some(raw) => {
                let entry = serde_json::from_str(&raw)
                    .with_context(|| format!("decode manual entry {key}"))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn put(&self, key: &str, lyrics: &str) -> anyhow::Result<()> {
        let entry = ManualEntry {
            lyrics: lyrics.to_string(),
            saved_at: unix_millis(self.clock.now()),
        };
        let raw = serde_json::to_string(&entry).context("serialize manual entry")?;
        self.store.put(&Self::storage_key(key), &raw)
    }

    pub fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.store.delete(&Self::storage_key(key))
    }
}
