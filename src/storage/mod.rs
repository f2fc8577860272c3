use anyhow::Context;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// String-keyed string storage shared by the lyrics cache and the manual
/// override store. Callers namespace their keys with a prefix.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS kv_store (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#,
        )
        .context("init schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("storage connection lock poisoned"))
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value FROM kv_store WHERE key=?1")
            .context("prepare kv get")?;
        let mut rows = stmt.query(params![key]).context("query kv get")?;
        if let Some(row) = rows.next().context("read kv row")? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let now_unix = time::OffsetDateTime::now_utc().unix_timestamp();
        self.conn()?
            .execute(
                r#"
INSERT INTO kv_store(key, value, updated_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value=excluded.value,
  updated_at=excluded.updated_at
"#,
                params![key, value, now_unix],
            )
            .with_context(|| format!("put {key}"))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.conn()?
            .execute("DELETE FROM kv_store WHERE key=?1", params![key])
            .with_context(|| format!("delete {key}"))?;
        Ok(())
    }
}

/// Process-local store for tests that should not touch disk.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(
        &self,
    ) -> anyhow::Result<std::sync::MutexGuard<'_, std::collections::HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
