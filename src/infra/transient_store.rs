use crate::app::ports::TransientStore;
use crate::common::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// A cached response and when it stops being valid
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: &str, payload: &Value, ttl: Duration) -> Self {
        // Out-of-range TTLs are clamped to a century.
        let ttl = chrono::Duration::from_std(ttl)
            .ok()
            .filter(|ttl| *ttl <= chrono::Duration::days(36_500))
            .unwrap_or_else(|| chrono::Duration::days(36_500));
        Self {
            key: key.to_string(),
            payload: payload.clone(),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// In-memory transient store for development/testing
#[derive(Default)]
pub struct MemoryTransientStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransientStore for MemoryTransientStore {
    fn get_transient(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!("Transient {} expired at {}", key, entry.expires_at);
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.payload.clone())),
            None => Ok(None),
        }
    }

    fn set_transient(&self, key: &str, payload: &Value, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(key, payload, ttl);
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    fn delete_transient(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}

pub struct SqliteTransientStore {
    conn: Mutex<Connection>,
}

impl SqliteTransientStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = super::open_sqlite(db_path.as_ref())?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transients (
                key         TEXT PRIMARY KEY,
                payload     TEXT NOT NULL,
                expires_at  INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TransientStore for SqliteTransientStore {
    fn get_transient(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT payload, expires_at FROM transients WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let payload: String = row.get(0)?;
        let expires_at: i64 = row.get(1)?;
        drop(rows);
        drop(stmt);

        if expires_at <= Utc::now().timestamp() {
            debug!("Transient {} expired, purging", key);
            conn.execute("DELETE FROM transients WHERE key = ?1", params![key])?;
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&payload)?))
    }

    fn set_transient(&self, key: &str, payload: &Value, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(key, payload, ttl);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO transients (key, payload, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, expires_at=excluded.expires_at",
            params![entry.key, serde_json::to_string(&entry.payload)?, entry.expires_at.timestamp()],
        )?;
        Ok(())
    }

    fn delete_transient(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM transients WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }
}
