use crate::app::ports::OptionStore;
use crate::common::error::Result;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// In-memory option store for development/testing
#[derive(Default)]
pub struct MemoryOptionStore {
    options: Mutex<HashMap<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.options.lock().unwrap().get(name).cloned())
    }

    fn update_option(&self, name: &str, value: &Value) -> Result<()> {
        self.options.lock().unwrap().insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<bool> {
        Ok(self.options.lock().unwrap().remove(name).is_some())
    }
}

pub struct SqliteOptionStore {
    conn: Mutex<Connection>,
}

impl SqliteOptionStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = super::open_sqlite(db_path.as_ref())?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS options (
                name   TEXT PRIMARY KEY,
                value  TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl OptionStore for SqliteOptionStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM options WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            Ok(Some(serde_json::from_str(&raw)?))
        } else {
            Ok(None)
        }
    }

    fn update_option(&self, name: &str, value: &Value) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO options (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value=excluded.value",
            params![name, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM options WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_options_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.db");
        {
            let store = SqliteOptionStore::open(&path).unwrap();
            store.update_option("eventbrite_api_token", &json!("tok-1")).unwrap();
            store.update_option("eventbrite_api_transients", &json!(["a", "b"])).unwrap();
        }
        let store = SqliteOptionStore::open(&path).unwrap();
        assert_eq!(store.get_option("eventbrite_api_token").unwrap(), Some(json!("tok-1")));
        assert_eq!(store.get_option("eventbrite_api_transients").unwrap(), Some(json!(["a", "b"])));
        assert!(store.delete_option("eventbrite_api_token").unwrap());
        assert_eq!(store.get_option("eventbrite_api_token").unwrap(), None);
    }

    #[test]
    fn test_memory_options() {
        let store = MemoryOptionStore::new();
        assert_eq!(store.get_option("missing").unwrap(), None);
        store.update_option("k", &json!(1)).unwrap();
        store.update_option("k", &json!(2)).unwrap();
        assert_eq!(store.get_option("k").unwrap(), Some(json!(2)));
        assert!(!store.delete_option("other").unwrap());
    }
}
