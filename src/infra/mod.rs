// Adapters behind the ports in `app::ports`

pub mod credentials;
pub mod http_client;
pub mod option_store;
pub mod transient_store;

use crate::common::error::Result;
use rusqlite::Connection;
use std::path::Path;

pub(crate) fn open_sqlite(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}
