//! Slot storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trait for durable storage of named blobs.
pub trait SlotStorage: Send + Sync {
  /// Read the blob stored under `slot`, if any.
  fn read(&self, slot: &str) -> Result<Option<Vec<u8>>>;

  /// Overwrite the blob stored under `slot`.
  fn write(&self, slot: &str, data: &[u8]) -> Result<()>;

  /// When `slot` was last written.
  fn saved_at(&self, slot: &str) -> Result<Option<DateTime<Utc>>>;
}

/// SQLite-based slot storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the storage database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create mirror directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open mirror database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory database. Nothing survives the process.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;

    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("shelf").join("mirror.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(MIRROR_SCHEMA)
      .map_err(|e| eyre!("Failed to run mirror migrations: {}", e))?;

    Ok(())
  }
}

const MIRROR_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mirror_slots (
    slot TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SlotStorage for SqliteStorage {
  fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT data FROM mirror_slots WHERE slot = ?",
        params![slot],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read slot {}: {}", slot, e))
  }

  fn write(&self, slot: &str, data: &[u8]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO mirror_slots (slot, data, saved_at)
         VALUES (?, ?, datetime('now'))",
        params![slot, data],
      )
      .map_err(|e| eyre!("Failed to write slot {}: {}", slot, e))?;

    Ok(())
  }

  fn saved_at(&self, slot: &str) -> Result<Option<DateTime<Utc>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let saved_at: Option<String> = conn
      .query_row(
        "SELECT saved_at FROM mirror_slots WHERE slot = ?",
        params![slot],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read slot {}: {}", slot, e))?;

    saved_at.as_deref().map(parse_datetime).transpose()
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_slot_reads_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.read("products").unwrap().is_none());
    assert!(storage.saved_at("products").unwrap().is_none());
  }

  #[test]
  fn test_write_overwrites_slot() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.write("products", b"[1]").unwrap();
    storage.write("products", b"[2]").unwrap();

    assert_eq!(storage.read("products").unwrap().as_deref(), Some(&b"[2]"[..]));
    assert!(storage.saved_at("products").unwrap().is_some());
    assert!(storage.read("other").unwrap().is_none());
  }

  #[test]
  fn test_parse_datetime() {
    let dt = parse_datetime("2024-03-01 12:30:45").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:45+00:00");
    assert!(parse_datetime("yesterday").is_err());
  }
}
