//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - A small key/value table holding JSON blobs
//! - The leaderboard store used by the score ledger

use crate::stats::LeaderboardEntry;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: meta and kv tables
const SCHEMA_VERSION: u32 = 1;

/// Database file name inside the data directory.
pub const DB_FILE: &str = "ringstacker.db";

/// Key the leaderboard blob is stored under.
pub const LEADERBOARD_KEY: &str = "ringstacker_leaderboard";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Could not determine data directory
    #[error("could not determine data directory")]
    NoDataDirectory,
    /// Schema version mismatch (future version)
    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },
    /// Failed to create data directory
    #[error("failed to create data directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Stored schema is older than anything we know how to upgrade
    #[error("migration from v{from} to v{to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
    /// Leaderboard could not be serialized
    #[error("failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the leaderboard lives between runs.
pub trait LeaderboardStore {
    /// Stored entries, or `None` when nothing usable has been saved.
    fn load(&self) -> Result<Option<Vec<LeaderboardEntry>>, StorageError>;

    /// Replace the stored entries.
    fn save(&self, entries: &[LeaderboardEntry]) -> Result<(), StorageError>;
}

/// The main storage handle.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database inside `dir`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open_at(&dir.join(DB_FILE))
    }

    /// Open or create the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        debug!(path = %path.display(), "storage opened");
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/ringstacker/` or `~/.local/share/ringstacker/`
    /// - macOS: `~/Library/Application Support/ringstacker/`
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "ringstacker")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Read a raw value.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write a raw value, replacing any previous one.
    pub fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_millis()],
        )?;
        Ok(())
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            // Fresh database, create schema
            self.create_schema_v1()?;
        } else if current_version > SCHEMA_VERSION {
            // Database is from a newer build
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        } else if current_version < SCHEMA_VERSION {
            return Err(StorageError::MigrationFailed {
                from: current_version,
                to: SCHEMA_VERSION,
                reason: format!("no migration path from version {}", current_version),
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        // Check if meta table exists
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        // An empty meta table reads as fresh; any other failure is real
        let version: Option<u32> = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: schema version and creation time
            CREATE TABLE IF NOT EXISTS meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Key/value blobs (JSON)
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![SCHEMA_VERSION, now_millis()],
        )?;

        Ok(())
    }
}

impl LeaderboardStore for Storage {
    fn load(&self) -> Result<Option<Vec<LeaderboardEntry>>, StorageError> {
        let Some(blob) = self.get(LEADERBOARD_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<LeaderboardEntry>>(&blob) {
            Ok(entries) => Ok(Some(entries)),
            Err(e) => {
                warn!(error = %e, "stored leaderboard is unreadable, treating as absent");
                Ok(None)
            }
        }
    }

    fn save(&self, entries: &[LeaderboardEntry]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(entries)?;
        self.put(LEADERBOARD_KEY, &blob)
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player: &str, time: u64, moves: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            player: player.to_string(),
            time,
            moves,
        }
    }

    #[test]
    fn test_storage_creation() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_get_missing_key() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.get("nope").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let storage = Storage::open_in_memory().unwrap();
        storage.put("k", "one").unwrap();
        storage.put("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_load_absent_leaderboard() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_save_and_load_leaderboard() {
        let storage = Storage::open_in_memory().unwrap();
        let entries = vec![entry("ACE", 180_500, 127), entry("PRO", 240_750, 156)];
        storage.save(&entries).unwrap();
        assert_eq!(storage.load().unwrap(), Some(entries));
    }

    #[test]
    fn test_blob_shape() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save(&[entry("ACE", 180_500, 127)]).unwrap();
        let blob = storage.get(LEADERBOARD_KEY).unwrap().unwrap();
        assert_eq!(blob, r#"[{"player":"ACE","time":180500,"moves":127}]"#);
    }

    #[test]
    fn test_malformed_blob_reads_as_absent() {
        let storage = Storage::open_in_memory().unwrap();
        storage.put(LEADERBOARD_KEY, "{not json").unwrap();
        assert_eq!(storage.load().unwrap(), None);

        storage.put(LEADERBOARD_KEY, r#"{"player":"ACE"}"#).unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open_in(dir.path()).unwrap();
            storage.save(&[entry("NEW", 360_250, 203)]).unwrap();
        }
        let storage = Storage::open_in(dir.path()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(vec![entry("NEW", 360_250, 203)]));
        assert!(dir.path().join(DB_FILE).exists());
    }

    #[test]
    fn test_open_in_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        Storage::open_in(&nested).unwrap();
        assert!(nested.join(DB_FILE).exists());
    }

    #[test]
    fn test_future_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let storage = Storage::open_at(&path).unwrap();
            storage
                .conn
                .execute("UPDATE meta SET schema_version = 99", [])
                .unwrap();
        }
        match Storage::open_at(&path) {
            Err(StorageError::FutureSchemaVersion { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("newer schema should be refused"),
        }
    }

    #[test]
    fn test_unreadable_schema_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE meta (schema_version TEXT NOT NULL, created_at INTEGER NOT NULL);
                 INSERT INTO meta (schema_version, created_at) VALUES ('abc', 0);",
            )
            .unwrap();
        }

        assert!(matches!(
            Storage::open_at(&path),
            Err(StorageError::Database(_))
        ));

        // Nothing was written on top of the broken table
        let conn = Connection::open(&path).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_empty_meta_table_reads_as_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE meta (schema_version INTEGER NOT NULL, created_at INTEGER NOT NULL);",
            )
            .unwrap();
        }
        let storage = Storage::open_at(&path).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_data_dir() {
        // Should return a path (may fail in some CI environments without HOME)
        if let Ok(dir) = Storage::data_dir() {
            assert!(dir.to_string_lossy().contains("ringstacker"));
        }
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::FutureSchemaVersion {
            found: 3,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "database schema version 3 is newer than supported version 1"
        );
    }
}
