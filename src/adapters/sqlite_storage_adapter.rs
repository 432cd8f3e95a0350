//! SQLite local storage adapter.
//!
//! Documents live in a single key/value table; each write replaces the
//! whole value under its key.

use crate::domain::config_validation::pool_size;
use crate::domain::error::AlphaTrackError;
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::LocalStoragePort;
use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

pub struct SqliteStorageAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStorageAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlphaTrackError> {
        let db_path =
            config
                .get_non_empty("storage", "path")
                .ok_or_else(|| AlphaTrackError::ConfigMissing {
                    section: "storage".into(),
                    key: "path".into(),
                })?;

        let pool_size = pool_size(config, "storage", 4)?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| AlphaTrackError::Storage {
                    reason: e.to_string(),
                })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, AlphaTrackError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| AlphaTrackError::Storage {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AlphaTrackError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| AlphaTrackError::Storage {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), AlphaTrackError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS local_storage (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, AlphaTrackError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM local_storage ORDER BY key")
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(
                row.map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                    reason: e.to_string(),
                })?,
            );
        }
        Ok(keys)
    }
}

const UPSERT: &str = "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
                      ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                     updated_at = excluded.updated_at";

impl LocalStoragePort for SqliteStorageAdapter {
    fn get_item(&self, key: &str) -> Result<Option<String>, AlphaTrackError> {
        self.conn()?
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AlphaTrackError> {
        self.set_items(&[(key, value)])
    }

    fn remove_item(&self, key: &str) -> Result<(), AlphaTrackError> {
        self.conn()?
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// All documents are written in one transaction.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), AlphaTrackError> {
        let mut conn = self.conn()?;
        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                    reason: e.to_string(),
                })?;

        let now = Utc::now().to_rfc3339();
        for &(key, value) in items {
            tx.execute(UPSERT, params![key, value, now])
                .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                    reason: e.to_string(),
                })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| AlphaTrackError::StorageQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
