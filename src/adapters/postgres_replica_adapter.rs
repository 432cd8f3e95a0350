//! PostgreSQL remote replica adapter.
//!
//! One `jsonb` row per user. The top-level merge is the `||` operator,
//! which replaces matching keys and keeps the rest.

use crate::domain::config_validation::pool_size;
use crate::domain::error::AlphaTrackError;
use crate::ports::config_port::ConfigPort;
use crate::ports::remote_port::{RemoteDocument, RemoteReplicaPort};
use r2d2::{Pool, PooledConnection};
use postgres::{Config, NoTls};
use r2d2_postgres::PostgresConnectionManager;

pub struct PostgresReplicaAdapter {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresReplicaAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlphaTrackError> {
        let connection_string = config
            .get_non_empty("sync", "connection_string")
            .ok_or_else(|| AlphaTrackError::ConfigMissing {
                section: "sync".into(),
                key: "connection_string".into(),
            })?;

        let pg_config: Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| AlphaTrackError::ConfigInvalid {
                    section: "sync".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;

        let pool_size = pool_size(config, "sync", 2)?;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| AlphaTrackError::RemoteUnavailable {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(
        &self,
    ) -> Result<PooledConnection<PostgresConnectionManager<NoTls>>, AlphaTrackError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| AlphaTrackError::RemoteUnavailable {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), AlphaTrackError> {
        self.conn()?
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS user_data (
                    uid TEXT PRIMARY KEY,
                    doc JSONB NOT NULL DEFAULT '{}'::jsonb,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
            )
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: e.to_string(),
            })
    }
}

impl RemoteReplicaPort for PostgresReplicaAdapter {
    fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, AlphaTrackError> {
        let row = self
            .conn()?
            .query_opt("SELECT doc::text FROM user_data WHERE uid = $1", &[&uid])
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: e.to_string(),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let text: String = row.get(0);
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: format!("invalid document for {uid}: {e}"),
            })
    }

    fn merge(&self, uid: &str, fields: RemoteDocument) -> Result<(), AlphaTrackError> {
        let body = serde_json::to_string(&fields).map_err(|e| {
            AlphaTrackError::RemoteUnavailable {
                reason: format!("failed to encode document: {e}"),
            }
        })?;

        self.conn()?
            .execute(
                "INSERT INTO user_data (uid, doc, updated_at)
                 VALUES ($1, $2::text::jsonb, now())
                 ON CONFLICT (uid) DO UPDATE
                 SET doc = user_data.doc || EXCLUDED.doc, updated_at = now()",
                &[&uid, &body],
            )
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
