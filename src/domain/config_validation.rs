//! Configuration validation.
//!
//! Validates the storage and sync sections before the ledger is opened.

use crate::domain::error::AlphaTrackError;
use crate::ports::config_port::ConfigPort;

/// Where the remote replica lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncBackend {
    None,
    File,
    Postgres,
}

pub fn validate_storage_config(config: &dyn ConfigPort) -> Result<(), AlphaTrackError> {
    validate_storage_path(config)?;
    validate_pool_size(config, "storage")?;
    Ok(())
}

pub fn validate_sync_config(config: &dyn ConfigPort) -> Result<SyncBackend, AlphaTrackError> {
    let backend = sync_backend(config)?;
    match backend {
        SyncBackend::None => {}
        SyncBackend::File => require(config, "sync", "dir")?,
        SyncBackend::Postgres => {
            require(config, "sync", "connection_string")?;
            validate_pool_size(config, "sync")?;
        }
    }
    Ok(backend)
}

pub fn sync_backend(config: &dyn ConfigPort) -> Result<SyncBackend, AlphaTrackError> {
    let raw = config
        .get_non_empty("sync", "backend")
        .unwrap_or_else(|| "none".to_string());
    match raw.to_lowercase().as_str() {
        "none" | "off" => Ok(SyncBackend::None),
        "file" => Ok(SyncBackend::File),
        "postgres" => Ok(SyncBackend::Postgres),
        other => Err(AlphaTrackError::ConfigInvalid {
            section: "sync".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend {other:?} (expected none, file or postgres)"),
        }),
    }
}

fn validate_storage_path(config: &dyn ConfigPort) -> Result<(), AlphaTrackError> {
    require(config, "storage", "path")
}

fn validate_pool_size(config: &dyn ConfigPort, section: &str) -> Result<(), AlphaTrackError> {
    pool_size(config, section, 1).map(|_| ())
}

/// `[section] pool_size` as a connection count: at least 1 and small
/// enough for a `u32`.
pub fn pool_size(
    config: &dyn ConfigPort,
    section: &str,
    default: u32,
) -> Result<u32, AlphaTrackError> {
    let value = config.get_int(section, "pool_size", i64::from(default));
    let invalid = |reason: &str| AlphaTrackError::ConfigInvalid {
        section: section.to_string(),
        key: "pool_size".to_string(),
        reason: reason.to_string(),
    };
    if value < 1 {
        return Err(invalid("pool_size must be at least 1"));
    }
    u32::try_from(value).map_err(|_| invalid("pool_size is too large"))
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), AlphaTrackError> {
    match config.get_non_empty(section, key) {
        Some(_) => Ok(()),
        None => Err(AlphaTrackError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
