//! Concrete adapter implementations for ports.

#[cfg(feature = "postgres")]
pub mod postgres_replica_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage_adapter;
pub mod csv_export_adapter;
pub mod file_config_adapter;
pub mod file_replica_adapter;
pub mod typst_report;
