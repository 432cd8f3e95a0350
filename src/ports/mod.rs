//! Port traits the ledger core talks through.

pub mod config_port;
pub mod remote_port;
pub mod report_port;
pub mod storage_port;
