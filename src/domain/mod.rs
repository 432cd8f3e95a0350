//! Core domain types and logic: the ledger, its store, statistics and sync.

pub mod calendar;
pub mod config_validation;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod ledger_store;
pub mod lenient;
pub mod metrics;
pub mod review;
pub mod sync;
pub mod task;
pub mod trade;
