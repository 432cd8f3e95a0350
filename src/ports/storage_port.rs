//! Local durable storage port.
//!
//! A flat key/value store of whole documents: every write replaces the
//! document under its key, there is no partial update.

use crate::domain::error::AlphaTrackError;

pub const TRADES_KEY: &str = "alpha_trades";
pub const TASKS_KEY: &str = "alpha_tasks";
pub const JOURNAL_KEY: &str = "alpha_journal";
pub const IDENTITY_KEY: &str = "alpha_uid";
pub const ISSUED_IDS_KEY: &str = "alpha_issued_ids";

pub trait LocalStoragePort {
    fn get_item(&self, key: &str) -> Result<Option<String>, AlphaTrackError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), AlphaTrackError>;

    fn remove_item(&self, key: &str) -> Result<(), AlphaTrackError>;

    /// Write several documents. Adapters that can should make this atomic;
    /// the default writes them one at a time.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), AlphaTrackError> {
        for (key, value) in items {
            self.set_item(key, value)?;
        }
        Ok(())
    }
}
