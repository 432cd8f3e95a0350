#![allow(dead_code)]

use alphatrack::domain::error::AlphaTrackError;
use alphatrack::domain::journal::{JournalDraft, JournalEntry};
use alphatrack::domain::task::Task;
use alphatrack::domain::trade::{AssetType, Side, Trade, TradeDraft};
use alphatrack::ports::remote_port::{RemoteDocument, RemoteReplicaPort};
use alphatrack::ports::storage_port::LocalStoragePort;
use chrono::NaiveDate;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Key-value storage held in memory. Clones share the same map, so a test
/// can keep a handle after boxing one into a store.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    pub items: Rc<RefCell<HashMap<String, String>>>,
    pub fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn decoded<T: serde::de::DeserializeOwned>(&self, key: &str) -> T {
        serde_json::from_str(&self.raw(key).unwrap()).unwrap()
    }
}

impl LocalStoragePort for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AlphaTrackError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AlphaTrackError> {
        if self.fail_writes.get() {
            return Err(AlphaTrackError::Storage {
                reason: "quota exceeded".into(),
            });
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AlphaTrackError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Remote replica double with a top-level merge and a failure switch.
#[derive(Default)]
pub struct ScriptedRemote {
    pub docs: Mutex<HashMap<String, RemoteDocument>>,
    pub offline: AtomicBool,
    pub merges: AtomicUsize,
}

impl ScriptedRemote {
    pub fn with_document(self, uid: &str, doc: Value) -> Self {
        let Value::Object(map) = doc else {
            panic!("remote document must be an object");
        };
        self.docs.lock().unwrap().insert(uid.to_string(), map);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn document(&self, uid: &str) -> Option<RemoteDocument> {
        self.docs.lock().unwrap().get(uid).cloned()
    }

    pub fn merge_count(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), AlphaTrackError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AlphaTrackError::RemoteUnavailable {
                reason: "network unreachable".into(),
            });
        }
        Ok(())
    }
}

impl RemoteReplicaPort for ScriptedRemote {
    fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, AlphaTrackError> {
        self.check_online()?;
        Ok(self.document(uid))
    }

    fn merge(&self, uid: &str, fields: RemoteDocument) -> Result<(), AlphaTrackError> {
        self.check_online()?;
        self.merges.fetch_add(1, Ordering::SeqCst);
        self.docs
            .lock()
            .unwrap()
            .entry(uid.to_string())
            .or_default()
            .extend(fields);
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn trade_draft(date: &str, asset: &str, pl: &str, commission: &str) -> TradeDraft {
    TradeDraft {
        date: date.into(),
        asset: asset.into(),
        asset_type: "forex".into(),
        side: Some("Long".into()),
        entry: "1.10".into(),
        exit: "1.12".into(),
        pl: pl.into(),
        commission: Some(commission.into()),
        reason: Some("trend continuation".into()),
    }
}

pub fn journal_draft(date: &str, title: &str) -> JournalDraft {
    JournalDraft {
        title: title.into(),
        date: date.into(),
        content: "Notes for the day.".into(),
    }
}

pub fn make_trade(id: u64, day: &str, pl: f64, commission: f64) -> Trade {
    Trade {
        id,
        date: date(day),
        asset: "AAPL".into(),
        asset_type: AssetType::Stock,
        side: Some(Side::Short),
        entry: 100.0,
        exit: 99.0,
        pl,
        commission,
        reason: String::new(),
    }
}

pub fn make_task(id: u64, text: &str, completed: bool) -> Task {
    Task {
        id,
        text: text.into(),
        completed,
    }
}

pub fn make_entry(id: u64, day: &str, title: &str) -> JournalEntry {
    JournalEntry {
        id,
        title: title.into(),
        date: date(day),
        content: String::new(),
    }
}
