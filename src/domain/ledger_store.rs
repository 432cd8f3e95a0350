//! The ledger store: owner of the in-memory ledger.
//!
//! Every mutation is validated, applied to a copy, written to local storage
//! and only then made current. Subscribers are notified and a background
//! push is issued afterwards. Remote failures never fail a mutation.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{AlphaTrackError, EntryKind};
use super::journal::{JournalDraft, JournalEntry};
use super::ledger::{next_id, position_of, IssuedIds, Ledger};
use super::metrics::TradeStats;
use super::sync::SyncReconciler;
use super::task::{default_tasks, normalize_text, Task};
use super::trade::{Trade, TradeDraft};
use crate::ports::storage_port::{
    LocalStoragePort, IDENTITY_KEY, ISSUED_IDS_KEY, JOURNAL_KEY, TASKS_KEY, TRADES_KEY,
};

type ChangeListener = Box<dyn Fn(&Ledger)>;

pub struct LedgerStore {
    storage: Box<dyn LocalStoragePort>,
    sync: SyncReconciler,
    ledger: Ledger,
    issued: IssuedIds,
    listeners: Vec<ChangeListener>,
}

fn read_document<T: DeserializeOwned>(
    storage: &dyn LocalStoragePort,
    key: &str,
) -> Result<Option<T>, AlphaTrackError> {
    match storage.get_item(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AlphaTrackError::CorruptDocument {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, AlphaTrackError> {
    serde_json::to_string(value).map_err(|e| AlphaTrackError::Storage {
        reason: format!("failed to encode {key}: {e}"),
    })
}

impl LedgerStore {
    /// Read the ledger from local storage only.
    ///
    /// Missing documents start empty, except tasks, which start from the
    /// default checklist. A stored identity is handed to the reconciler.
    pub fn open(
        storage: Box<dyn LocalStoragePort>,
        mut sync: SyncReconciler,
    ) -> Result<Self, AlphaTrackError> {
        let trades: Vec<Trade> = read_document(storage.as_ref(), TRADES_KEY)?.unwrap_or_default();
        let journal: Vec<JournalEntry> =
            read_document(storage.as_ref(), JOURNAL_KEY)?.unwrap_or_default();
        let tasks: Vec<Task> =
            read_document(storage.as_ref(), TASKS_KEY)?.unwrap_or_else(default_tasks);

        let mut issued: IssuedIds =
            read_document(storage.as_ref(), ISSUED_IDS_KEY)?.unwrap_or_default();

        let mut ledger = Ledger {
            trades,
            tasks,
            journal,
        };
        let renumbered = ledger.normalize_ids_after(&issued);
        issued.observe(&ledger);

        if sync.identity().is_none() {
            sync.set_identity(storage.get_item(IDENTITY_KEY)?);
        }

        let store = Self {
            storage,
            sync,
            ledger,
            issued,
            listeners: Vec::new(),
        };

        if renumbered > 0 {
            tracing::info!(renumbered, "assigned ids to stored entries");
            store.persist(&store.ledger, &store.issued)?;
        }

        tracing::debug!(
            trades = store.ledger.trades.len(),
            tasks = store.ledger.tasks.len(),
            journal = store.ledger.journal.len(),
            "ledger opened from local storage"
        );
        Ok(store)
    }

    /// Open from local storage, then let the remote replica overwrite it.
    pub fn load(
        storage: Box<dyn LocalStoragePort>,
        sync: SyncReconciler,
    ) -> Result<Self, AlphaTrackError> {
        let mut store = Self::open(storage, sync)?;
        store.pull()?;
        Ok(store)
    }

    /// Replace local state with the remote document if there is one.
    /// Returns whether anything was replaced. Remote failures are logged
    /// and leave local state as it was; only a local write can fail here.
    pub fn pull(&mut self) -> Result<bool, AlphaTrackError> {
        let Some(snapshot) = self.sync.pull() else {
            return Ok(false);
        };

        let mut next = self.ledger.clone();
        snapshot.apply_to(&mut next);
        let mut issued = self.issued;
        issued.observe(&next);
        self.persist(&next, &issued)?;
        self.ledger = next;
        self.issued = issued;
        tracing::info!(
            trades = self.ledger.trades.len(),
            tasks = self.ledger.tasks.len(),
            journal = self.ledger.journal.len(),
            "local ledger replaced by remote copy"
        );
        self.notify();
        Ok(true)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn trades(&self) -> &[Trade] {
        &self.ledger.trades
    }

    pub fn tasks(&self) -> &[Task] {
        &self.ledger.tasks
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.ledger.journal
    }

    pub fn stats(&self) -> TradeStats {
        TradeStats::compute(&self.ledger.trades, &self.ledger.tasks)
    }

    pub fn sync(&self) -> &SyncReconciler {
        &self.sync
    }

    /// Register a listener called with the ledger after every change.
    pub fn subscribe(&mut self, listener: impl Fn(&Ledger) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn add_trade(&mut self, draft: &TradeDraft) -> Result<u64, AlphaTrackError> {
        let issued = self.issued.trades;
        self.commit(|ledger| {
            let trade = draft.validate(next_id(&ledger.trades, issued))?;
            let id = trade.id;
            ledger.trades.push(trade);
            Ok(id)
        })
    }

    pub fn update_trade(&mut self, id: u64, draft: &TradeDraft) -> Result<(), AlphaTrackError> {
        self.commit(|ledger| {
            let pos = position_of(&ledger.trades, id).ok_or(AlphaTrackError::NotFound {
                kind: EntryKind::Trade,
                id,
            })?;
            ledger.trades[pos] = draft.validate(id)?;
            Ok(())
        })
    }

    pub fn delete_trade(&mut self, id: u64) -> Result<Trade, AlphaTrackError> {
        self.commit(|ledger| {
            let pos = position_of(&ledger.trades, id).ok_or(AlphaTrackError::NotFound {
                kind: EntryKind::Trade,
                id,
            })?;
            Ok(ledger.trades.remove(pos))
        })
    }

    pub fn add_task(&mut self, text: &str) -> Result<u64, AlphaTrackError> {
        let issued = self.issued.tasks;
        self.commit(|ledger| {
            let text = normalize_text(text)?;
            let id = next_id(&ledger.tasks, issued);
            ledger.tasks.push(Task {
                id,
                text,
                completed: false,
            });
            Ok(id)
        })
    }

    /// Flip a task's completion flag, returning the new value.
    pub fn toggle_task(&mut self, id: u64) -> Result<bool, AlphaTrackError> {
        self.commit(|ledger| {
            let task = ledger
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(AlphaTrackError::NotFound {
                    kind: EntryKind::Task,
                    id,
                })?;
            task.completed = !task.completed;
            Ok(task.completed)
        })
    }

    pub fn edit_task(&mut self, id: u64, text: &str) -> Result<(), AlphaTrackError> {
        self.commit(|ledger| {
            let text = normalize_text(text)?;
            let task = ledger
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(AlphaTrackError::NotFound {
                    kind: EntryKind::Task,
                    id,
                })?;
            task.text = text;
            Ok(())
        })
    }

    pub fn delete_task(&mut self, id: u64) -> Result<Task, AlphaTrackError> {
        self.commit(|ledger| {
            let pos = position_of(&ledger.tasks, id).ok_or(AlphaTrackError::NotFound {
                kind: EntryKind::Task,
                id,
            })?;
            Ok(ledger.tasks.remove(pos))
        })
    }

    /// New journal entries go to the front: the journal reads newest first.
    pub fn add_journal(&mut self, draft: &JournalDraft) -> Result<u64, AlphaTrackError> {
        let issued = self.issued.journal;
        self.commit(|ledger| {
            let entry = draft.validate(next_id(&ledger.journal, issued))?;
            let id = entry.id;
            ledger.journal.insert(0, entry);
            Ok(id)
        })
    }

    pub fn update_journal(
        &mut self,
        id: u64,
        draft: &JournalDraft,
    ) -> Result<(), AlphaTrackError> {
        self.commit(|ledger| {
            let pos = position_of(&ledger.journal, id).ok_or(AlphaTrackError::NotFound {
                kind: EntryKind::Journal,
                id,
            })?;
            ledger.journal[pos] = draft.validate(id)?;
            Ok(())
        })
    }

    pub fn delete_journal(&mut self, id: u64) -> Result<JournalEntry, AlphaTrackError> {
        self.commit(|ledger| {
            let pos = position_of(&ledger.journal, id).ok_or(AlphaTrackError::NotFound {
                kind: EntryKind::Journal,
                id,
            })?;
            Ok(ledger.journal.remove(pos))
        })
    }

    /// Remember the user id locally and sync under it from now on.
    pub fn set_identity(&mut self, uid: &str) -> Result<(), AlphaTrackError> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(AlphaTrackError::validation("uid", "must not be empty"));
        }
        self.storage.set_item(IDENTITY_KEY, uid)?;
        self.sync.set_identity(Some(uid.to_string()));
        Ok(())
    }

    pub fn clear_identity(&mut self) -> Result<(), AlphaTrackError> {
        self.storage.remove_item(IDENTITY_KEY)?;
        self.sync.set_identity(None);
        Ok(())
    }

    /// Push the current ledger and wait for the result.
    pub fn push_now(&self) -> Result<(), AlphaTrackError> {
        self.sync.push_now(&self.ledger)
    }

    fn commit<T>(
        &mut self,
        apply: impl FnOnce(&mut Ledger) -> Result<T, AlphaTrackError>,
    ) -> Result<T, AlphaTrackError> {
        let mut next = self.ledger.clone();
        let out = apply(&mut next)?;
        let mut issued = self.issued;
        issued.observe(&next);
        self.persist(&next, &issued)?;
        self.ledger = next;
        self.issued = issued;
        self.notify();
        self.sync.push(&self.ledger);
        Ok(out)
    }

    fn persist(&self, ledger: &Ledger, issued: &IssuedIds) -> Result<(), AlphaTrackError> {
        let trades = encode(TRADES_KEY, &ledger.trades)?;
        let journal = encode(JOURNAL_KEY, &ledger.journal)?;
        let tasks = encode(TASKS_KEY, &ledger.tasks)?;
        let issued = encode(ISSUED_IDS_KEY, issued)?;
        self.storage.set_items(&[
            (TRADES_KEY, trades.as_str()),
            (JOURNAL_KEY, journal.as_str()),
            (TASKS_KEY, tasks.as_str()),
            (ISSUED_IDS_KEY, issued.as_str()),
        ])
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.ledger);
        }
    }
}
