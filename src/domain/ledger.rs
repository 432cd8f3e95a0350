//! The ledger aggregate: trades, tasks and journal entries for one user.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::journal::JournalEntry;
use super::task::Task;
use super::trade::Trade;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

/// Anything that carries a ledger id.
pub trait Identified {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

impl Identified for Trade {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Identified for Task {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Identified for JournalEntry {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

pub fn max_id<T: Identified>(entries: &[T]) -> u64 {
    entries.iter().map(Identified::id).max().unwrap_or(0)
}

/// Next id for a sequence: one past both the largest id in use and the
/// largest id ever issued.
pub fn next_id<T: Identified>(entries: &[T], issued: u64) -> u64 {
    max_id(entries).max(issued) + 1
}

/// Highest id ever issued per sequence. Only ever raised, so an id freed by
/// a delete is never handed out again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedIds {
    #[serde(default)]
    pub trades: u64,
    #[serde(default)]
    pub tasks: u64,
    #[serde(default)]
    pub journal: u64,
}

impl IssuedIds {
    /// Raise each mark to cover the ids now in the ledger.
    pub fn observe(&mut self, ledger: &Ledger) {
        self.trades = self.trades.max(max_id(&ledger.trades));
        self.tasks = self.tasks.max(max_id(&ledger.tasks));
        self.journal = self.journal.max(max_id(&ledger.journal));
    }
}

pub fn position_of<T: Identified>(entries: &[T], id: u64) -> Option<usize> {
    entries.iter().position(|e| e.id() == id)
}

/// Give every entry with id 0, or with an id already used earlier in the
/// sequence, a fresh id. Returns how many entries were renumbered.
pub fn assign_missing_ids<T: Identified>(entries: &mut [T], issued: u64) -> usize {
    let mut next = next_id(entries, issued);
    let mut seen = HashSet::with_capacity(entries.len());
    let mut renumbered = 0;

    for entry in entries.iter_mut() {
        let id = entry.id();
        if id == 0 || !seen.insert(id) {
            entry.set_id(next);
            seen.insert(next);
            next += 1;
            renumbered += 1;
        }
    }

    renumbered
}

impl Ledger {
    pub fn new(trades: Vec<Trade>, tasks: Vec<Task>, journal: Vec<JournalEntry>) -> Self {
        let mut ledger = Ledger {
            trades,
            tasks,
            journal,
        };
        ledger.normalize_ids();
        ledger
    }

    /// Renumber entries from documents that predate stable ids.
    pub fn normalize_ids(&mut self) -> usize {
        self.normalize_ids_after(&IssuedIds::default())
    }

    /// Like [`Ledger::normalize_ids`], but fresh ids also clear `issued`.
    pub fn normalize_ids_after(&mut self, issued: &IssuedIds) -> usize {
        assign_missing_ids(&mut self.trades, issued.trades)
            + assign_missing_ids(&mut self.tasks, issued.tasks)
            + assign_missing_ids(&mut self.journal, issued.journal)
    }

    pub fn trade(&self, id: u64) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn journal_entry(&self, id: u64) -> Option<&JournalEntry> {
        self.journal.iter().find(|e| e.id == id)
    }
}
