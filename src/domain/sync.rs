//! Best-effort replication of the ledger to a remote document.
//!
//! Pull runs once at startup and replaces local state with whatever the
//! remote holds. Push runs after every mutation on a background thread and
//! merges the full ledger into the remote document. Remote failures are
//! logged and never reach the caller; there is no retry and no conflict
//! resolution, so the push that completes last wins.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use super::error::AlphaTrackError;
use super::journal::JournalEntry;
use super::ledger::Ledger;
use super::task::Task;
use super::trade::Trade;
use crate::ports::remote_port::{RemoteDocument, RemoteReplicaPort};

pub const LAST_SYNC_FIELD: &str = "lastSync";

/// The ledger sequences found in a remote document. A sequence that is
/// missing (or `null`) remotely leaves the local one untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteSnapshot {
    #[serde(default)]
    pub trades: Option<Vec<Trade>>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub journal: Option<Vec<JournalEntry>>,
    #[serde(default, rename = "lastSync")]
    pub last_sync: Option<serde_json::Value>,
}

impl RemoteSnapshot {
    pub fn from_document(doc: RemoteDocument) -> Result<Self, AlphaTrackError> {
        serde_json::from_value(serde_json::Value::Object(doc)).map_err(|e| {
            AlphaTrackError::RemoteUnavailable {
                reason: format!("malformed remote document: {e}"),
            }
        })
    }

    pub fn apply_to(self, ledger: &mut Ledger) {
        if let Some(trades) = self.trades {
            ledger.trades = trades;
        }
        if let Some(tasks) = self.tasks {
            ledger.tasks = tasks;
        }
        if let Some(journal) = self.journal {
            ledger.journal = journal;
        }
        ledger.normalize_ids();
    }
}

/// The fields a push merges into the remote document.
pub fn to_document(ledger: &Ledger) -> Result<RemoteDocument, AlphaTrackError> {
    let value = serde_json::to_value(ledger).map_err(|e| AlphaTrackError::Storage {
        reason: format!("failed to serialize ledger: {e}"),
    })?;
    let serde_json::Value::Object(mut doc) = value else {
        return Err(AlphaTrackError::Storage {
            reason: "ledger did not serialize to an object".into(),
        });
    };
    doc.insert(
        LAST_SYNC_FIELD.to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Ok(doc)
}

pub struct SyncReconciler {
    remote: Option<Arc<dyn RemoteReplicaPort + Send + Sync>>,
    identity: Option<String>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncReconciler {
    /// A reconciler with no remote: pull and push do nothing.
    pub fn disabled() -> Self {
        Self {
            remote: None,
            identity: None,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn new(remote: Arc<dyn RemoteReplicaPort + Send + Sync>) -> Self {
        Self {
            remote: Some(remote),
            identity: None,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn with_identity(mut self, uid: impl Into<String>) -> Self {
        self.identity = Some(uid.into());
        self
    }

    pub fn set_identity(&mut self, uid: Option<String>) {
        self.identity = uid.filter(|u| !u.trim().is_empty());
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn target(&self) -> Option<(&Arc<dyn RemoteReplicaPort + Send + Sync>, &str)> {
        Some((self.remote.as_ref()?, self.identity.as_deref()?))
    }

    /// Fetch the remote snapshot. `None` when sync is not configured, the
    /// document does not exist, or the fetch failed (which is logged).
    pub fn pull(&self) -> Option<RemoteSnapshot> {
        let (remote, uid) = self.target()?;
        tracing::info!(uid, "pulling ledger from remote replica");

        let fetched = remote
            .fetch(uid)
            .and_then(|doc| doc.map(RemoteSnapshot::from_document).transpose());

        match fetched {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::info!(uid, "no remote document yet");
                None
            }
            Err(e) => {
                tracing::warn!(uid, error = %e, "cloud load failed");
                None
            }
        }
    }

    /// Merge the ledger into the remote document on a background thread.
    /// The ledger is serialized before this returns, so later mutations do
    /// not leak into this push.
    pub fn push(&self, ledger: &Ledger) {
        let Some((remote, uid)) = self.target() else {
            tracing::debug!("sync not configured, skipping push");
            return;
        };

        let doc = match to_document(ledger) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(uid, error = %e, "cloud sync failed");
                return;
            }
        };

        let remote = Arc::clone(remote);
        let uid = uid.to_string();
        let spawned = std::thread::Builder::new()
            .name("alphatrack-push".into())
            .spawn(move || match remote.merge(&uid, doc) {
                Ok(()) => tracing::info!(uid = %uid, "cloud sync successful"),
                Err(e) => tracing::warn!(uid = %uid, error = %e, "cloud sync failed"),
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "cloud sync failed: could not start push thread");
                return;
            }
        };

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Push on the calling thread and report the outcome. Used for explicit
    /// user-requested syncs; mutations go through [`SyncReconciler::push`].
    pub fn push_now(&self, ledger: &Ledger) -> Result<(), AlphaTrackError> {
        let (remote, uid) = self
            .target()
            .ok_or_else(|| AlphaTrackError::RemoteUnavailable {
                reason: "no remote replica or identity configured".into(),
            })?;
        remote.merge(uid, to_document(ledger)?)
    }

    /// Block until every background push issued so far has finished.
    pub fn wait_idle(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::warn!("cloud sync thread panicked");
            }
        }
    }

    pub fn pending_pushes(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }
}

impl Drop for SyncReconciler {
    fn drop(&mut self) {
        self.wait_idle();
    }
}
