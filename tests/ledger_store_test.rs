//! Ledger store behaviour across local storage and a remote replica.

mod common;

use alphatrack::domain::error::{AlphaTrackError, EntryKind};
use alphatrack::domain::journal::JournalEntry;
use alphatrack::domain::ledger::Ledger;
use alphatrack::domain::ledger_store::LedgerStore;
use alphatrack::domain::sync::{SyncReconciler, LAST_SYNC_FIELD};
use alphatrack::domain::task::Task;
use alphatrack::domain::trade::Trade;
use alphatrack::ports::storage_port::{IDENTITY_KEY, JOURNAL_KEY, TASKS_KEY, TRADES_KEY};
use common::*;
use serde_json::json;
use std::sync::Arc;

fn open_local(storage: &MemoryStorage) -> LedgerStore {
    LedgerStore::open(Box::new(storage.clone()), SyncReconciler::disabled()).unwrap()
}

fn load_synced(storage: &MemoryStorage, remote: &Arc<ScriptedRemote>, uid: &str) -> LedgerStore {
    let sync = SyncReconciler::new(remote.clone()).with_identity(uid);
    LedgerStore::load(Box::new(storage.clone()), sync).unwrap()
}

mod local_round_trip {
    use super::*;

    #[test]
    fn reopened_store_reproduces_sequences() {
        let storage = MemoryStorage::default();
        let before = {
            let mut store = open_local(&storage);
            store
                .add_trade(&trade_draft("2024-03-01", "EURUSD", "120", "2"))
                .unwrap();
            store
                .add_trade(&trade_draft("2024-03-02", "GBPUSD", "-40", "1.5"))
                .unwrap();
            let task = store.add_task("Size positions at 1% risk").unwrap();
            store.toggle_task(task).unwrap();
            store
                .add_journal(&journal_draft("2024-03-02", "Chased a move"))
                .unwrap();
            store.ledger().clone()
        };

        let reopened = open_local(&storage);
        assert_eq!(reopened.ledger(), &before);
        assert_eq!(reopened.tasks().len(), 4);
    }

    #[test]
    fn documents_are_written_under_their_keys() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        store
            .add_trade(&trade_draft("2024-03-01", "EURUSD", "10", "0"))
            .unwrap();

        let trades: Vec<Trade> = storage.decoded(TRADES_KEY);
        let tasks: Vec<Task> = storage.decoded(TASKS_KEY);
        let journal: Vec<JournalEntry> = storage.decoded(JOURNAL_KEY);
        assert_eq!(trades.len(), 1);
        assert_eq!(tasks.len(), 3);
        assert!(journal.is_empty());
    }

    #[test]
    fn legacy_documents_get_ids_and_numbers() {
        let legacy_trades = json!([
            {"date": "2024-01-05", "asset": "MSFT", "type": "stock", "side": "",
             "entry": "400", "exit": "410", "pl": "100", "commission": ""},
            {"date": "2024-01-06", "asset": "MSFT", "type": "stock",
             "entry": 410, "exit": 405, "pl": -50}
        ]);
        let storage =
            MemoryStorage::default().with_item(TRADES_KEY, &legacy_trades.to_string());

        let store = open_local(&storage);
        let ids: Vec<u64> = store.trades().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.trades()[0].pl, 100.0);
        assert_eq!(store.trades()[0].commission, 0.0);
        assert_eq!(store.trades()[0].side, None);

        let persisted: Vec<Trade> = storage.decoded(TRADES_KEY);
        assert_eq!(persisted[1].id, 2);
    }

    #[test]
    fn blank_or_garbled_prices_do_not_block_opening() {
        let storage = MemoryStorage::default().with_item(
            TRADES_KEY,
            r#"[{"id":1,"date":"2024-01-05","asset":"EURUSD","type":"forex","entry":"","exit":"1.1","pl":"12"},
                {"id":2,"date":"2024-01-06","asset":"AAPL","type":"stock","entry":"190","exit":"abc","pl":"-3","commission":"1"}]"#,
        );
        let store = open_local(&storage);

        assert_eq!(store.trades().len(), 2);
        assert_eq!(store.trades()[0].entry, 0.0);
        assert_eq!(store.trades()[0].pl, 12.0);
        assert_eq!(store.trades()[1].exit, 0.0);
        assert_eq!(store.trades()[1].net_pl(), -4.0);
    }

    #[test]
    fn corrupt_document_is_reported() {
        let storage = MemoryStorage::default().with_item(JOURNAL_KEY, "{not json");
        let err = LedgerStore::open(Box::new(storage), SyncReconciler::disabled())
            .err()
            .unwrap();
        assert!(matches!(err, AlphaTrackError::CorruptDocument { key, .. } if key == JOURNAL_KEY));
    }

    #[test]
    fn stored_empty_task_list_is_not_reseeded() {
        let storage = MemoryStorage::default().with_item(TASKS_KEY, "[]");
        let store = open_local(&storage);
        assert!(store.tasks().is_empty());
    }
}

mod stable_ids {
    use super::*;

    #[test]
    fn deleting_does_not_shift_other_entries() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        let a = store
            .add_trade(&trade_draft("2024-03-01", "AAA", "1", "0"))
            .unwrap();
        let b = store
            .add_trade(&trade_draft("2024-03-02", "BBB", "2", "0"))
            .unwrap();
        let c = store
            .add_trade(&trade_draft("2024-03-03", "CCC", "3", "0"))
            .unwrap();

        store.delete_trade(b).unwrap();

        assert_eq!(store.ledger().trade(a).unwrap().asset, "AAA");
        assert_eq!(store.ledger().trade(c).unwrap().asset, "CCC");
        assert!(store.ledger().trade(b).is_none());
    }

    #[test]
    fn stale_id_is_not_found_and_changes_nothing() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        let id = store
            .add_trade(&trade_draft("2024-03-01", "AAA", "1", "0"))
            .unwrap();
        store.delete_trade(id).unwrap();
        let snapshot = store.ledger().clone();

        let err = store.delete_trade(id).unwrap_err();
        assert!(matches!(
            err,
            AlphaTrackError::NotFound {
                kind: EntryKind::Trade,
                ..
            }
        ));
        let err = store
            .update_trade(id, &trade_draft("2024-03-01", "ZZZ", "1", "0"))
            .unwrap_err();
        assert!(matches!(err, AlphaTrackError::NotFound { .. }));
        assert_eq!(store.ledger(), &snapshot);
    }

    #[test]
    fn new_ids_follow_the_highest_id() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        let first = store.add_task("one").unwrap();
        let second = store.add_task("two").unwrap();
        assert!(second > first);
        store.delete_task(first).unwrap();
        let third = store.add_task("three").unwrap();
        assert!(third > second);
    }

    #[test]
    fn id_of_deleted_newest_trade_is_never_reissued() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        store
            .add_trade(&trade_draft("2024-03-01", "AAA", "1", "0"))
            .unwrap();
        let newest = store
            .add_trade(&trade_draft("2024-03-02", "BBB", "2", "0"))
            .unwrap();
        store.delete_trade(newest).unwrap();

        let fresh = store
            .add_trade(&trade_draft("2024-03-03", "CCC", "3", "0"))
            .unwrap();
        assert_ne!(fresh, newest);

        let err = store
            .update_trade(newest, &trade_draft("2024-03-04", "ZZZ", "4", "0"))
            .unwrap_err();
        assert!(matches!(err, AlphaTrackError::NotFound { .. }));
        assert_eq!(store.ledger().trade(fresh).unwrap().asset, "CCC");
    }

    #[test]
    fn retired_ids_stay_retired_across_reopen() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        let first = store.add_task("one").unwrap();
        let newest = store.add_task("two").unwrap();
        store.delete_task(newest).unwrap();
        drop(store);

        let mut store = open_local(&storage);
        let next = store.add_task("three").unwrap();
        assert!(next > newest);
        assert!(store.ledger().task(first).is_some());
    }

    #[test]
    fn pulled_ledger_with_fewer_entries_keeps_issued_ids() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default());
        let mut store = load_synced(&storage, &remote, "u1");
        store
            .add_trade(&trade_draft("2024-03-01", "AAA", "1", "0"))
            .unwrap();
        let newest = store
            .add_trade(&trade_draft("2024-03-02", "BBB", "2", "0"))
            .unwrap();
        store.sync().wait_idle();

        remote
            .docs
            .lock()
            .unwrap()
            .get_mut("u1")
            .unwrap()
            .insert("trades".into(), json!([make_trade(1, "2024-03-01", 1.0, 0.0)]));
        assert!(store.pull().unwrap());
        assert_eq!(store.trades().len(), 1);
        let fresh = store
            .add_trade(&trade_draft("2024-03-03", "CCC", "3", "0"))
            .unwrap();
        assert!(fresh > newest);
    }

    #[test]
    fn newest_journal_entry_comes_first() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        store
            .add_journal(&journal_draft("2024-03-01", "first"))
            .unwrap();
        store
            .add_journal(&journal_draft("2024-02-01", "second"))
            .unwrap();
        let titles: Vec<&str> = store.journal().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }
}

mod subscribers {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn notified_after_successful_mutations_only() {
        let storage = MemoryStorage::default();
        let mut store = open_local(&storage);
        let seen = Rc::new(Cell::new(0usize));
        let counter = seen.clone();
        store.subscribe(move |_ledger: &Ledger| counter.set(counter.get() + 1));

        store.add_task("review journal").unwrap();
        assert!(store.add_task("   ").is_err());
        storage.fail_writes.set(true);
        assert!(store.add_task("never stored").is_err());

        assert_eq!(seen.get(), 1);
        assert!(store.tasks().iter().all(|t| t.text != "never stored"));
    }
}

mod remote_sync {
    use super::*;

    fn remote_ledger() -> serde_json::Value {
        json!({
            "trades": [
                {"id": 7, "date": "2024-02-01", "asset": "USDJPY", "type": "forex",
                 "side": "Short", "entry": 150.1, "exit": 149.6, "pl": 80, "commission": 3}
            ],
            "tasks": [{"id": 1, "text": "Remote checklist item", "completed": true}],
            "journal": [
                {"id": 4, "title": "From the laptop", "date": "2024-02-01", "content": ""}
            ],
            "lastSync": "2024-02-01T10:00:00.000Z",
            "settings": {"theme": "dark"}
        })
    }

    #[test]
    fn load_overwrites_memory_and_local_storage_with_remote() {
        let storage = MemoryStorage::default();
        {
            let mut local = open_local(&storage);
            local
                .add_trade(&trade_draft("2024-01-01", "LOCAL", "5", "0"))
                .unwrap();
        }

        let remote = Arc::new(ScriptedRemote::default().with_document("u1", remote_ledger()));
        let store = load_synced(&storage, &remote, "u1");

        assert_eq!(store.trades().len(), 1);
        assert_eq!(store.trades()[0].asset, "USDJPY");
        assert_eq!(store.trades()[0].id, 7);
        assert_eq!(store.tasks()[0].text, "Remote checklist item");
        assert_eq!(store.journal()[0].title, "From the laptop");

        let stored_trades: Vec<Trade> = storage.decoded(TRADES_KEY);
        let stored_tasks: Vec<Task> = storage.decoded(TASKS_KEY);
        let stored_journal: Vec<JournalEntry> = storage.decoded(JOURNAL_KEY);
        assert_eq!(stored_trades, store.trades());
        assert_eq!(stored_tasks, store.tasks());
        assert_eq!(stored_journal, store.journal());
    }

    #[test]
    fn sequences_missing_remotely_are_kept() {
        let storage = MemoryStorage::default();
        {
            let mut local = open_local(&storage);
            local
                .add_journal(&journal_draft("2024-01-01", "local only"))
                .unwrap();
        }
        let remote = Arc::new(
            ScriptedRemote::default().with_document("u1", json!({"trades": [], "journal": null})),
        );
        let store = load_synced(&storage, &remote, "u1");
        assert!(store.trades().is_empty());
        assert_eq!(store.journal()[0].title, "local only");
        assert_eq!(store.tasks().len(), 3);
    }

    #[test]
    fn missing_remote_document_leaves_local_state() {
        let storage = MemoryStorage::default();
        {
            let mut local = open_local(&storage);
            local
                .add_trade(&trade_draft("2024-01-01", "LOCAL", "5", "0"))
                .unwrap();
        }
        let remote = Arc::new(ScriptedRemote::default());
        let store = load_synced(&storage, &remote, "u1");
        assert_eq!(store.trades()[0].asset, "LOCAL");
    }

    #[test]
    fn mutation_pushes_full_ledger_and_keeps_other_fields() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default().with_document("u1", remote_ledger()));
        let mut store = load_synced(&storage, &remote, "u1");

        store
            .add_trade(&trade_draft("2024-02-02", "EURUSD", "25", "1"))
            .unwrap();
        store.sync().wait_idle();

        let doc = remote.document("u1").unwrap();
        assert_eq!(doc["trades"].as_array().unwrap().len(), 2);
        assert_eq!(doc["settings"], json!({"theme": "dark"}));
        assert_ne!(doc[LAST_SYNC_FIELD], json!("2024-02-01T10:00:00.000Z"));
        assert_eq!(remote.merge_count(), 1);
    }

    #[test]
    fn remote_failure_never_fails_a_mutation() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default());
        remote.set_offline(true);
        let mut store = load_synced(&storage, &remote, "u1");

        let id = store
            .add_trade(&trade_draft("2024-02-02", "EURUSD", "25", "1"))
            .unwrap();
        store.sync().wait_idle();

        assert_eq!(store.ledger().trade(id).unwrap().asset, "EURUSD");
        let stored: Vec<Trade> = storage.decoded(TRADES_KEY);
        assert_eq!(stored.len(), 1);
        assert_eq!(remote.merge_count(), 0);
    }

    #[test]
    fn explicit_push_reports_remote_failure() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default());
        let store = load_synced(&storage, &remote, "u1");
        remote.set_offline(true);
        assert!(matches!(
            store.push_now(),
            Err(AlphaTrackError::RemoteUnavailable { .. })
        ));
    }

    #[test]
    fn identity_is_remembered_across_opens() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default().with_document("trader@example.com", remote_ledger()));
        {
            let mut store =
                LedgerStore::open(Box::new(storage.clone()), SyncReconciler::new(remote.clone()))
                    .unwrap();
            store.set_identity("  trader@example.com ").unwrap();
        }
        assert_eq!(storage.raw(IDENTITY_KEY).as_deref(), Some("trader@example.com"));

        let store = LedgerStore::load(Box::new(storage.clone()), SyncReconciler::new(remote.clone()))
            .unwrap();
        assert_eq!(store.sync().identity(), Some("trader@example.com"));
        assert_eq!(store.trades()[0].asset, "USDJPY");
    }

    #[test]
    fn logged_out_store_does_not_push() {
        let storage = MemoryStorage::default();
        let remote = Arc::new(ScriptedRemote::default());
        let mut store = load_synced(&storage, &remote, "u1");
        store.clear_identity().unwrap();
        store.add_task("offline task").unwrap();
        store.sync().wait_idle();
        assert_eq!(remote.merge_count(), 0);
        assert!(storage.raw(IDENTITY_KEY).is_none());
    }
}
