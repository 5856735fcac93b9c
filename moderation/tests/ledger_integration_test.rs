//! Integration tests for the Case Ledger over the JSON file store
//!
//! Covers numbering under concurrency, restart recovery and degraded
//! persistence.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use moderation::ledger::{CaseLedger, CaseRecord, ModAction, NewCase};
use moderation::store::{JsonFileStore, KeyedStore, MemoryStore, StoreError, StoreResult};

fn open_ledger(path: &std::path::Path) -> CaseLedger {
    CaseLedger::open(Arc::new(JsonFileStore::<CaseRecord>::open(path)))
}

// ── numbering ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocation_is_contiguous_and_unique() {
    let ledger = CaseLedger::open(Arc::new(MemoryStore::<CaseRecord>::new())).shared();

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.next_case_number() })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in futures::future::join_all(handles).await {
        numbers.push(handle.unwrap());
    }
    numbers.sort_unstable();

    assert_eq!(numbers, (1..=64).collect::<Vec<u64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_record_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.json");
    let ledger = open_ledger(&path).shared();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                let ticket = ledger.allocate();
                let subject = format!("user-{}", i % 3);
                ledger
                    .record(ticket, NewCase::new(ModAction::Warn, subject, "mod-1", "spam"))
                    .record
                    .case_number
            })
        })
        .collect();

    let numbers: BTreeSet<u64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap())
        .collect();
    assert_eq!(numbers.len(), 20);
    drop(ledger);

    let reopened = open_ledger(&path);
    assert_eq!(reopened.total_cases(), 20);
    assert_eq!(reopened.peek_next(), 21);
}

#[test]
fn test_restart_resumes_after_highest_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.json");

    {
        let ledger = open_ledger(&path);
        for _ in 0..5 {
            let ticket = ledger.allocate();
            ledger.record(ticket, NewCase::new(ModAction::Kick, "s", "m", "r"));
        }
        assert!(ledger.delete(3));
        assert!(ledger.delete(4));
    }

    let ledger = open_ledger(&path);
    let remaining: Vec<u64> = ledger.all_cases().iter().map(|r| r.case_number).collect();
    assert_eq!(remaining, vec![1, 2, 5]);
    assert_eq!(ledger.next_case_number(), 6);
}

#[test]
fn test_missing_and_corrupt_files_start_empty() {
    let dir = tempfile::tempdir().unwrap();

    let missing = open_ledger(&dir.path().join("nested/never-written.json"));
    assert_eq!(missing.total_cases(), 0);
    assert_eq!(missing.peek_next(), 1);

    let corrupt_path = dir.path().join("cases.json");
    std::fs::write(&corrupt_path, "{ not json").unwrap();
    let corrupt = open_ledger(&corrupt_path);
    assert_eq!(corrupt.total_cases(), 0);
    assert!(dir.path().join("cases.json.corrupt").exists());
}

// ── queries ──────────────────────────────────────────────────────────

#[test]
fn test_queries_are_ordered_by_case_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.json");
    let ledger = open_ledger(&path);

    let plan = [
        (ModAction::Warn, "alice", "mod-a"),
        (ModAction::Mute, "bob", "mod-b"),
        (ModAction::Warn, "alice", "mod-b"),
        (ModAction::Ban, "alice", "mod-a"),
    ];
    for (action, subject, actor) in plan {
        let ticket = ledger.allocate();
        ledger.record(ticket, NewCase::new(action, subject, actor, ""));
    }

    let reopened = open_ledger(&path);
    let alice: Vec<(u64, ModAction)> = reopened
        .find_by_target("alice")
        .iter()
        .map(|r| (r.case_number, r.action))
        .collect();
    assert_eq!(
        alice,
        vec![(1, ModAction::Warn), (3, ModAction::Warn), (4, ModAction::Ban)]
    );

    let by_b: Vec<u64> = reopened
        .find_by_actor("mod-b")
        .iter()
        .map(|r| r.case_number)
        .collect();
    assert_eq!(by_b, vec![2, 3]);
    assert_eq!(reopened.find_by_action(ModAction::Warn).len(), 2);
    assert_eq!(reopened.get(2).unwrap().subject_id, "bob");
    assert_eq!(reopened.get(4).unwrap().reason, "No reason provided");
}

// ── degraded persistence ─────────────────────────────────────────────

/// Store whose writes fail a fixed number of times before succeeding
struct FlakyStore {
    inner: MemoryStore<CaseRecord>,
    failures_left: AtomicUsize,
    flush_calls: AtomicUsize,
}

impl FlakyStore {
    fn failing(times: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures_left: AtomicUsize::new(times),
            flush_calls: AtomicUsize::new(0),
        }
    }

    fn write(&self) -> StoreResult<()> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl KeyedStore<CaseRecord> for FlakyStore {
    fn put(&self, key: &str, value: CaseRecord) -> StoreResult<()> {
        self.inner.put(key, value)?;
        self.write()
    }

    fn get(&self, key: &str) -> Option<CaseRecord> {
        self.inner.get(key)
    }

    fn entries(&self) -> Vec<(String, CaseRecord)> {
        self.inner.entries()
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed = self.inner.delete(key)?;
        self.write()?;
        Ok(removed)
    }

    fn flush(&self) -> StoreResult<()> {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        self.write()
    }
}

#[test]
fn test_single_write_failure_recovers_on_retry() {
    let store = Arc::new(FlakyStore::failing(1));
    let ledger = CaseLedger::open(store.clone());

    let ticket = ledger.allocate();
    let recorded = ledger.record(ticket, NewCase::new(ModAction::Kick, "s", "m", "r"));

    assert!(recorded.persisted);
    assert_eq!(store.flush_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_double_write_failure_keeps_case_in_memory() {
    let store = Arc::new(FlakyStore::failing(2));
    let ledger = CaseLedger::open(store.clone());

    let ticket = ledger.allocate();
    let recorded = ledger.record(ticket, NewCase::new(ModAction::Kick, "s", "m", "r"));

    assert!(!recorded.persisted);
    assert_eq!(recorded.record.case_number, 1);
    assert_eq!(ledger.get(1).unwrap().action, ModAction::Kick);
    assert_eq!(ledger.peek_next(), 2);
}
