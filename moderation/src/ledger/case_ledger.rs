//! Case-number assignment and CRUD over the case store
//!
//! The counter is initialized once at startup from the persisted state
//! (`max(existing) + 1`) and only ever moves forward, so numbers freed by
//! deleted cases are never reused.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use super::types::{CaseRecord, ModAction, NewCase};
use crate::store::schema;
use crate::store::SharedStore;

/// Shared reference to a CaseLedger
pub type SharedCaseLedger = Arc<CaseLedger>;

/// Reservation of a case number.
///
/// Handed out by [`CaseLedger::allocate`] and consumed by
/// [`CaseLedger::record`]. Dropping a ticket without recording it is logged
/// as an error: an allocated number must always end in a recorded case.
#[derive(Debug)]
#[must_use = "an allocated case number must be recorded"]
pub struct CaseTicket {
    case_number: u64,
    recorded: bool,
}

impl CaseTicket {
    /// The reserved case number
    pub fn case_number(&self) -> u64 {
        self.case_number
    }
}

impl Drop for CaseTicket {
    fn drop(&mut self) {
        if !self.recorded {
            error!(
                case_number = self.case_number,
                "Case number allocated but never recorded"
            );
        }
    }
}

/// Result of recording a case
#[derive(Debug, Clone)]
pub struct RecordedCase {
    /// The record as written to the in-memory view
    pub record: CaseRecord,
    /// Whether the write reached durable storage
    pub persisted: bool,
}

/// Owner of case numbering and case records
pub struct CaseLedger {
    store: SharedStore<CaseRecord>,
    next_case: Mutex<u64>,
}

impl CaseLedger {
    /// Open a ledger over `store`, resuming numbering after the highest
    /// persisted case.
    pub fn open(store: SharedStore<CaseRecord>) -> Self {
        let highest = Self::highest_case_number(&store);
        let next_case = highest.checked_add(1).unwrap_or_else(|| {
            error!(highest, "Highest case number is at the numeric limit; numbering saturates");
            u64::MAX
        });
        info!(existing = store.len(), next_case, "Case ledger opened");
        Self {
            store,
            next_case: Mutex::new(next_case),
        }
    }

    /// Create a shared reference to this ledger
    pub fn shared(self) -> SharedCaseLedger {
        Arc::new(self)
    }

    fn highest_case_number(store: &SharedStore<CaseRecord>) -> u64 {
        store
            .entries()
            .into_iter()
            .filter_map(|(key, record)| match schema::parse_case_key(&key) {
                Some(n) if n == record.case_number => Some(n),
                Some(n) => {
                    warn!(
                        key = %key,
                        case_number = record.case_number,
                        "Case key does not match record number"
                    );
                    Some(n.max(record.case_number))
                }
                None => {
                    warn!(key = %key, "Ignoring non-numeric case key");
                    None
                }
            })
            .max()
            .unwrap_or(0)
    }

    /// Return a case number never previously issued by this ledger.
    pub fn next_case_number(&self) -> u64 {
        // A poisoned counter still holds a valid value; keep issuing from it.
        let mut next = self.next_case.lock().unwrap_or_else(|p| p.into_inner());
        let case_number = *next;
        *next = next.checked_add(1).unwrap_or_else(|| {
            error!(case_number, "Case numbering exhausted");
            case_number
        });
        case_number
    }

    /// Reserve the next case number
    pub fn allocate(&self) -> CaseTicket {
        CaseTicket {
            case_number: self.next_case_number(),
            recorded: false,
        }
    }

    /// Number the next allocation would receive. Does not allocate.
    pub fn peek_next(&self) -> u64 {
        *self.next_case.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Write a case under the ticket's number.
    ///
    /// Persistence failures are retried once and then logged; the case stays
    /// in the in-memory view and `persisted` is false.
    pub fn record(&self, mut ticket: CaseTicket, case: NewCase) -> RecordedCase {
        ticket.recorded = true;
        let record = case.into_record(ticket.case_number);
        let persisted = self.persist(&record);

        info!(
            case_number = record.case_number,
            action = %record.action,
            subject = %record.subject_id,
            actor = %record.actor_id,
            status = ?record.status,
            "Case recorded"
        );

        RecordedCase { record, persisted }
    }

    fn persist(&self, record: &CaseRecord) -> bool {
        let key = schema::case_key(record.case_number);
        let first = match self.store.put(&key, record.clone()) {
            Ok(()) => return true,
            Err(e) => e,
        };

        warn!(
            case_number = record.case_number,
            error = %first,
            "Case write failed, retrying flush"
        );

        match self.store.flush() {
            Ok(()) => true,
            Err(second) => {
                error!(
                    case_number = record.case_number,
                    error = %second,
                    "Case kept in memory only; durable write failed twice"
                );
                false
            }
        }
    }

    /// Fetch a case by number
    pub fn get(&self, case_number: u64) -> Option<CaseRecord> {
        self.store.get(&schema::case_key(case_number))
    }

    /// Delete a case. Returns false when no such case exists.
    pub fn delete(&self, case_number: u64) -> bool {
        let key = schema::case_key(case_number);
        match self.store.delete(&key) {
            Ok(removed) => {
                if removed {
                    info!(case_number, "Case deleted");
                }
                removed
            }
            Err(first) => {
                warn!(case_number, error = %first, "Case delete flush failed, retrying");
                if let Err(second) = self.store.flush() {
                    error!(
                        case_number,
                        error = %second,
                        "Case deleted in memory only; durable write failed twice"
                    );
                }
                true
            }
        }
    }

    /// Cases targeting `subject_id`, ascending by case number
    pub fn find_by_target(&self, subject_id: &str) -> Vec<CaseRecord> {
        self.select(|r| r.subject_id == subject_id)
    }

    /// Cases issued by `actor_id`, ascending by case number
    pub fn find_by_actor(&self, actor_id: &str) -> Vec<CaseRecord> {
        self.select(|r| r.actor_id == actor_id)
    }

    /// Cases of kind `action`, ascending by case number
    pub fn find_by_action(&self, action: ModAction) -> Vec<CaseRecord> {
        self.select(|r| r.action == action)
    }

    /// Every case, ascending by case number
    pub fn all_cases(&self) -> Vec<CaseRecord> {
        self.select(|_| true)
    }

    /// Total number of stored cases
    pub fn total_cases(&self) -> usize {
        self.store.len()
    }

    /// Number of stored cases per action kind
    pub fn counts_by_action(&self) -> BTreeMap<ModAction, usize> {
        let mut counts = BTreeMap::new();
        for record in self.store.get_all() {
            *counts.entry(record.action).or_insert(0) += 1;
        }
        counts
    }

    fn select(&self, predicate: impl Fn(&CaseRecord) -> bool) -> Vec<CaseRecord> {
        let mut matches: Vec<CaseRecord> = self
            .store
            .get_all()
            .into_iter()
            .filter(|r| predicate(r))
            .collect();
        matches.sort_by_key(|r| r.case_number);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::CaseStatus;
    use crate::store::{KeyedStore, MemoryStore};
    use chrono::Utc;
    use serde_json::Value;

    fn record(case_number: u64, action: ModAction, subject: &str) -> CaseRecord {
        CaseRecord {
            case_number,
            action,
            subject_id: subject.to_string(),
            actor_id: "mod-1".to_string(),
            reason: "test".to_string(),
            created_at: Utc::now(),
            status: CaseStatus::Completed,
            extra: Value::Null,
        }
    }

    fn ledger_with(records: Vec<CaseRecord>) -> CaseLedger {
        let store = MemoryStore::from_entries(
            records
                .into_iter()
                .map(|r| (schema::case_key(r.case_number), r)),
        );
        CaseLedger::open(Arc::new(store))
    }

    #[test]
    fn test_empty_ledger_starts_at_one() {
        let ledger = ledger_with(vec![]);
        assert_eq!(ledger.next_case_number(), 1);
        assert_eq!(ledger.next_case_number(), 2);
    }

    #[test]
    fn test_maximal_persisted_number_does_not_overflow() {
        let ledger = ledger_with(vec![record(u64::MAX, ModAction::Warn, "a")]);
        assert_eq!(ledger.peek_next(), u64::MAX);
        assert_eq!(ledger.next_case_number(), u64::MAX);
        assert_eq!(ledger.peek_next(), u64::MAX);
    }

    #[test]
    fn test_resumes_after_highest_not_first_gap() {
        let ledger = ledger_with(vec![
            record(1, ModAction::Warn, "a"),
            record(2, ModAction::Kick, "a"),
            record(5, ModAction::Ban, "b"),
        ]);
        assert_eq!(ledger.peek_next(), 6);
        assert_eq!(ledger.next_case_number(), 6);
    }

    #[test]
    fn test_non_numeric_keys_do_not_affect_numbering() {
        let store = MemoryStore::new();
        store.put("legacy", record(900, ModAction::Warn, "x")).unwrap();
        store.put("3", record(3, ModAction::Warn, "x")).unwrap();
        let ledger = CaseLedger::open(Arc::new(store));
        assert_eq!(ledger.peek_next(), 4);
    }

    #[test]
    fn test_record_and_query_sorted() {
        let ledger = ledger_with(vec![]);
        for subject in ["b", "a", "b"] {
            let ticket = ledger.allocate();
            let out = ledger.record(ticket, NewCase::new(ModAction::Warn, subject, "mod-1", "r"));
            assert!(out.persisted);
        }

        let for_b: Vec<u64> = ledger
            .find_by_target("b")
            .iter()
            .map(|r| r.case_number)
            .collect();
        assert_eq!(for_b, vec![1, 3]);
        assert_eq!(ledger.find_by_actor("mod-1").len(), 3);
        assert_eq!(ledger.find_by_action(ModAction::Warn).len(), 3);
        assert!(ledger.find_by_action(ModAction::Ban).is_empty());
    }

    #[test]
    fn test_deleted_numbers_are_not_reused() {
        let ledger = ledger_with(vec![]);
        let t = ledger.allocate();
        ledger.record(t, NewCase::new(ModAction::Kick, "s", "m", "r"));

        assert!(ledger.delete(1));
        assert!(!ledger.delete(1));
        assert_eq!(ledger.total_cases(), 0);
        assert_eq!(ledger.peek_next(), 2);
    }

    #[test]
    fn test_counts_by_action() {
        let ledger = ledger_with(vec![
            record(1, ModAction::Warn, "a"),
            record(2, ModAction::Warn, "b"),
            record(3, ModAction::Mute, "a"),
        ]);
        let counts = ledger.counts_by_action();
        assert_eq!(counts.get(&ModAction::Warn), Some(&2));
        assert_eq!(counts.get(&ModAction::Mute), Some(&1));
        assert_eq!(ledger.total_cases(), 3);
    }
}
