//! Per-subject infraction point balances

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::store::schema;
use crate::store::SharedStore;

/// Persisted point balance of one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBalance {
    pub subject_id: String,
    pub points: u32,
    pub updated_at: DateTime<Utc>,
}

/// Mutex-guarded map of balances with optional write-through persistence.
///
/// Every mutation of a subject's balance, including its flush, happens while
/// holding the map lock, so updates on the same subject are strictly ordered.
pub struct BalanceBook {
    balances: Mutex<HashMap<String, u32>>,
    store: Option<SharedStore<PointBalance>>,
}

impl BalanceBook {
    /// Volatile balances; reset on restart
    pub fn volatile() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            store: None,
        }
    }

    /// Balances backed by `store`, loading whatever it already holds
    pub fn persistent(store: SharedStore<PointBalance>) -> Self {
        let balances: HashMap<String, u32> = store
            .get_all()
            .into_iter()
            .map(|b| (b.subject_id, b.points))
            .collect();
        info!(subjects = balances.len(), "Point balances loaded");
        Self {
            balances: Mutex::new(balances),
            store: Some(store),
        }
    }

    /// Whether balances survive a restart
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Current balance; zero for unknown subjects
    pub fn get(&self, subject_id: &str) -> u32 {
        let balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        balances.get(subject_id).copied().unwrap_or(0)
    }

    /// Apply `update` to the subject's balance and persist the result.
    /// Returns the new balance.
    pub fn update(&self, subject_id: &str, update: impl FnOnce(u32) -> u32) -> u32 {
        let mut balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        let current = balances.get(subject_id).copied().unwrap_or(0);
        let total = update(current);
        balances.insert(subject_id.to_string(), total);
        self.persist(subject_id, total);
        total
    }

    fn persist(&self, subject_id: &str, points: u32) {
        let Some(store) = &self.store else {
            return;
        };
        let balance = PointBalance {
            subject_id: subject_id.to_string(),
            points,
            updated_at: Utc::now(),
        };
        if let Err(first) = store.put(&schema::balance_key(subject_id), balance) {
            warn!(subject = %subject_id, error = %first, "Balance write failed, retrying flush");
            if let Err(second) = store.flush() {
                error!(
                    subject = %subject_id,
                    points,
                    error = %second,
                    "Balance kept in memory only; durable write failed twice"
                );
            }
        }
    }

    /// Snapshot of all balances, sorted by subject
    pub fn snapshot(&self) -> Vec<(String, u32)> {
        let balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        let mut all: Vec<(String, u32)> = balances.iter().map(|(k, v)| (k.clone(), *v)).collect();
        all.sort();
        all
    }
}
