//! Durable keyed storage for moderation state
//!
//! The store knows nothing about moderation semantics. It holds a keyed
//! collection of serializable values and rewrites its backing file in full
//! on every mutation.
//!
//! # Layout
//!
//! - `keyed`: the [`KeyedStore`] contract and its error type
//! - `json_file`: JSON-file backed implementation used in production
//! - `memory`: volatile implementation for tests and ephemeral runs
//! - `schema`: key derivation and default file locations
//!
//! # Usage
//!
//! ```ignore
//! use moderation::store::{JsonFileStore, KeyedStore};
//! use moderation::ledger::CaseRecord;
//!
//! let store: JsonFileStore<CaseRecord> = JsonFileStore::open("data/cases.json");
//! let all = store.get_all();
//! ```

pub mod json_file;
pub mod keyed;
pub mod memory;
pub mod schema;

pub use json_file::JsonFileStore;
pub use keyed::{KeyedStore, SharedStore, StoreError, StoreResult};
pub use memory::MemoryStore;
