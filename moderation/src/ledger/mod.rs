//! Case Ledger: numbered, immutable records of disciplinary actions
//!
//! Every action that reaches the platform-side step is recorded here,
//! including actions whose side effect failed. Numbers are handed out as
//! [`CaseTicket`]s so that an allocation cannot be silently dropped.
//!
//! # Numbering
//!
//! ```text
//! persisted {1, 2, 5}  ──open──▶  next = 6
//! allocate() → #6, allocate() → #7, delete(#7), allocate() → #8
//! ```

pub mod case_ledger;
pub mod types;

pub use case_ledger::{CaseLedger, CaseTicket, RecordedCase, SharedCaseLedger};
pub use types::{reason_or_default, CaseRecord, CaseStatus, ModAction, NewCase, DEFAULT_REASON};
