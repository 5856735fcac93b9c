//! Action Coordinator
//!
//! # Invocation state machine
//!
//! ```text
//! request
//!   │
//!   ├─ blacklisted? ─────────────────────────────► Blacklisted
//!   ├─ classify → tier; tier permits action? ────► Unauthorized
//!   ├─ member action: owner subject / rank check ► ProtectedSubject | HierarchyViolation
//!   ├─ parameter bounds ─────────────────────────► InvalidParameter
//!   │                     (nothing allocated above this line)
//!   ├─ allocate case #N
//!   ├─ notify subject        (best effort, flag only)
//!   ├─ execute side effect   (failure → case recorded as failed)
//!   ├─ record case #N
//!   └─ warn only: add points → threshold? → allocate/notify/execute/record ban #N+k
//! ```
//!
//! The platform is reached only through the [`PlatformExecutor`] and
//! [`SubjectNotifier`] traits.

pub mod collaborators;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod validate;

pub use collaborators::{
    ExecutionError, ExecutionReceipt, ExecutionRequest, NotifyError, PlatformEffect,
    PlatformExecutor, SharedExecutor, SharedNotifier, SubjectNotice, SubjectNotifier,
};
pub use error::{ErrorKind, ModerationError, ModerationResult};
pub use pipeline::{ActionCoordinator, SharedActionCoordinator};
pub use request::{ActionOutcome, ActionRequest};
pub use validate::{validate, ValidatedAction, DELETE_DAYS, MUTE_MINUTES, PURGE_COUNT};
