//! Moderation core library
//!
//! This library provides the bookkeeping and decision core of a community
//! moderation agent:
//! - Durable, uniquely numbered case records for every disciplinary action
//! - Per-subject infraction points with automatic ban escalation
//! - Tiered authorization with a rank hierarchy rule
//! - A coordinator that sequences the above around platform side effects
//!
//! # Components
//!
//! ## Storage
//! - `store`: generic keyed JSON store with atomic rewrite and load recovery
//!
//! ## Domain
//! - `ledger`: case numbering and case queries
//! - `escalation`: point balances and the auto-ban decision
//! - `authz`: tier classification and hierarchy check
//!
//! ## Orchestration
//! - `coordinator`: request → outcome pipeline, error taxonomy, platform seam
//! - `events`: broadcast bus of audit events
//!
//! # Usage
//!
//! ```ignore
//! use moderation::prelude::*;
//!
//! let ledger = CaseLedger::open(Arc::new(JsonFileStore::open("data/cases.json"))).shared();
//! let escalation = EscalationEngine::new(EscalationConfig::default()).shared();
//! let coordinator = ActionCoordinator::new(
//!     ledger,
//!     escalation,
//!     AuthorizationService::new(policy),
//!     executor,
//!     notifier,
//!     EventBus::new().shared(),
//! );
//! let outcome = coordinator.handle(request).await;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod authz;
pub mod coordinator;
pub mod escalation;
pub mod events;
pub mod ledger;
pub mod store;

/// Commonly used types
pub mod prelude {
    pub use crate::authz::{ActorIdentity, AuthorizationService, AuthzPolicy, PermissionTier};
    pub use crate::coordinator::{
        ActionCoordinator, ActionOutcome, ActionRequest, ErrorKind, ModerationError,
        PlatformExecutor, SharedActionCoordinator, SubjectNotifier,
    };
    pub use crate::escalation::{EscalationConfig, EscalationEngine};
    pub use crate::events::{EventBus, ModerationEvent};
    pub use crate::ledger::{CaseLedger, CaseRecord, CaseStatus, ModAction};
    pub use crate::store::{JsonFileStore, KeyedStore, MemoryStore};
    pub use std::sync::Arc;
}
