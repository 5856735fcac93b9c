//! Tiered permissions for moderation actions
//!
//! # Tiers
//!
//! - **None**: no moderation capability
//! - **Limited**: warn, kick, purge
//! - **Full**: every action (owners and administrators always land here)
//!
//! # Hierarchy
//!
//! An actor may not act on a subject of equal or greater rank unless the
//! actor is the owning principal of the community.

pub mod policy;
pub mod tier;

pub use policy::{AuthorizationService, AuthzPolicy};
pub use tier::{ActorIdentity, PermissionTier};
