//! Infraction points and automatic bans
//!
//! ```text
//!  warn ──► add warn_points ──► total ≥ ban_threshold ?
//!                                   │ no  → done
//!                                   │ yes
//!                                   ▼
//!                      warning actor can ban ? ── yes → AutoBan(actor)
//!                                   │ no
//!                                   ▼
//!           applies_regardless_of_warning_actor_tier ? ── yes → AutoBan(system)
//!                                   │ no
//!                                   ▼
//!                               suppressed
//! ```
//!
//! Balances never go below zero and are not reset by an automatic ban.

pub mod balance;
pub mod engine;

pub use balance::{BalanceBook, PointBalance};
pub use engine::{
    AutoBan, EscalationConfig, EscalationDecision, EscalationEngine, SharedEscalationEngine,
};
