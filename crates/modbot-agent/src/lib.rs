//! Moderation agent
//!
//! Hosts the moderation core outside a chat platform:
//! - `config`: TOML + environment configuration
//! - `platform`: dry-run executor and logging notifier
//! - `audit`: JSON-lines audit log subscribed to the event bus
//! - `runtime`: builds the coordinator and applies request streams

pub mod audit;
pub mod config;
pub mod platform;
pub mod runtime;

pub use config::{AgentConfig, ConfigError};
pub use runtime::Runtime;
