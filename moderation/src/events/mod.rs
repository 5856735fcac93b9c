//! Moderation audit events
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Coordinator  │────▶│  Event Bus   │────▶│  Subscribers │
//! │  (publish)   │     │  (broadcast) │     │ (audit log…) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use moderation::events::{EventBus, ModerationEvent};
//!
//! let bus = EventBus::new().shared();
//! let mut receiver = bus.subscribe();
//! // ... coordinator publishes ...
//! let event = receiver.recv().await?;
//! println!("{}", event.event_type());
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, SharedEventBus};
pub use types::{EventId, ModerationEvent};
