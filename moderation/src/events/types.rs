//! Moderation audit events
//!
//! Published by the coordinator after each invocation step that an audit
//! trail cares about. Consumers render or persist them; the core never does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::ModAction;

/// Unique identifier for events
pub type EventId = String;

/// All moderation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModerationEvent {
    /// An action's side effect happened and its case was recorded
    ActionCompleted {
        case_number: u64,
        action: ModAction,
        subject_id: String,
        actor_id: String,
        reason: String,
        notified_subject: bool,
        timestamp: DateTime<Utc>,
    },

    /// The platform refused or failed the side effect; the case was
    /// recorded with failed status
    ActionFailed {
        case_number: u64,
        action: ModAction,
        subject_id: String,
        actor_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// A request was turned away before a case number was allocated
    ActionRejected {
        action: ModAction,
        subject_id: String,
        actor_id: String,
        error_kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// An inbound request could not be decoded into an action
    RequestMalformed {
        error_kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A warn pushed a subject to the threshold and a ban followed
    AutoBanTriggered {
        warn_case_number: u64,
        ban_case_number: u64,
        subject_id: String,
        attributed_to: String,
        points_total: u32,
        timestamp: DateTime<Utc>,
    },

    /// Threshold reached but the ban was withheld for the warning actor's tier
    AutoBanSuppressed {
        warn_case_number: u64,
        subject_id: String,
        actor_id: String,
        points_total: u32,
        timestamp: DateTime<Utc>,
    },

    /// A case is held in memory only after its durable write failed twice
    PersistenceDegraded {
        case_number: u64,
        timestamp: DateTime<Utc>,
    },

    /// A case was deleted by an administrator
    CaseDeleted {
        case_number: u64,
        actor_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Points were removed from a subject's balance
    PointsRemoved {
        subject_id: String,
        actor_id: String,
        points: u32,
        points_total: u32,
        timestamp: DateTime<Utc>,
    },
}

impl ModerationEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ActionCompleted { .. } => "action_completed",
            Self::ActionFailed { .. } => "action_failed",
            Self::ActionRejected { .. } => "action_rejected",
            Self::RequestMalformed { .. } => "request_malformed",
            Self::AutoBanTriggered { .. } => "auto_ban_triggered",
            Self::AutoBanSuppressed { .. } => "auto_ban_suppressed",
            Self::PersistenceDegraded { .. } => "persistence_degraded",
            Self::CaseDeleted { .. } => "case_deleted",
            Self::PointsRemoved { .. } => "points_removed",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ActionCompleted { timestamp, .. }
            | Self::ActionFailed { timestamp, .. }
            | Self::ActionRejected { timestamp, .. }
            | Self::RequestMalformed { timestamp, .. }
            | Self::AutoBanTriggered { timestamp, .. }
            | Self::AutoBanSuppressed { timestamp, .. }
            | Self::PersistenceDegraded { timestamp, .. }
            | Self::CaseDeleted { timestamp, .. }
            | Self::PointsRemoved { timestamp, .. } => *timestamp,
        }
    }

    /// Case number the event concerns, if any
    pub fn case_number(&self) -> Option<u64> {
        match self {
            Self::ActionCompleted { case_number, .. }
            | Self::ActionFailed { case_number, .. }
            | Self::PersistenceDegraded { case_number, .. }
            | Self::CaseDeleted { case_number, .. } => Some(*case_number),
            Self::AutoBanTriggered {
                ban_case_number, ..
            } => Some(*ban_case_number),
            Self::AutoBanSuppressed {
                warn_case_number, ..
            } => Some(*warn_case_number),
            Self::ActionRejected { .. }
            | Self::RequestMalformed { .. }
            | Self::PointsRemoved { .. } => None,
        }
    }

    /// Generate a unique event ID
    pub fn new_id() -> EventId {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_is_tagged() {
        let event = ModerationEvent::CaseDeleted {
            case_number: 7,
            actor_id: "admin".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "case_deleted");
        assert_eq!(json["case_number"], 7);

        let back: ModerationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), "case_deleted");
    }

    #[test]
    fn test_auto_ban_event_reports_ban_case() {
        let event = ModerationEvent::AutoBanTriggered {
            warn_case_number: 6,
            ban_case_number: 7,
            subject_id: "u".to_string(),
            attributed_to: "mod".to_string(),
            points_total: 12,
            timestamp: Utc::now(),
        };
        assert_eq!(event.case_number(), Some(7));
    }

    #[test]
    fn test_new_id_unique() {
        assert_ne!(ModerationEvent::new_id(), ModerationEvent::new_id());
    }
}
