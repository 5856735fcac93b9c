//! Case record types
//!
//! These types are persisted by the case store and form the audit history
//! of every disciplinary action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason recorded when the actor gave none
pub const DEFAULT_REASON: &str = "No reason provided";

/// The given reason, or [`DEFAULT_REASON`] when it is blank
pub fn reason_or_default(reason: &str) -> String {
    if reason.trim().is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        reason.to_string()
    }
}

/// Disciplinary action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModAction {
    /// Formal warning; accrues infraction points
    Warn,
    /// Remove the subject from the community
    Kick,
    /// Permanently ban the subject
    Ban,
    /// Ban then immediately unban to clear recent messages
    Softban,
    /// Time out the subject
    Mute,
    /// Bulk-delete recent channel messages
    Purge,
    /// Lock a channel
    Lock,
    /// Unlock a channel
    Unlock,
}

impl ModAction {
    /// All action kinds
    pub fn all() -> &'static [ModAction] {
        &[
            Self::Warn,
            Self::Kick,
            Self::Ban,
            Self::Softban,
            Self::Mute,
            Self::Purge,
            Self::Lock,
            Self::Unlock,
        ]
    }

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Softban => "softban",
            Self::Mute => "mute",
            Self::Purge => "purge",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }

    /// Whether the subject of this action is a community member (as opposed
    /// to a channel).
    pub fn targets_member(&self) -> bool {
        !matches!(self, Self::Purge | Self::Lock | Self::Unlock)
    }
}

impl std::fmt::Display for ModAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}

/// Whether the platform side effect of a case actually happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Completed,
    /// Recorded for audit; the side effect could not be performed
    Failed,
}

/// One immutable record of a disciplinary action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Unique, strictly increasing case number
    pub case_number: u64,
    /// Action kind
    pub action: ModAction,
    /// Member or channel the action targeted
    pub subject_id: String,
    /// Staff member (or system principal) that issued the action
    pub actor_id: String,
    /// Free-text reason
    pub reason: String,
    /// When the case was recorded
    pub created_at: DateTime<Utc>,
    /// Outcome of the platform side effect
    #[serde(default)]
    pub status: CaseStatus,
    /// Action-specific detail (mute duration, purge count, failure text)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

/// Everything needed to record a case except its number
#[derive(Debug, Clone)]
pub struct NewCase {
    pub action: ModAction,
    pub subject_id: String,
    pub actor_id: String,
    pub reason: String,
    pub status: CaseStatus,
    pub extra: Value,
}

impl NewCase {
    /// Create a completed case with no extra detail. An empty reason is
    /// replaced by [`DEFAULT_REASON`].
    pub fn new(
        action: ModAction,
        subject_id: impl Into<String>,
        actor_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            action,
            subject_id: subject_id.into(),
            actor_id: actor_id.into(),
            reason: reason_or_default(&reason.into()),
            status: CaseStatus::Completed,
            extra: Value::Null,
        }
    }

    /// Attach action-specific detail
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    /// Set the side-effect status
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Materialize into a record with the given number
    pub(crate) fn into_record(self, case_number: u64) -> CaseRecord {
        CaseRecord {
            case_number,
            action: self.action,
            subject_id: self.subject_id,
            actor_id: self.actor_id,
            reason: self.reason,
            created_at: Utc::now(),
            status: self.status,
            extra: self.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!("Softban".parse::<ModAction>().unwrap(), ModAction::Softban);
        assert_eq!(" warn ".parse::<ModAction>().unwrap(), ModAction::Warn);
        assert!("infract".parse::<ModAction>().is_err());
    }

    #[test]
    fn test_channel_actions_do_not_target_members() {
        assert!(!ModAction::Purge.targets_member());
        assert!(!ModAction::Lock.targets_member());
        assert!(!ModAction::Unlock.targets_member());
        assert!(ModAction::Mute.targets_member());
    }

    #[test]
    fn test_empty_reason_gets_default() {
        let case = NewCase::new(ModAction::Kick, "s", "a", "   ");
        assert_eq!(case.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_record_without_status_deserializes_as_completed() {
        let raw = json!({
            "case_number": 3,
            "action": "kick",
            "subject_id": "100",
            "actor_id": "200",
            "reason": "spam",
            "created_at": "2025-07-11T10:35:46Z"
        });
        let record: CaseRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.status, CaseStatus::Completed);
        assert!(record.extra.is_null());
    }
}
