//! Inbound action requests and outbound outcomes

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::error::{ErrorKind, ModerationError};
use crate::authz::ActorIdentity;
use crate::ledger::ModAction;

/// A moderation action as received from the command layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ModAction,
    /// Member id, or channel id for purge/lock/unlock
    pub subject_id: String,
    pub actor_id: String,
    #[serde(default)]
    pub actor_roles: BTreeSet<String>,
    #[serde(default)]
    pub actor_is_owner: bool,
    #[serde(default)]
    pub actor_is_administrator: bool,
    /// Position of the actor's highest role
    #[serde(default)]
    pub actor_rank: u32,
    /// Position of the subject's highest role; absent when the subject is
    /// not a current member
    #[serde(default)]
    pub subject_rank: Option<u32>,
    #[serde(default)]
    pub subject_is_owner: bool,
    /// Position of the automation agent's own highest role
    #[serde(default)]
    pub agent_rank: Option<u32>,
    #[serde(default)]
    pub reason: String,
    /// Mute duration in minutes
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub delete_days: Option<i64>,
    #[serde(default)]
    pub purge_count: Option<i64>,
}

impl ActionRequest {
    /// Request with no roles, ranks, reason or parameters
    pub fn new(action: ModAction, subject_id: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            action,
            subject_id: subject_id.into(),
            actor_id: actor_id.into(),
            actor_roles: BTreeSet::new(),
            actor_is_owner: false,
            actor_is_administrator: false,
            actor_rank: 0,
            subject_rank: None,
            subject_is_owner: false,
            agent_rank: None,
            reason: String::new(),
            duration: None,
            delete_days: None,
            purge_count: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.actor_roles.insert(role.into());
        self
    }

    pub fn by_owner(mut self) -> Self {
        self.actor_is_owner = true;
        self
    }

    pub fn by_administrator(mut self) -> Self {
        self.actor_is_administrator = true;
        self
    }

    /// Set actor and subject role positions
    pub fn with_ranks(mut self, actor_rank: u32, subject_rank: u32) -> Self {
        self.actor_rank = actor_rank;
        self.subject_rank = Some(subject_rank);
        self
    }

    pub fn with_agent_rank(mut self, agent_rank: u32) -> Self {
        self.agent_rank = Some(agent_rank);
        self
    }

    pub fn against_owner(mut self) -> Self {
        self.subject_is_owner = true;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_delete_days(mut self, days: i64) -> Self {
        self.delete_days = Some(days);
        self
    }

    pub fn with_purge_count(mut self, count: i64) -> Self {
        self.purge_count = Some(count);
        self
    }

    /// Identity of the invoking actor
    pub fn actor(&self) -> ActorIdentity {
        ActorIdentity {
            actor_id: self.actor_id.clone(),
            roles: self.actor_roles.clone(),
            is_owner: self.actor_is_owner,
            is_administrator: self.actor_is_administrator,
        }
    }
}

/// Result of one invocation, for the presentation layer to render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_ban_case_number: Option<u64>,
    /// The automatic ban was recorded but its side effect failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_ban_failed: bool,
    pub notified_subject: bool,
    pub message: String,
}

impl ActionOutcome {
    /// Outcome of a request turned away before allocation
    pub fn rejected(error: &ModerationError) -> Self {
        Self {
            ok: false,
            error_kind: Some(error.kind()),
            case_number: error.case_number(),
            message: error.to_string(),
            ..Default::default()
        }
    }
}
