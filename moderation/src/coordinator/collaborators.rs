//! External collaborators behind the platform seam
//!
//! The coordinator never talks to the chat platform directly. It asks a
//! [`PlatformExecutor`] to carry out side effects and a [`SubjectNotifier`]
//! to tell the subject what is about to happen.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ledger::ModAction;

/// Side effect to perform on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformEffect {
    Kick,
    Ban { delete_days: u8 },
    /// Ban then immediately unban
    Softban { delete_days: u8 },
    Mute { minutes: u32 },
    Purge { count: u32 },
    Lock,
    Unlock,
}

/// One side-effect request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub case_number: u64,
    /// Member or channel id
    pub subject_id: String,
    /// Audit reason shown on the platform, prefixed with the case number
    pub audit_reason: String,
    pub effect: PlatformEffect,
}

impl ExecutionRequest {
    pub fn new(case_number: u64, subject_id: &str, reason: &str, effect: PlatformEffect) -> Self {
        Self {
            case_number,
            subject_id: subject_id.to_string(),
            audit_reason: format!("Case #{}: {}", case_number, reason),
            effect,
        }
    }
}

/// What the platform reported after a side effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Items affected, e.g. messages actually deleted by a purge
    pub affected: Option<u32>,
}

/// Platform refused or failed a side effect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Missing platform permission: {0}")]
    PermissionDenied(String),

    #[error("Subject not found: {0}")]
    SubjectMissing(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

/// Direct message to a subject before an action is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectNotice {
    pub case_number: u64,
    pub action: ModAction,
    pub subject_id: String,
    pub actor_id: String,
    pub reason: String,
    pub duration_minutes: Option<u32>,
}

/// Notification could not be delivered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("Subject does not accept direct messages")]
    Unreachable,

    #[error("Notification failed: {0}")]
    Platform(String),
}

/// Carries out platform side effects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, ExecutionError>;
}

/// Delivers best-effort notices to subjects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectNotifier: Send + Sync {
    async fn notify(&self, notice: &SubjectNotice) -> Result<(), NotifyError>;
}

/// Shared reference to a PlatformExecutor
pub type SharedExecutor = Arc<dyn PlatformExecutor>;

/// Shared reference to a SubjectNotifier
pub type SharedNotifier = Arc<dyn SubjectNotifier>;
