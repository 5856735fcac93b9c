//! Moderation error taxonomy
//!
//! Every error is recoverable at the boundary of a single invocation.

use serde::{Deserialize, Serialize};

use crate::authz::PermissionTier;

/// Error type for coordinator operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModerationError {
    #[error("{actor_id} ({tier}) is not permitted to {operation}")]
    Unauthorized {
        actor_id: String,
        tier: PermissionTier,
        operation: String,
    },

    #[error("Cannot act on {subject_id}: {detail}")]
    HierarchyViolation { subject_id: String, detail: String },

    #[error("Invalid {parameter}: {detail}")]
    InvalidParameter { parameter: String, detail: String },

    #[error("Case #{case_number} recorded as failed: {detail}")]
    PlatformExecutionFailed { case_number: u64, detail: String },

    #[error("Case #{case_number} is held in memory only; durable write failed")]
    PersistenceDegraded { case_number: u64 },

    #[error("{actor_id} is blacklisted from moderation commands")]
    Blacklisted { actor_id: String },

    #[error("{subject_id} owns the community and cannot be moderated")]
    ProtectedSubject { subject_id: String },
}

/// Result type for coordinator operations
pub type ModerationResult<T> = Result<T, ModerationError>;

/// Stable machine code for a [`ModerationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    HierarchyViolation,
    InvalidParameter,
    PlatformExecutionFailed,
    PersistenceDegraded,
    Blacklisted,
    ProtectedSubject,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::HierarchyViolation => "hierarchy_violation",
            Self::InvalidParameter => "invalid_parameter",
            Self::PlatformExecutionFailed => "platform_execution_failed",
            Self::PersistenceDegraded => "persistence_degraded",
            Self::Blacklisted => "blacklisted",
            Self::ProtectedSubject => "protected_subject",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ModerationError {
    /// Machine code of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::HierarchyViolation { .. } => ErrorKind::HierarchyViolation,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::PlatformExecutionFailed { .. } => ErrorKind::PlatformExecutionFailed,
            Self::PersistenceDegraded { .. } => ErrorKind::PersistenceDegraded,
            Self::Blacklisted { .. } => ErrorKind::Blacklisted,
            Self::ProtectedSubject { .. } => ErrorKind::ProtectedSubject,
        }
    }

    /// Whether the invoking staff member should see this error.
    /// Degraded persistence is an operator concern only.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::PersistenceDegraded { .. })
    }

    /// Case number attached to the error, if a case was allocated
    pub fn case_number(&self) -> Option<u64> {
        match self {
            Self::PlatformExecutionFailed { case_number, .. }
            | Self::PersistenceDegraded { case_number } => Some(*case_number),
            _ => None,
        }
    }

    pub(crate) fn invalid(parameter: &str, detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            detail: detail.into(),
        }
    }
}
