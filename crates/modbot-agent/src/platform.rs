//! Stand-in platform collaborators
//!
//! The agent has no chat transport of its own. These implementations log
//! what would be sent to the platform and report success, so the core can be
//! driven from the command line.

use std::sync::Mutex;

use async_trait::async_trait;
use moderation::coordinator::{
    ExecutionError, ExecutionReceipt, ExecutionRequest, NotifyError, PlatformEffect,
    PlatformExecutor, SubjectNotice, SubjectNotifier,
};
use tracing::info;

/// Executor that performs nothing and records every request
#[derive(Default)]
pub struct DryRunExecutor {
    executed: Mutex<Vec<ExecutionRequest>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests seen so far
    pub fn executed(&self) -> Vec<ExecutionRequest> {
        self.executed
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlatformExecutor for DryRunExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, ExecutionError> {
        info!(
            case_number = request.case_number,
            subject = %request.subject_id,
            effect = ?request.effect,
            audit_reason = %request.audit_reason,
            "Dry run: platform effect not applied"
        );
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(request.clone());
        }
        // A purge reports every requested message as deleted
        let affected = match request.effect {
            PlatformEffect::Purge { count } => Some(count),
            _ => None,
        };
        Ok(ExecutionReceipt { affected })
    }
}

/// Notifier that logs the notice instead of sending a direct message
#[derive(Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl SubjectNotifier for LoggingNotifier {
    async fn notify(&self, notice: &SubjectNotice) -> Result<(), NotifyError> {
        info!(
            case_number = notice.case_number,
            action = %notice.action,
            subject = %notice.subject_id,
            reason = %notice.reason,
            duration_minutes = ?notice.duration_minutes,
            "Subject notice"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_reports_purge_count() {
        let executor = DryRunExecutor::new();
        let request = ExecutionRequest::new(3, "chan", "cleanup", PlatformEffect::Purge { count: 40 });
        let receipt = executor.execute(&request).await.unwrap();
        assert_eq!(receipt.affected, Some(40));
        assert_eq!(executor.executed().len(), 1);
    }
}
