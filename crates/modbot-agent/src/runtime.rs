//! Wiring of the moderation core from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use moderation::authz::AuthorizationService;
use moderation::coordinator::{
    ActionCoordinator, ActionRequest, SharedActionCoordinator, SharedExecutor, SharedNotifier,
};
use moderation::escalation::{EscalationEngine, PointBalance};
use moderation::events::EventBus;
use moderation::ledger::{CaseLedger, CaseRecord};
use moderation::store::JsonFileStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::config::AgentConfig;
use crate::platform::{DryRunExecutor, LoggingNotifier};

/// A running moderation core plus its audit writer
pub struct Runtime {
    coordinator: SharedActionCoordinator,
    audit_task: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Build with dry-run platform collaborators
    pub fn dry_run(config: &AgentConfig) -> Self {
        Self::build(
            config,
            Arc::new(DryRunExecutor::new()),
            Arc::new(LoggingNotifier),
        )
    }

    /// Build over the given platform collaborators. Must be called inside a
    /// Tokio runtime when an audit log is configured.
    pub fn build(config: &AgentConfig, executor: SharedExecutor, notifier: SharedNotifier) -> Self {
        let ledger = CaseLedger::open(Arc::new(JsonFileStore::<CaseRecord>::open(
            &config.storage.cases_path,
        )))
        .shared();

        let escalation = match config.storage.points_path() {
            Some(path) => EscalationEngine::with_store(
                config.escalation.clone(),
                Arc::new(JsonFileStore::<PointBalance>::open(path)),
            ),
            None => {
                warn!("Point balances are volatile and will reset on restart");
                EscalationEngine::new(config.escalation.clone())
            }
        }
        .shared();

        let events = EventBus::new().shared();
        let audit_task = config
            .audit
            .log_path
            .as_ref()
            .map(|path| AuditLog::new(path).spawn_writer(&events));

        let coordinator = ActionCoordinator::new(
            ledger,
            escalation,
            AuthorizationService::new(config.permissions.clone()),
            executor,
            notifier,
            events,
        )
        .shared();

        Self {
            coordinator,
            audit_task,
        }
    }

    pub fn coordinator(&self) -> &SharedActionCoordinator {
        &self.coordinator
    }

    /// Run every JSON-lines request from `input` and write one outcome line
    /// per request to `output`. Returns the number of requests handled.
    pub async fn apply_lines<R, W>(&self, input: R, mut output: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut handled = 0;
        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            if line.trim().is_empty() {
                continue;
            }
            let outcome = match serde_json::from_str::<ActionRequest>(&line) {
                Ok(request) => self.coordinator.handle(request).await,
                Err(e) => self.coordinator.reject_malformed(e.to_string()),
            };
            let mut encoded = serde_json::to_string(&outcome)?;
            encoded.push('\n');
            output
                .write_all(encoded.as_bytes())
                .await
                .context("Failed to write outcome")?;
            handled += 1;
        }
        output.flush().await?;
        info!(handled, "Requests applied");
        Ok(handled)
    }

    /// Drop the core and wait for the audit writer to drain. Clones of the
    /// coordinator must already be dropped.
    pub async fn shutdown(self) {
        let Self {
            coordinator,
            audit_task,
        } = self;
        drop(coordinator);
        if let Some(task) = audit_task {
            if let Err(e) = task.await {
                warn!(error = %e, "Audit writer ended abnormally");
            }
        }
    }
}
