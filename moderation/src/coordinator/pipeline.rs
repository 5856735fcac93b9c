//! Action Coordinator: the single entry point of the moderation core
//!
//! Each invocation runs to completion or terminal failure. Nothing before
//! allocation touches the ledger, and once a case number is allocated it
//! always ends in a recorded case.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::collaborators::{
    ExecutionRequest, PlatformEffect, SharedExecutor, SharedNotifier, SubjectNotice,
};
use super::error::{ModerationError, ModerationResult};
use super::request::{ActionOutcome, ActionRequest};
use super::validate::{validate, ValidatedAction};
use crate::authz::{ActorIdentity, AuthorizationService, PermissionTier};
use crate::escalation::SharedEscalationEngine;
use crate::events::{ModerationEvent, SharedEventBus};
use crate::ledger::{
    reason_or_default, CaseRecord, CaseStatus, ModAction, NewCase, SharedCaseLedger,
};

/// Shared reference to an ActionCoordinator
pub type SharedActionCoordinator = Arc<ActionCoordinator>;

/// Result of allocating, executing and recording one case
#[derive(Debug)]
struct CaseRun {
    case_number: u64,
    notified: bool,
    /// Execution error text when the side effect failed
    failure: Option<String>,
}

/// Orchestrates authorization, execution, recording and escalation
pub struct ActionCoordinator {
    ledger: SharedCaseLedger,
    escalation: SharedEscalationEngine,
    authz: AuthorizationService,
    executor: SharedExecutor,
    notifier: SharedNotifier,
    events: SharedEventBus,
}

impl ActionCoordinator {
    pub fn new(
        ledger: SharedCaseLedger,
        escalation: SharedEscalationEngine,
        authz: AuthorizationService,
        executor: SharedExecutor,
        notifier: SharedNotifier,
        events: SharedEventBus,
    ) -> Self {
        Self {
            ledger,
            escalation,
            authz,
            executor,
            notifier,
            events,
        }
    }

    /// Create a shared reference to this coordinator
    pub fn shared(self) -> SharedActionCoordinator {
        Arc::new(self)
    }

    pub fn ledger(&self) -> &SharedCaseLedger {
        &self.ledger
    }

    pub fn escalation(&self) -> &SharedEscalationEngine {
        &self.escalation
    }

    pub fn events(&self) -> &SharedEventBus {
        &self.events
    }

    /// Run one moderation action end to end
    pub async fn handle(&self, request: ActionRequest) -> ActionOutcome {
        let (tier, validated) = match self.preflight(&request) {
            Ok(checked) => checked,
            Err(err) => return self.reject(&request, err),
        };

        let reason = reason_or_default(&request.reason);
        let primary = self
            .run_case(
                request.action,
                &request.subject_id,
                &request.actor_id,
                &reason,
                validated,
            )
            .await;

        let mut outcome = ActionOutcome {
            ok: primary.failure.is_none(),
            case_number: Some(primary.case_number),
            notified_subject: primary.notified,
            ..Default::default()
        };

        if let Some(detail) = primary.failure {
            let err = ModerationError::PlatformExecutionFailed {
                case_number: primary.case_number,
                detail,
            };
            outcome.error_kind = Some(err.kind());
            outcome.message = err.to_string();
            return outcome;
        }

        if request.action == ModAction::Warn {
            self.escalate(&request, tier, primary.case_number, &mut outcome)
                .await;
        } else {
            outcome.message = format!(
                "Case #{}: {} applied to {}",
                primary.case_number, request.action, request.subject_id
            );
        }
        outcome
    }

    /// Blacklist, tier, hierarchy and parameter checks. No side effects.
    fn preflight(
        &self,
        request: &ActionRequest,
    ) -> ModerationResult<(PermissionTier, ValidatedAction)> {
        if self.authz.is_blacklisted(&request.actor_id) {
            return Err(ModerationError::Blacklisted {
                actor_id: request.actor_id.clone(),
            });
        }

        let tier = self.authz.classify(&request.actor());
        if !AuthorizationService::authorize(tier, request.action) {
            return Err(ModerationError::Unauthorized {
                actor_id: request.actor_id.clone(),
                tier,
                operation: request.action.to_string(),
            });
        }

        if request.action.targets_member() {
            Self::check_hierarchy(request)?;
        }

        let validated = validate(request)?;
        Ok((tier, validated))
    }

    fn check_hierarchy(request: &ActionRequest) -> ModerationResult<()> {
        if request.subject_is_owner {
            return Err(ModerationError::ProtectedSubject {
                subject_id: request.subject_id.clone(),
            });
        }

        // No rank means the subject is not a current member
        let Some(subject_rank) = request.subject_rank else {
            return Ok(());
        };

        if !AuthorizationService::can_act_on(
            request.actor_rank,
            subject_rank,
            request.actor_is_owner,
        ) {
            return Err(ModerationError::HierarchyViolation {
                subject_id: request.subject_id.clone(),
                detail: "subject's rank is equal to or above the actor's".to_string(),
            });
        }

        if let Some(agent_rank) = request.agent_rank {
            if subject_rank >= agent_rank {
                return Err(ModerationError::HierarchyViolation {
                    subject_id: request.subject_id.clone(),
                    detail: "subject's rank is equal to or above the agent's".to_string(),
                });
            }
        }
        Ok(())
    }

    fn reject(&self, request: &ActionRequest, err: ModerationError) -> ActionOutcome {
        debug!(
            action = %request.action,
            subject = %request.subject_id,
            actor = %request.actor_id,
            kind = %err.kind(),
            "Request rejected: {}",
            err
        );
        self.events.publish(ModerationEvent::ActionRejected {
            action: request.action,
            subject_id: request.subject_id.clone(),
            actor_id: request.actor_id.clone(),
            error_kind: err.kind().to_string(),
            message: err.to_string(),
            timestamp: chrono::Utc::now(),
        });
        ActionOutcome::rejected(&err)
    }

    /// Turn away a request that could not be decoded. Nothing is allocated;
    /// the rejection is still published for the audit trail.
    pub fn reject_malformed(&self, detail: impl Into<String>) -> ActionOutcome {
        let err = ModerationError::InvalidParameter {
            parameter: "request".to_string(),
            detail: detail.into(),
        };
        debug!(kind = %err.kind(), "Malformed request: {}", err);
        self.events.publish(ModerationEvent::RequestMalformed {
            error_kind: err.kind().to_string(),
            message: err.to_string(),
            timestamp: chrono::Utc::now(),
        });
        ActionOutcome::rejected(&err)
    }

    /// Allocate, notify, execute, record
    async fn run_case(
        &self,
        action: ModAction,
        subject_id: &str,
        actor_id: &str,
        reason: &str,
        validated: ValidatedAction,
    ) -> CaseRun {
        let ticket = self.ledger.allocate();
        let case_number = ticket.case_number();

        let notified = if action.targets_member() {
            let duration_minutes = match validated.effect {
                Some(PlatformEffect::Mute { minutes }) => Some(minutes),
                _ => None,
            };
            self.notify_subject(SubjectNotice {
                case_number,
                action,
                subject_id: subject_id.to_string(),
                actor_id: actor_id.to_string(),
                reason: reason.to_string(),
                duration_minutes,
            })
            .await
        } else {
            false
        };

        let mut extra = validated.extra;
        let mut failure = None;
        if let Some(effect) = validated.effect {
            let request = ExecutionRequest::new(case_number, subject_id, reason, effect);
            match self.executor.execute(&request).await {
                Ok(receipt) => {
                    if let (PlatformEffect::Purge { .. }, Some(deleted)) = (effect, receipt.affected)
                    {
                        insert_extra(&mut extra, "deleted", json!(deleted));
                    }
                }
                Err(e) => {
                    warn!(case_number, %action, subject = %subject_id, error = %e, "Platform execution failed");
                    insert_extra(&mut extra, "error", json!(e.to_string()));
                    failure = Some(e.to_string());
                }
            }
        }

        let status = if failure.is_some() {
            CaseStatus::Failed
        } else {
            CaseStatus::Completed
        };
        let recorded = self.ledger.record(
            ticket,
            NewCase::new(action, subject_id, actor_id, reason)
                .with_extra(extra)
                .with_status(status),
        );

        if !recorded.persisted {
            let degraded = ModerationError::PersistenceDegraded { case_number };
            warn!(case_number, "{}", degraded);
            self.events.publish(ModerationEvent::PersistenceDegraded {
                case_number,
                timestamp: chrono::Utc::now(),
            });
        }

        let event = match &failure {
            None => ModerationEvent::ActionCompleted {
                case_number,
                action,
                subject_id: subject_id.to_string(),
                actor_id: actor_id.to_string(),
                reason: recorded.record.reason.clone(),
                notified_subject: notified,
                timestamp: recorded.record.created_at,
            },
            Some(detail) => ModerationEvent::ActionFailed {
                case_number,
                action,
                subject_id: subject_id.to_string(),
                actor_id: actor_id.to_string(),
                error: detail.clone(),
                timestamp: recorded.record.created_at,
            },
        };
        self.events.publish(event);

        CaseRun {
            case_number,
            notified,
            failure,
        }
    }

    async fn notify_subject(&self, notice: SubjectNotice) -> bool {
        match self.notifier.notify(&notice).await {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    case_number = notice.case_number,
                    subject = %notice.subject_id,
                    error = %e,
                    "Subject not notified"
                );
                false
            }
        }
    }

    /// Point accounting after a recorded warn, with an automatic ban case
    /// when the threshold is reached.
    async fn escalate(
        &self,
        request: &ActionRequest,
        tier: PermissionTier,
        warn_case_number: u64,
        outcome: &mut ActionOutcome,
    ) {
        let decision =
            self.escalation
                .evaluate_warn(&request.subject_id, &request.actor_id, tier);
        outcome.points_total = Some(decision.total);
        outcome.message = format!(
            "Case #{}: warned {} ({}/{} points)",
            warn_case_number, request.subject_id, decision.total, decision.threshold
        );

        if let Some(ban) = decision.auto_ban {
            let run = self
                .run_case(
                    ModAction::Ban,
                    &request.subject_id,
                    &ban.attributed_to,
                    &ban.reason,
                    ValidatedAction::auto_ban(),
                )
                .await;

            info!(
                warn_case_number,
                ban_case_number = run.case_number,
                subject = %request.subject_id,
                points_total = decision.total,
                "Automatic ban recorded"
            );
            self.events.publish(ModerationEvent::AutoBanTriggered {
                warn_case_number,
                ban_case_number: run.case_number,
                subject_id: request.subject_id.clone(),
                attributed_to: ban.attributed_to,
                points_total: decision.total,
                timestamp: chrono::Utc::now(),
            });

            outcome.auto_ban_case_number = Some(run.case_number);
            match run.failure {
                None => outcome
                    .message
                    .push_str(&format!("; automatic ban recorded as case #{}", run.case_number)),
                Some(detail) => {
                    outcome.auto_ban_failed = true;
                    outcome.message.push_str(&format!(
                        "; automatic ban case #{} failed: {}",
                        run.case_number, detail
                    ));
                }
            }
        } else if decision.suppressed {
            self.events.publish(ModerationEvent::AutoBanSuppressed {
                warn_case_number,
                subject_id: request.subject_id.clone(),
                actor_id: request.actor_id.clone(),
                points_total: decision.total,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Remove points from a subject's balance. Full tier only.
    pub fn remove_points(
        &self,
        actor: &ActorIdentity,
        subject_id: &str,
        points: u32,
    ) -> ModerationResult<u32> {
        self.require_full(actor, "remove points")?;
        let total = self.escalation.remove_points(subject_id, points);
        info!(subject = %subject_id, actor = %actor.actor_id, points, total, "Points removed");
        self.events.publish(ModerationEvent::PointsRemoved {
            subject_id: subject_id.to_string(),
            actor_id: actor.actor_id.clone(),
            points,
            points_total: total,
            timestamp: chrono::Utc::now(),
        });
        Ok(total)
    }

    /// Current point balance of a subject
    pub fn points(&self, subject_id: &str) -> u32 {
        self.escalation.get_points(subject_id)
    }

    /// Delete a case. Full tier only. Returns false when no such case exists.
    pub fn delete_case(&self, actor: &ActorIdentity, case_number: u64) -> ModerationResult<bool> {
        self.require_full(actor, "delete cases")?;
        let removed = self.ledger.delete(case_number);
        if removed {
            self.events.publish(ModerationEvent::CaseDeleted {
                case_number,
                actor_id: actor.actor_id.clone(),
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(removed)
    }

    fn require_full(&self, actor: &ActorIdentity, operation: &str) -> ModerationResult<()> {
        if self.authz.is_blacklisted(&actor.actor_id) {
            return Err(ModerationError::Blacklisted {
                actor_id: actor.actor_id.clone(),
            });
        }
        let tier = self.authz.classify(actor);
        if tier != PermissionTier::Full {
            return Err(ModerationError::Unauthorized {
                actor_id: actor.actor_id.clone(),
                tier,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Fetch a case by number
    pub fn case(&self, case_number: u64) -> Option<CaseRecord> {
        self.ledger.get(case_number)
    }

    pub fn cases_for_target(&self, subject_id: &str) -> Vec<CaseRecord> {
        self.ledger.find_by_target(subject_id)
    }

    pub fn cases_by_actor(&self, actor_id: &str) -> Vec<CaseRecord> {
        self.ledger.find_by_actor(actor_id)
    }

    pub fn cases_by_action(&self, action: ModAction) -> Vec<CaseRecord> {
        self.ledger.find_by_action(action)
    }

    pub fn total_cases(&self) -> usize {
        self.ledger.total_cases()
    }
}

fn insert_extra(extra: &mut Value, key: &str, value: Value) {
    if !extra.is_object() {
        let mut map = Map::new();
        if !extra.is_null() {
            map.insert("detail".to_string(), extra.take());
        }
        *extra = Value::Object(map);
    }
    if let Value::Object(map) = extra {
        map.insert(key.to_string(), value);
    }
}
