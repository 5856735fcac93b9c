//! Integration tests for the agent runtime
//!
//! Builds the core from configuration on a temp directory and drives it
//! with JSON-lines request streams.

use std::path::Path;

use modbot_agent::audit::AuditLog;
use modbot_agent::{AgentConfig, Runtime};
use moderation::coordinator::{ActionOutcome, ErrorKind};
use moderation::events::ModerationEvent;
use moderation::ledger::ModAction;

fn config_in(dir: &Path) -> AgentConfig {
    let toml = format!(
        r#"
[storage]
cases_path = "{cases}"
points_path = "{points}"

[escalation]
ban_threshold = 6

[permissions]
full_roles = ["moderator"]
limited_roles = ["trial-mod"]
blacklist = ["banned-staff"]

[audit]
log_path = "{audit}"
"#,
        cases = dir.join("cases.json").display(),
        points = dir.join("points.json").display(),
        audit = dir.join("audit.jsonl").display(),
    );
    AgentConfig::from_toml_str(&toml).unwrap()
}

async fn apply(runtime: &Runtime, input: &str) -> Vec<ActionOutcome> {
    let mut output = Vec::new();
    runtime
        .apply_lines(input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ── configuration ────────────────────────────────────────────────────

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = AgentConfig::from_toml_str("[escalation]\nwarn_points = 3\n").unwrap();
    assert_eq!(config.escalation.warn_points, 3);
    assert_eq!(config.escalation.ban_threshold, 12);
    assert!(config.permissions.full_roles.is_empty());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(AgentConfig::from_file(&dir.path().join("absent.toml")).is_err());
}

// ── request streams ──────────────────────────────────────────────────

#[tokio::test]
async fn test_apply_lines_escalates_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let warn = r#"{"action":"warn","subject_id":"u1","actor_id":"m1","actor_roles":["moderator"],"reason":"spam"}"#;
    let input = format!("{warn}\n{warn}\n\n{warn}\n");

    let runtime = Runtime::dry_run(&config);
    let outcomes = apply(&runtime, &input).await;
    runtime.shutdown().await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[2].points_total, Some(6));
    assert_eq!(outcomes[2].auto_ban_case_number, Some(4));

    // Restart: numbering and balances resume
    let runtime = Runtime::dry_run(&config);
    let coordinator = runtime.coordinator();
    assert_eq!(coordinator.total_cases(), 4);
    assert_eq!(coordinator.ledger().peek_next(), 5);
    assert_eq!(coordinator.points("u1"), 6);
    assert_eq!(coordinator.cases_by_action(ModAction::Ban).len(), 1);
}

#[tokio::test]
async fn test_malformed_and_rejected_requests() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::dry_run(&config_in(dir.path()));

    let input = concat!(
        "{\"action\":\"explode\",\"subject_id\":\"u1\",\"actor_id\":\"m1\"}\n",
        "{\"action\":\"kick\",\"subject_id\":\"u1\",\"actor_id\":\"banned-staff\",\"actor_is_owner\":true}\n",
        "{\"action\":\"ban\",\"subject_id\":\"u1\",\"actor_id\":\"t1\",\"actor_roles\":[\"trial-mod\"]}\n",
    );
    let outcomes = apply(&runtime, input).await;

    assert_eq!(outcomes[0].error_kind, Some(ErrorKind::InvalidParameter));
    assert_eq!(outcomes[1].error_kind, Some(ErrorKind::Blacklisted));
    assert_eq!(outcomes[2].error_kind, Some(ErrorKind::Unauthorized));
    assert_eq!(runtime.coordinator().total_cases(), 0);
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_audit_log_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let runtime = Runtime::dry_run(&config);

    let input = concat!(
        "{\"action\":\"purge\",\"subject_id\":\"chan-1\",\"actor_id\":\"t1\",\"actor_roles\":[\"trial-mod\"],\"purge_count\":30}\n",
        "{\"action\":\"mute\",\"subject_id\":\"u2\",\"actor_id\":\"m1\",\"actor_roles\":[\"moderator\"],\"duration\":0}\n",
        "not a request\n",
    );
    apply(&runtime, input).await;
    runtime.shutdown().await;

    let entries = AuditLog::new(dir.path().join("audit.jsonl"))
        .read_all()
        .await
        .unwrap();
    let types: Vec<&str> = entries.iter().map(|e| e.event.event_type()).collect();
    assert_eq!(
        types,
        vec!["action_completed", "action_rejected", "request_malformed"]
    );
    match &entries[2].event {
        ModerationEvent::RequestMalformed { error_kind, .. } => {
            assert_eq!(error_kind, "invalid_parameter")
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_volatile_points_when_path_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.storage.points_path = String::new();
    config.audit.log_path = None;

    let warn = r#"{"action":"warn","subject_id":"u1","actor_id":"m1","actor_roles":["moderator"]}"#;
    let runtime = Runtime::dry_run(&config);
    apply(&runtime, warn).await;
    runtime.shutdown().await;

    let runtime = Runtime::dry_run(&config);
    assert_eq!(runtime.coordinator().points("u1"), 0);
    assert_eq!(runtime.coordinator().total_cases(), 1);
    assert!(!dir.path().join("points.json").exists());
}
