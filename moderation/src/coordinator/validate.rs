//! Action-specific parameter bounds

use serde_json::{json, Value};
use std::ops::RangeInclusive;

use super::collaborators::PlatformEffect;
use super::error::{ModerationError, ModerationResult};
use super::request::ActionRequest;
use crate::ledger::ModAction;

/// Mute duration bounds in minutes (28 days)
pub const MUTE_MINUTES: RangeInclusive<i64> = 1..=40320;

/// Days of message history removed by a ban or softban
pub const DELETE_DAYS: RangeInclusive<i64> = 0..=7;

/// Messages removed by one purge
pub const PURGE_COUNT: RangeInclusive<i64> = 1..=100;

/// Default delete-days for a ban
pub const BAN_DEFAULT_DELETE_DAYS: u8 = 0;

/// Default delete-days for a softban
pub const SOFTBAN_DEFAULT_DELETE_DAYS: u8 = 1;

/// A request whose parameters passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAction {
    /// Platform side effect to request; `None` for warn
    pub effect: Option<PlatformEffect>,
    /// Detail stored on the case record
    pub extra: Value,
}

impl ValidatedAction {
    /// Validated automatic ban
    pub fn auto_ban() -> Self {
        Self::ban(BAN_DEFAULT_DELETE_DAYS)
    }

    fn ban(delete_days: u8) -> Self {
        Self {
            effect: Some(PlatformEffect::Ban { delete_days }),
            extra: json!({ "delete_days": delete_days }),
        }
    }
}

/// Check the request's parameters against the bounds for its action
pub fn validate(request: &ActionRequest) -> ModerationResult<ValidatedAction> {
    let validated = match request.action {
        ModAction::Warn => ValidatedAction {
            effect: None,
            extra: Value::Null,
        },
        ModAction::Kick => ValidatedAction {
            effect: Some(PlatformEffect::Kick),
            extra: Value::Null,
        },
        ModAction::Ban => {
            let days = delete_days(request.delete_days, BAN_DEFAULT_DELETE_DAYS)?;
            ValidatedAction::ban(days)
        }
        ModAction::Softban => {
            let delete_days = delete_days(request.delete_days, SOFTBAN_DEFAULT_DELETE_DAYS)?;
            ValidatedAction {
                effect: Some(PlatformEffect::Softban { delete_days }),
                extra: json!({ "delete_days": delete_days }),
            }
        }
        ModAction::Mute => {
            let minutes = required("duration", request.duration, &MUTE_MINUTES)?;
            ValidatedAction {
                effect: Some(PlatformEffect::Mute { minutes }),
                extra: json!({ "duration_minutes": minutes }),
            }
        }
        ModAction::Purge => {
            let count = required("purge_count", request.purge_count, &PURGE_COUNT)?;
            ValidatedAction {
                effect: Some(PlatformEffect::Purge { count }),
                extra: json!({ "requested": count }),
            }
        }
        ModAction::Lock => ValidatedAction {
            effect: Some(PlatformEffect::Lock),
            extra: Value::Null,
        },
        ModAction::Unlock => ValidatedAction {
            effect: Some(PlatformEffect::Unlock),
            extra: Value::Null,
        },
    };
    Ok(validated)
}

fn delete_days(value: Option<i64>, default: u8) -> ModerationResult<u8> {
    match value {
        None => Ok(default),
        Some(days) => {
            check_bounds("delete_days", days, &DELETE_DAYS)?;
            // Bounds checked above; 0..=7 always fits
            Ok(days as u8)
        }
    }
}

fn required(name: &str, value: Option<i64>, bounds: &RangeInclusive<i64>) -> ModerationResult<u32> {
    let value = value.ok_or_else(|| {
        ModerationError::invalid(
            name,
            format!("required, between {} and {}", bounds.start(), bounds.end()),
        )
    })?;
    check_bounds(name, value, bounds)?;
    Ok(value as u32)
}

fn check_bounds(name: &str, value: i64, bounds: &RangeInclusive<i64>) -> ModerationResult<()> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(ModerationError::invalid(
            name,
            format!(
                "{} is outside {}..={}",
                value,
                bounds.start(),
                bounds.end()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::error::ErrorKind;

    fn mute(minutes: i64) -> ActionRequest {
        ActionRequest::new(ModAction::Mute, "s", "a").with_duration(minutes)
    }

    #[test]
    fn test_mute_bounds() {
        for bad in [0, 40321, -5] {
            let err = validate(&mute(bad)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
        for good in [1, 40320] {
            let v = validate(&mute(good)).unwrap();
            assert_eq!(v.effect, Some(PlatformEffect::Mute { minutes: good as u32 }));
            assert_eq!(v.extra["duration_minutes"], good);
        }
    }

    #[test]
    fn test_mute_requires_duration() {
        let request = ActionRequest::new(ModAction::Mute, "s", "a");
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_delete_days_defaults() {
        let ban = validate(&ActionRequest::new(ModAction::Ban, "s", "a")).unwrap();
        assert_eq!(ban.effect, Some(PlatformEffect::Ban { delete_days: 0 }));

        let softban = validate(&ActionRequest::new(ModAction::Softban, "s", "a")).unwrap();
        assert_eq!(softban.effect, Some(PlatformEffect::Softban { delete_days: 1 }));
    }

    #[test]
    fn test_delete_days_bounds() {
        let request = ActionRequest::new(ModAction::Ban, "s", "a").with_delete_days(8);
        assert!(validate(&request).is_err());
        let request = ActionRequest::new(ModAction::Softban, "s", "a").with_delete_days(7);
        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_purge_bounds() {
        let purge = |n| ActionRequest::new(ModAction::Purge, "chan", "a").with_purge_count(n);
        assert!(validate(&purge(0)).is_err());
        assert!(validate(&purge(101)).is_err());
        let ok = validate(&purge(100)).unwrap();
        assert_eq!(ok.extra["requested"], 100);
    }

    #[test]
    fn test_warn_has_no_side_effect() {
        let v = validate(&ActionRequest::new(ModAction::Warn, "s", "a")).unwrap();
        assert!(v.effect.is_none());
    }
}
