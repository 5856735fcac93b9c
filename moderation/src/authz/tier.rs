//! Permission tiers and actor identity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ledger::ModAction;

/// Coarse permission class derived from an actor's roles at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionTier {
    /// No moderation capability.
    None,
    /// Warn, kick and purge only; cannot carry out bans.
    Limited,
    /// Every action, including ban, softban and mute.
    Full,
}

impl PermissionTier {
    /// Actions this tier may perform.
    pub fn permitted_actions(self) -> &'static [ModAction] {
        match self {
            Self::None => &[],
            Self::Limited => &[ModAction::Warn, ModAction::Kick, ModAction::Purge],
            Self::Full => ModAction::all(),
        }
    }

    /// Whether this tier may perform `action`.
    pub fn permits(self, action: ModAction) -> bool {
        self.permitted_actions().contains(&action)
    }

    /// Whether this tier can carry out a ban on its own authority.
    pub fn can_ban(self) -> bool {
        self.permits(ModAction::Ban)
    }
}

impl std::fmt::Display for PermissionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Limited => write!(f, "limited"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Who is invoking an action, as seen by the authorization service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub actor_id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Owning principal of the community
    #[serde(default)]
    pub is_owner: bool,
    /// Holds the platform's administrator permission
    #[serde(default)]
    pub is_administrator: bool,
}

impl ActorIdentity {
    /// Identity with no roles or elevated status
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            ..Default::default()
        }
    }

    /// Add a role membership
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Mark as the community owner
    pub fn owner(mut self) -> Self {
        self.is_owner = true;
        self
    }

    /// Mark as holding administrator permission
    pub fn administrator(mut self) -> Self {
        self.is_administrator = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(PermissionTier::None < PermissionTier::Limited);
        assert!(PermissionTier::Limited < PermissionTier::Full);
    }

    #[test]
    fn test_limited_subset() {
        let limited = PermissionTier::Limited;
        assert!(limited.permits(ModAction::Warn));
        assert!(limited.permits(ModAction::Kick));
        assert!(limited.permits(ModAction::Purge));
        for action in [
            ModAction::Ban,
            ModAction::Softban,
            ModAction::Mute,
            ModAction::Lock,
            ModAction::Unlock,
        ] {
            assert!(!limited.permits(action), "limited must not {}", action);
        }
        assert!(!limited.can_ban());
    }

    #[test]
    fn test_full_permits_everything_and_none_nothing() {
        for action in ModAction::all() {
            assert!(PermissionTier::Full.permits(*action));
            assert!(!PermissionTier::None.permits(*action));
        }
    }
}
