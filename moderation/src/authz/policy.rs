//! Tier classification and the hierarchy rule
//!
//! Every function here is a pure function of its inputs. The coordinator
//! consults it before any case number is allocated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::tier::{ActorIdentity, PermissionTier};
use crate::ledger::ModAction;

/// Role configuration driving tier classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzPolicy {
    /// Role ids granting the full tier
    pub full_roles: BTreeSet<String>,
    /// Role ids granting the limited tier
    pub limited_roles: BTreeSet<String>,
    /// Actor ids refused regardless of roles
    pub blacklist: BTreeSet<String>,
}

impl AuthzPolicy {
    /// Policy with a single full-tier role and a single limited-tier role
    pub fn with_roles(full_role: impl Into<String>, limited_role: impl Into<String>) -> Self {
        Self {
            full_roles: BTreeSet::from([full_role.into()]),
            limited_roles: BTreeSet::from([limited_role.into()]),
            blacklist: BTreeSet::new(),
        }
    }
}

/// Decides who may do what to whom
#[derive(Debug, Clone, Default)]
pub struct AuthorizationService {
    policy: AuthzPolicy,
}

impl AuthorizationService {
    /// Create a service over `policy`
    pub fn new(policy: AuthzPolicy) -> Self {
        Self { policy }
    }

    /// The active policy
    pub fn policy(&self) -> &AuthzPolicy {
        &self.policy
    }

    /// Classify an actor into a permission tier.
    ///
    /// Owners and administrators are always full tier. Otherwise the highest
    /// tier granted by any held role wins.
    pub fn classify(&self, actor: &ActorIdentity) -> PermissionTier {
        let tier = if actor.is_owner || actor.is_administrator {
            PermissionTier::Full
        } else if actor.roles.iter().any(|r| self.policy.full_roles.contains(r)) {
            PermissionTier::Full
        } else if actor
            .roles
            .iter()
            .any(|r| self.policy.limited_roles.contains(r))
        {
            PermissionTier::Limited
        } else {
            PermissionTier::None
        };
        debug!(actor = %actor.actor_id, %tier, "Actor classified");
        tier
    }

    /// Whether `tier` may perform `action`
    pub fn authorize(tier: PermissionTier, action: ModAction) -> bool {
        tier.permits(action)
    }

    /// Hierarchy rule: an actor may not act on a subject whose rank is
    /// greater than or equal to its own, unless the actor owns the community.
    pub fn can_act_on(actor_rank: u32, subject_rank: u32, is_owner_actor: bool) -> bool {
        is_owner_actor || subject_rank < actor_rank
    }

    /// Whether the actor is refused outright
    pub fn is_blacklisted(&self, actor_id: &str) -> bool {
        self.policy.blacklist.contains(actor_id)
    }
}
