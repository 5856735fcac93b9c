//! Escalation Engine: point accounting and the auto-ban decision
//!
//! The engine never performs a ban itself. It reports an [`EscalationDecision`]
//! and the coordinator turns an [`AutoBan`] into a second case.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::balance::{BalanceBook, PointBalance};
use crate::authz::PermissionTier;
use crate::store::SharedStore;

/// Shared reference to an EscalationEngine
pub type SharedEscalationEngine = Arc<EscalationEngine>;

/// Configuration for the Escalation Engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Balance at or above which a warn triggers an automatic ban
    pub ban_threshold: u32,
    /// Points added by a single warn
    pub warn_points: u32,
    /// When false, a warn by a limited-tier actor never triggers an
    /// automatic ban even if it crosses the threshold.
    pub auto_ban_applies_regardless_of_warning_actor_tier: bool,
    /// Principal the automatic ban is attributed to when the warning actor
    /// cannot ban
    pub system_actor_id: String,
    /// Reason recorded on automatic ban cases
    pub auto_ban_reason: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            ban_threshold: 12,
            warn_points: 2,
            auto_ban_applies_regardless_of_warning_actor_tier: false,
            system_actor_id: "system".to_string(),
            auto_ban_reason: "Automatic ban: infraction point threshold reached".to_string(),
        }
    }
}

/// Instruction to carry out an automatic ban
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoBan {
    /// Actor the ban case is attributed to
    pub attributed_to: String,
    /// Reason for the ban case
    pub reason: String,
}

/// Decision produced after a warn is accounted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub subject_id: String,
    pub points_added: u32,
    /// Balance after the warn
    pub total: u32,
    pub threshold: u32,
    /// Whether `total` is at or above the threshold
    pub threshold_reached: bool,
    /// Present when a ban must follow
    pub auto_ban: Option<AutoBan>,
    /// Threshold reached but the ban was withheld because of the warning
    /// actor's tier
    pub suppressed: bool,
}

/// The Escalation Engine
pub struct EscalationEngine {
    config: EscalationConfig,
    book: BalanceBook,
}

impl EscalationEngine {
    /// Engine with volatile balances
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            book: BalanceBook::volatile(),
        }
    }

    /// Engine whose balances are persisted to `store`
    pub fn with_store(config: EscalationConfig, store: SharedStore<PointBalance>) -> Self {
        Self {
            config,
            book: BalanceBook::persistent(store),
        }
    }

    /// Create a shared reference to this engine
    pub fn shared(self) -> SharedEscalationEngine {
        Arc::new(self)
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    /// Add points to a subject. Returns the new total.
    pub fn add_points(&self, subject_id: &str, points: u32) -> u32 {
        let total = self.book.update(subject_id, |p| p.saturating_add(points));
        debug!(subject = %subject_id, points, total, "Points added");
        total
    }

    /// Remove points from a subject, flooring at zero. Returns the new total.
    pub fn remove_points(&self, subject_id: &str, points: u32) -> u32 {
        let total = self.book.update(subject_id, |p| p.saturating_sub(points));
        debug!(subject = %subject_id, points, total, "Points removed");
        total
    }

    /// Current balance of a subject
    pub fn get_points(&self, subject_id: &str) -> u32 {
        self.book.get(subject_id)
    }

    /// Whether `total` has reached the ban threshold
    pub fn check_threshold(&self, total: u32) -> bool {
        total >= self.config.ban_threshold
    }

    /// All known balances, sorted by subject
    pub fn balances(&self) -> Vec<(String, u32)> {
        self.book.snapshot()
    }

    /// Account a warn against `subject_id` issued by `actor_id` at `tier`
    /// and decide whether an automatic ban follows.
    ///
    /// Every warn whose resulting total is at or above the threshold asks
    /// for a ban, so a subject may carry more than one automatic ban case
    /// (two concurrent warns from 10 points land at 12 and 14, and both
    /// ban). Balances are not reset by a ban.
    pub fn evaluate_warn(
        &self,
        subject_id: &str,
        actor_id: &str,
        tier: PermissionTier,
    ) -> EscalationDecision {
        let points_added = self.config.warn_points;
        let total = self.add_points(subject_id, points_added);
        let threshold_reached = self.check_threshold(total);

        let mut suppressed = false;
        let auto_ban = if !threshold_reached {
            None
        } else if tier.can_ban() {
            Some(self.auto_ban(actor_id.to_string()))
        } else if self.config.auto_ban_applies_regardless_of_warning_actor_tier {
            Some(self.auto_ban(self.config.system_actor_id.clone()))
        } else {
            suppressed = true;
            None
        };

        if let Some(ban) = &auto_ban {
            info!(
                subject = %subject_id,
                total,
                threshold = self.config.ban_threshold,
                attributed_to = %ban.attributed_to,
                "Threshold reached, automatic ban required"
            );
        } else if suppressed {
            info!(
                subject = %subject_id,
                total,
                actor = %actor_id,
                %tier,
                "Threshold reached, automatic ban withheld for warning actor tier"
            );
        }

        EscalationDecision {
            subject_id: subject_id.to_string(),
            points_added,
            total,
            threshold: self.config.ban_threshold,
            threshold_reached,
            auto_ban,
            suppressed,
        }
    }

    fn auto_ban(&self, attributed_to: String) -> AutoBan {
        AutoBan {
            attributed_to,
            reason: self.config.auto_ban_reason.clone(),
        }
    }
}

impl Default for EscalationEngine {
    fn default() -> Self {
        Self::new(EscalationConfig::default())
    }
}
