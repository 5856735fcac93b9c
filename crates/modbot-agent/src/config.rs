//! Agent configuration
//!
//! Loaded from an optional TOML file, then overridden by `MODBOT_*`
//! environment variables. Every field has a default, so a missing file
//! yields a working configuration.

use std::path::{Path, PathBuf};

use moderation::authz::AuthzPolicy;
use moderation::escalation::EscalationConfig;
use moderation::store::schema::{DEFAULT_CASES_PATH, DEFAULT_POINTS_PATH};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidOverride { var: String, value: String },
}

/// Where moderation state lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub cases_path: PathBuf,
    /// Empty string keeps balances in memory only
    pub points_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cases_path: PathBuf::from(DEFAULT_CASES_PATH),
            points_path: DEFAULT_POINTS_PATH.to_string(),
        }
    }
}

impl StorageConfig {
    /// Point balance file, or `None` for volatile balances
    pub fn points_path(&self) -> Option<PathBuf> {
        let trimmed = self.points_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// Audit trail output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// JSON-lines file receiving every moderation event
    pub log_path: Option<PathBuf>,
}

/// Complete agent configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub storage: StorageConfig,
    pub escalation: EscalationConfig,
    pub permissions: AuthzPolicy,
    pub audit: AuditConfig,
}

impl AgentConfig {
    /// Load from `path` (if given) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        info!(
            cases = %config.storage.cases_path.display(),
            points = %config.storage.points_path,
            ban_threshold = config.escalation.ban_threshold,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `MODBOT_*` overrides looked up through `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("MODBOT_CASES_PATH") {
            self.storage.cases_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("MODBOT_POINTS_PATH") {
            self.storage.points_path = path;
        }
        if let Some(value) = lookup("MODBOT_BAN_THRESHOLD") {
            self.escalation.ban_threshold = parse_number("MODBOT_BAN_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("MODBOT_WARN_POINTS") {
            self.escalation.warn_points = parse_number("MODBOT_WARN_POINTS", &value)?;
        }
        if let Some(value) = lookup("MODBOT_FULL_ROLES") {
            self.permissions.full_roles = split_list(&value);
        }
        if let Some(value) = lookup("MODBOT_LIMITED_ROLES") {
            self.permissions.limited_roles = split_list(&value);
        }
        Ok(())
    }
}

fn parse_number(var: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            var: var.to_string(),
            value: value.to_string(),
        })
}

fn split_list<T: FromIterator<String>>(value: &str) -> T {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
