//! Store configuration loaded from TOML.
//!
//! ```toml
//! hide_threshold = 3
//! admin_email = "admin@civictrack.com"
//! allow_self_reports = false
//! enforce_bans = false
//! transition_policy = "free"   # or "forward_only"
//! ```

use crate::moderation::HIDE_THRESHOLD;
use crate::registry::TransitionPolicy;
use crate::seed::ADMIN_EMAIL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Distinct spam reports that auto-hide an issue.
    pub hide_threshold: usize,
    /// Sign-ins with this email resolve to an admin.
    pub admin_email: String,
    /// Whether reporters may flag their own issues.
    pub allow_self_reports: bool,
    /// Whether banned actors are refused when reporting or flagging.
    pub enforce_bans: bool,
    pub transition_policy: TransitionPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hide_threshold: HIDE_THRESHOLD,
            admin_email: ADMIN_EMAIL.to_string(),
            allow_self_reports: false,
            enforce_bans: false,
            transition_policy: TransitionPolicy::Free,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hide_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "hide_threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if crate::identity::username_from_email(&self.admin_email).is_none() {
            return Err(ConfigError::Invalid {
                field: "admin_email",
                reason: format!("not an email address: {:?}", self.admin_email),
            });
        }
        Ok(())
    }
}
