//! Tool configuration.
//!
//! Label keys and logging are environment-driven so the tool matches the
//! reconciler it stands in for.

use anyhow::{Context, Result};
use frontdoor_labels::{LabelKey, LabelKeys};

/// Evaluation configuration (env-driven).
#[derive(Debug, Clone)]
pub struct Config {
    /// Label keys the affinity selectors match on.
    pub label_keys: LabelKeys,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON instead of text.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LabelKeys::default();

        let deployment = lookup("FRONTDOOR_DEPLOYMENT_LABEL")
            .map(|v| LabelKey::parse(&v))
            .transpose()
            .context("FRONTDOOR_DEPLOYMENT_LABEL must be a valid label key.")?
            .unwrap_or(defaults.deployment);

        let generation_hash = lookup("FRONTDOOR_HASH_LABEL")
            .map(|v| LabelKey::parse(&v))
            .transpose()
            .context("FRONTDOOR_HASH_LABEL must be a valid label key.")?
            .unwrap_or(defaults.generation_hash);

        let log_level = lookup("FRONTDOOR_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_json = lookup("FRONTDOOR_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            label_keys: LabelKeys {
                deployment,
                generation_hash,
            },
            log_level,
            log_json,
        })
    }
}
