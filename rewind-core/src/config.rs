//! History configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Capacity used when none is given, or when a negative one is given.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Engine settings. Deserialisable so hosts can keep it in their own config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum undo depth. Negative values fall back to [`DEFAULT_MAX_HISTORY`].
    #[serde(default = "default_max_history")]
    pub max_history: i64,
}

fn default_max_history() -> i64 {
    DEFAULT_MAX_HISTORY as i64
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

impl HistoryConfig {
    pub fn new(max_history: i64) -> Self {
        Self { max_history }
    }

    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: HistoryConfig =
            serde_json::from_str(text).context("parse history config json")?;
        Ok(config)
    }

    /// The undo-stack bound this config resolves to.
    pub fn capacity(&self) -> usize {
        if self.max_history < 0 {
            tracing::debug!(
                requested = self.max_history,
                "negative history capacity, using default {}",
                DEFAULT_MAX_HISTORY
            );
            return DEFAULT_MAX_HISTORY;
        }
        usize::try_from(self.max_history).unwrap_or(usize::MAX)
    }
}
