use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{LiveMixError, LiveMixResult};

/// What `plug` does when the destination input already has a source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewirePolicy {
    /// Drop the old source and connect the new one.
    #[default]
    Rewire,
    /// Fail with [`LiveMixError::Rewire`].
    Reject,
}

/// Runtime settings, loadable from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Animation tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Behaviour of a plug into an input that is already connected.
    pub rewire: RewirePolicy,
    /// Make `mp3input`, `mp4input`, `aoutput` and `xoutput` available to scripts.
    pub load_prelude: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            rewire: RewirePolicy::default(),
            load_prelude: true,
        }
    }
}

impl RuntimeConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> LiveMixResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> LiveMixResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| LiveMixError::config(format!("parse runtime config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the runtime cannot run with.
    pub fn validate(&self) -> LiveMixResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(LiveMixError::config("tick_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Animation tick period as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
