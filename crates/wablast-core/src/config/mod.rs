mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::BlastError;
use crate::identity::{CallerIdentity, CallerRole};
use defaults::*;

/// Top-level wablast configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub console: ConsoleConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub caller: CallerConfig,
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub blast: BlastConfig,
}

/// General console settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Where the blast-service backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identity the console acts as on every backend call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub role: CallerRole,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            role: CallerRole::default(),
        }
    }
}

impl CallerConfig {
    pub fn identity(&self) -> CallerIdentity {
        CallerIdentity::new(self.user_id.clone(), self.role)
    }
}

/// Connection-flow timings and progress shape.
///
/// Defaults mirror the production service: a status poll every 5 seconds,
/// a 40-poll ceiling, and a progress bar that moves between 50 and 95
/// until the backend confirms the link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Poll attempts before the session is declared expired.
    #[serde(default = "default_poll_ceiling")]
    pub poll_ceiling: u32,
    #[serde(default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,
    /// Pause between the connected announcement and the directory refresh.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,
    /// Progress shown the moment a QR payload arrives.
    #[serde(default = "default_progress_baseline")]
    pub progress_baseline: u8,
    /// Progress never exceeds this until the link is confirmed.
    #[serde(default = "default_progress_cap")]
    pub progress_cap: u8,
}

impl ConnectConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_ceiling: default_poll_ceiling(),
            progress_tick_ms: default_progress_tick_ms(),
            grace_delay_ms: default_grace_delay_ms(),
            progress_baseline: default_progress_baseline(),
            progress_cap: default_progress_cap(),
        }
    }
}

/// Blast run settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlastConfig {
    /// Message used when the blast command is given none. Empty = fall
    /// back to the default stored in the backend's app settings.
    #[serde(default)]
    pub default_message: String,
}

/// Load configuration from a TOML file.
///
/// A missing file yields defaults. The flag says whether the file was
/// actually read, so the caller can report the fallback once its
/// logging is up.
pub fn load(path: &str) -> Result<(Config, bool), BlastError> {
    let path = Path::new(path);
    if !path.exists() {
        let config = Config {
            console: ConsoleConfig::default(),
            backend: BackendConfig::default(),
            caller: CallerConfig::default(),
            connect: ConnectConfig::default(),
            blast: BlastConfig::default(),
        };
        return Ok((config, false));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| BlastError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| BlastError::Config(format!("failed to parse config: {}", e)))?;

    Ok((config, true))
}
