//! TOML-based application configuration.
//!
//! Holds:
//! - Feed endpoint and refresh cadence
//! - Evaluation cadence and heads-up lead time
//! - Discord webhook credentials
//! - Query command prefix
//!
//! Configuration is stored at `~/.config/alertwatch/config.toml` and is read
//! once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_FEED_URL: &str = "http://content.warframe.com/dynamic/rss.php";
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/webhooks";
/// Upper bound for `evaluation.heads_up_minutes` (one day).
pub const MAX_HEADS_UP_MINUTES: u64 = 24 * 60;

/// Upstream feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Upper bound for a single fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Evaluation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Lead time of the "starting soon" announcement.
    #[serde(default = "default_heads_up_minutes")]
    pub heads_up_minutes: u64,
}

/// Discord webhook credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub webhook_id: String,
    #[serde(default)]
    pub webhook_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Query surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

// Default functions
fn default_feed_url() -> String {
    DEFAULT_FEED_URL.into()
}
fn default_refresh_secs() -> u64 {
    60
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_interval_ms() -> u64 {
    200
}
fn default_heads_up_minutes() -> u64 {
    10
}
fn default_api_base() -> String {
    DEFAULT_DISCORD_API_BASE.into()
}
fn default_prefix() -> String {
    "wf!".into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            refresh_secs: default_refresh_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            heads_up_minutes: default_heads_up_minutes(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_id: String::new(),
            webhook_token: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl DiscordConfig {
    pub fn is_configured(&self) -> bool {
        !self.webhook_id.is_empty() && !self.webhook_token.is_empty()
    }

    pub fn webhook_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.webhook_id,
            self.webhook_token
        )
    }
}

impl EvaluationConfig {
    /// Lead time of the starting-soon alert, capped at
    /// [`MAX_HEADS_UP_MINUTES`].
    pub fn heads_up(&self) -> chrono::Duration {
        i64::try_from(self.heads_up_minutes.min(MAX_HEADS_UP_MINUTES))
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(MAX_HEADS_UP_MINUTES as i64))
    }
}

/// Returns `~/.config/alertwatch[-dev]/` based on ALERTWATCH_ENV.
///
/// Set ALERTWATCH_ENV=dev to use a development config directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ALERTWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("alertwatch-dev")
    } else {
        base_dir.join("alertwatch")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?,
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                    _ => return Err(unknown()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing and returning defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key (in memory only).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the daemon cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        url::Url::parse(&self.feed.url).map_err(|e| invalid("feed.url", &e.to_string()))?;
        if self.feed.refresh_secs == 0 {
            return Err(invalid("feed.refresh_secs", "must be greater than zero"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(invalid("feed.timeout_secs", "must be greater than zero"));
        }
        if self.evaluation.interval_ms == 0 {
            return Err(invalid("evaluation.interval_ms", "must be greater than zero"));
        }
        if self.evaluation.heads_up_minutes > MAX_HEADS_UP_MINUTES {
            return Err(invalid(
                "evaluation.heads_up_minutes",
                &format!("must be at most {MAX_HEADS_UP_MINUTES}"),
            ));
        }
        if self.query.prefix.is_empty() {
            return Err(invalid("query.prefix", "must not be empty"));
        }
        if self.discord.is_configured() {
            url::Url::parse(&self.discord.webhook_url())
                .map_err(|e| invalid("discord.api_base", &e.to_string()))?;
        }
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.feed.refresh_secs)
    }

    pub fn evaluation_period(&self) -> Duration {
        Duration::from_millis(self.evaluation.interval_ms)
    }
}
