//! Configuration loading, validation, and hot reload for the Aideas bot.
//!
//! Loads configuration from `~/.aideas/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at load time.
//!
//! Running code never holds a `&BotConfig` across a reload: it asks
//! [`SharedConfig::snapshot`] for an `Arc<BotConfig>`, and a reload
//! replaces that `Arc` wholesale.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// The root configuration structure.
///
/// Maps directly to `~/.aideas/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Endpoint the QA requests are POSTed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aideas_api: Option<String>,

    /// Model label attached to sessions (informational only)
    #[serde(default = "default_model")]
    pub aideas_model: String,

    /// Queries that clear the sender's conversation memory
    #[serde(default = "default_clear_memory_commands")]
    pub clear_memory_commands: Vec<String>,

    /// Token quota per session before the oldest turns are evicted
    #[serde(default = "default_conversation_max_tokens")]
    pub conversation_max_tokens: usize,

    /// Idle seconds after which a session starts over (unset = never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_seconds: Option<u64>,

    /// Persona prompt seeded at the head of every new session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_desc: Option<String>,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_clear_memory_commands() -> Vec<String> {
    vec!["#清除记忆".into()]
}
fn default_conversation_max_tokens() -> usize {
    1000
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            aideas_api: None,
            aideas_model: default_model(),
            clear_memory_commands: default_clear_memory_commands(),
            conversation_max_tokens: default_conversation_max_tokens(),
            expires_in_seconds: None,
            character_desc: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BotConfig {
    /// Load configuration from the default path (~/.aideas/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `AIDEAS_API`
    /// - `AIDEAS_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api) = std::env::var("AIDEAS_API") {
            self.aideas_api = Some(api);
        }
        if let Ok(model) = std::env::var("AIDEAS_MODEL") {
            self.aideas_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".aideas")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api) = &self.aideas_api {
            if !(api.starts_with("http://") || api.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "aideas_api must be an http(s) URL, got '{api}'"
                )));
            }
        }

        if self.conversation_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "conversation_max_tokens must be > 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.clear_memory_commands.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "clear_memory_commands must not contain empty strings".into(),
            ));
        }

        Ok(())
    }

    /// Whether `query` is one of the configured clear-memory triggers.
    pub fn is_clear_memory_command(&self, query: &str) -> bool {
        self.clear_memory_commands.iter().any(|c| c == query)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Process-wide configuration that can be reloaded while the bot runs.
pub struct SharedConfig {
    current: RwLock<Arc<BotConfig>>,
    /// File re-read on reload; `None` means the config was built in code
    source: Option<PathBuf>,
}

impl SharedConfig {
    /// Wrap a config built in code. Reloading keeps it unchanged.
    pub fn fixed(config: BotConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            source: None,
        }
    }

    /// Load from `path` (with environment overrides) and remember it for reloads.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = BotConfig::load_with_env(&path)?;
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
            source: Some(path),
        })
    }

    /// Load from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(BotConfig::config_path())
    }

    /// The config file backing this handle, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The current configuration. Later reloads do not affect the returned value.
    pub fn snapshot(&self) -> Arc<BotConfig> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Re-read the backing file and swap it in.
    ///
    /// On error the previous configuration stays in place.
    pub fn reload(&self) -> Result<Arc<BotConfig>, ConfigError> {
        let Some(path) = &self.source else {
            tracing::info!("Configuration has no backing file, reload is a no-op");
            return Ok(self.snapshot());
        };

        let fresh = Arc::new(BotConfig::load_with_env(path)?);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&fresh);
        tracing::info!(path = %path.display(), "Configuration reloaded");
        Ok(fresh)
    }
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedConfig")
            .field("current", &self.snapshot())
            .field("source", &self.source)
            .finish()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for aideas_core::Error {
    fn from(e: ConfigError) -> Self {
        aideas_core::Error::Config {
            message: e.to_string(),
        }
    }
}
