//! Administrative commands recognised before a query reaches the QA API.

use aideas_config::{BotConfig, SharedConfig};
use aideas_core::error::Result;
use aideas_core::message::SessionId;
use aideas_core::reply::Reply;
use aideas_core::session::SessionStore;
use std::sync::Arc;
use tracing::info;

/// Clears every session in the store.
pub const CLEAR_ALL_COMMAND: &str = "#清除所有";
/// Reloads the configuration file.
pub const RELOAD_CONFIG_COMMAND: &str = "#更新配置";

pub const MEMORY_CLEARED: &str = "记忆已清除";
pub const ALL_MEMORY_CLEARED: &str = "所有人记忆已清除";
pub const CONFIG_RELOADED: &str = "配置已更新";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Forget the sender's own conversation
    ClearMemory,
    /// Forget every conversation
    ClearAll,
    /// Re-read configuration from disk
    ReloadConfig,
}

impl Command {
    /// Recognise `query` as a command. Matching is exact, with no trimming.
    pub fn parse(query: &str, config: &BotConfig) -> Option<Self> {
        if config.is_clear_memory_command(query) {
            Some(Self::ClearMemory)
        } else if query == CLEAR_ALL_COMMAND {
            Some(Self::ClearAll)
        } else if query == RELOAD_CONFIG_COMMAND {
            Some(Self::ReloadConfig)
        } else {
            None
        }
    }
}

/// Executes commands against the session store and shared config.
pub struct Dispatcher {
    sessions: Arc<dyn SessionStore>,
    config: Arc<SharedConfig>,
}

impl Dispatcher {
    pub fn new(sessions: Arc<dyn SessionStore>, config: Arc<SharedConfig>) -> Self {
        Self { sessions, config }
    }

    /// Run `query` if it is a command. `Ok(None)` means it is an ordinary query.
    pub async fn dispatch(&self, query: &str, session_id: &SessionId) -> Result<Option<Reply>> {
        let config = self.config.snapshot();
        match Command::parse(query, &config) {
            Some(command) => self.execute(command, session_id).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn execute(&self, command: Command, session_id: &SessionId) -> Result<Reply> {
        info!(?command, session_id = %session_id, "Executing command");
        match command {
            Command::ClearMemory => {
                self.sessions.clear_session(session_id).await?;
                Ok(Reply::info(MEMORY_CLEARED))
            }
            Command::ClearAll => {
                self.sessions.clear_all_sessions().await?;
                Ok(Reply::info(ALL_MEMORY_CLEARED))
            }
            Command::ReloadConfig => {
                self.config.reload()?;
                Ok(Reply::info(CONFIG_RELOADED))
            }
        }
    }
}
