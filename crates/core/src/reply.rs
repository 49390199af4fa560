//! Outbound reply produced by the bot.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyType {
    /// An answer from the QA service
    Text,
    /// Acknowledgement of an administrative command
    Info,
    /// The input could not be handled
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub reply_type: ReplyType,
    pub content: String,
}

impl Reply {
    pub fn new(reply_type: ReplyType, content: impl Into<String>) -> Self {
        Self {
            reply_type,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ReplyType::Text, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(ReplyType::Info, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(ReplyType::Error, content)
    }
}
