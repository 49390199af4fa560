//! Inbound message context handed to the bot by a channel.

use serde::{Deserialize, Serialize};
use crate::message::SessionId;

/// Classified type of an inbound message.
///
/// Only [`ContextType::Text`] is answered; everything else gets an error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Text,
    Voice,
    Image,
    ImageCreate,
    File,
    Sharing,
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "TEXT",
            Self::Voice => "VOICE",
            Self::Image => "IMAGE",
            Self::ImageCreate => "IMAGE_CREATE",
            Self::File => "FILE",
            Self::Sharing => "SHARING",
        };
        f.write_str(name)
    }
}

/// One inbound message: its classified type, raw content, and session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub context_type: ContextType,

    /// Raw text for text messages; a path or URL for media
    pub content: String,

    pub session_id: SessionId,
}

impl Context {
    pub fn new(context_type: ContextType, content: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            context_type,
            content: content.into(),
            session_id,
        }
    }

    /// Create a plain text context.
    pub fn text(content: impl Into<String>, session_id: SessionId) -> Self {
        Self::new(ContextType::Text, content, session_id)
    }

    pub fn is_text(&self) -> bool {
        self.context_type == ContextType::Text
    }
}
