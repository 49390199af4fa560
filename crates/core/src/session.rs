//! Session model and the SessionStore trait.
//!
//! A session is the ordered turn history plus cumulative token usage of one
//! conversation. The bot only appends to sessions and reads them; eviction
//! and expiry are the store's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::SessionError;
use crate::message::{Role, SessionId, Turn};

/// The turn history of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// Ordered turns, oldest first
    pub turns: Vec<Turn>,

    /// Token usage reported for this session so far
    pub total_tokens: u64,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            turns: Vec::new(),
            total_tokens: 0,
            updated_at: Utc::now(),
        }
    }

    /// Create a session seeded with a system persona turn.
    pub fn with_system_prompt(id: SessionId, prompt: impl Into<String>) -> Self {
        let mut session = Self::new(id);
        session.turns.push(Turn::system(prompt));
        session
    }

    /// Append a turn and bump `updated_at`.
    pub fn push(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// The most recently appended turn.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Rough token estimate of the turns currently held.
    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(|t| estimate_tokens(&t.content)).sum()
    }

    /// Number of turns that are not system turns.
    pub fn conversation_len(&self) -> usize {
        self.turns.iter().filter(|t| t.role != Role::System).count()
    }

    /// Whether the session has been idle for longer than `ttl_secs`.
    pub fn is_expired(&self, ttl_secs: u64, now: DateTime<Utc>) -> bool {
        let idle = now.signed_duration_since(self.updated_at).num_seconds();
        idle > 0 && idle as u64 > ttl_secs
    }
}

/// Estimate token count from text (approximate: chars / 4, rounded up).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Keyed store of sessions.
///
/// Implementations serialize access per session id; callers do no locking
/// of their own. Every method returns a snapshot, never a live reference.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Fetch or create the session and append `query` as a user turn.
    async fn session_query(
        &self,
        query: &str,
        session_id: &SessionId,
    ) -> std::result::Result<Session, SessionError>;

    /// Append `content` as an assistant turn and add `total_tokens` to the
    /// session's running count.
    async fn session_reply(
        &self,
        content: &str,
        session_id: &SessionId,
        total_tokens: u64,
    ) -> std::result::Result<Session, SessionError>;

    /// Drop one session's history.
    async fn clear_session(&self, session_id: &SessionId) -> std::result::Result<(), SessionError>;

    /// Drop every session.
    async fn clear_all_sessions(&self) -> std::result::Result<(), SessionError>;

    /// Get a snapshot of a session, if it exists.
    async fn get(&self, session_id: &SessionId) -> std::result::Result<Option<Session>, SessionError>;

    /// Number of live sessions.
    async fn len(&self) -> std::result::Result<usize, SessionError>;
}
