//! QaClient trait: the abstraction over the remote question-answering API.
//!
//! A client takes a session whose last turn is the pending question and
//! produces the answer content. Unlike most traits in this crate, `answer`
//! is infallible: transport failures are retried and finally replaced by a
//! fallback answer inside the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::session::Session;

/// Token usage recorded when the API does not report one.
pub const DEFAULT_TOKEN_USAGE: u64 = 1;

/// The outcome of asking the remote API about a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text (or the fallback text after exhausted retries)
    pub content: String,

    /// Token usage reported by the API, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    /// How many calls were made to produce this answer
    pub attempts: u32,

    /// Whether `content` is the fallback text
    #[serde(default)]
    pub degraded: bool,
}

impl Answer {
    /// Token usage to record in the session store.
    pub fn token_usage(&self) -> u64 {
        self.total_tokens.unwrap_or(DEFAULT_TOKEN_USAGE)
    }
}

#[async_trait]
pub trait QaClient: Send + Sync {
    /// Client name used in logs (e.g., "aideas").
    fn name(&self) -> &str;

    /// Ask about the last turn of `session`.
    async fn answer(&self, session: &Session) -> Answer;
}
