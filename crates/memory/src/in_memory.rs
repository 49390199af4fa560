//! In-memory session store: per-process conversation buffers.

use aideas_config::{BotConfig, SharedConfig};
use aideas_core::error::SessionError;
use aideas_core::message::{Role, SessionId, Turn};
use aideas_core::session::{Session, SessionStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A session store that keeps every session in a HashMap.
///
/// Quota, expiry and persona settings are read from the shared config on
/// every call, so a reload applies to the next query.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    config: Arc<SharedConfig>,
}

impl InMemorySessionStore {
    pub fn new(config: Arc<SharedConfig>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    fn fresh_session(id: &SessionId, config: &BotConfig) -> Session {
        match &config.character_desc {
            Some(prompt) => Session::with_system_prompt(id.clone(), prompt.clone()),
            None => Session::new(id.clone()),
        }
    }

    /// Fetch the session, replacing it when it has been idle past the TTL.
    fn entry<'a>(
        sessions: &'a mut HashMap<SessionId, Session>,
        id: &SessionId,
        config: &BotConfig,
    ) -> &'a mut Session {
        let session = sessions
            .entry(id.clone())
            .or_insert_with(|| Self::fresh_session(id, config));

        if let Some(ttl) = config.expires_in_seconds {
            if session.is_expired(ttl, Utc::now()) {
                debug!(session_id = %id, ttl_secs = ttl, "Session expired, starting over");
                *session = Self::fresh_session(id, config);
            }
        }

        session
    }
}

/// Drop the oldest non-system turns until the estimate fits `max_tokens`.
///
/// The newest conversational turn is always kept. Returns how many turns
/// were dropped.
pub fn discard_exceeding(session: &mut Session, max_tokens: usize) -> usize {
    let mut dropped = 0;
    while session.estimated_tokens() > max_tokens && session.conversation_len() > 1 {
        let Some(pos) = session.turns.iter().position(|t| t.role != Role::System) else {
            break;
        };
        session.turns.remove(pos);
        dropped += 1;
    }
    dropped
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn session_query(&self, query: &str, session_id: &SessionId) -> Result<Session, SessionError> {
        let config = self.config.snapshot();
        let mut sessions = self.sessions.write().await;
        let session = Self::entry(&mut sessions, session_id, &config);

        session.push(Turn::user(query));
        let dropped = discard_exceeding(session, config.conversation_max_tokens);
        if dropped > 0 {
            debug!(session_id = %session_id, dropped, "Evicted turns over token quota");
        }

        Ok(session.clone())
    }

    async fn session_reply(
        &self,
        content: &str,
        session_id: &SessionId,
        total_tokens: u64,
    ) -> Result<Session, SessionError> {
        let config = self.config.snapshot();
        let mut sessions = self.sessions.write().await;
        let session = Self::entry(&mut sessions, session_id, &config);

        session.push(Turn::assistant(content));
        session.total_tokens += total_tokens;
        let dropped = discard_exceeding(session, config.conversation_max_tokens);
        if dropped > 0 {
            debug!(session_id = %session_id, dropped, "Evicted turns over token quota");
        }

        Ok(session.clone())
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn clear_all_sessions(&self) -> Result<(), SessionError> {
        self.sessions.write().await.clear();
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn len(&self) -> Result<usize, SessionError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with(config: BotConfig) -> InMemorySessionStore {
        InMemorySessionStore::new(Arc::new(SharedConfig::fixed(config)))
    }

    fn store() -> InMemorySessionStore {
        store_with(BotConfig::default())
    }

    #[tokio::test]
    async fn query_creates_session_if_absent() {
        let store = store();
        let id = SessionId::from("alice");
        assert!(store.get(&id).await.unwrap().is_none());

        let session = store.session_query("hello", &id).await.unwrap();
        assert_eq!(session.turns, vec![Turn::user("hello")]);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn query_then_reply_adds_two_turns_and_usage() {
        let store = store();
        let id = SessionId::from("alice");
        store.session_query("first", &id).await.unwrap();
        store.session_reply("answer", &id, 1).await.unwrap();
        let before = store.get(&id).await.unwrap().unwrap();

        store.session_query("second", &id).await.unwrap();
        let after = store.session_reply("another", &id, 17).await.unwrap();

        assert_eq!(after.turns.len(), before.turns.len() + 2);
        assert_eq!(after.total_tokens, before.total_tokens + 17);
        assert_eq!(after.last_turn().unwrap(), &Turn::assistant("another"));
    }

    #[tokio::test]
    async fn clear_session_only_touches_one() {
        let store = store();
        let alice = SessionId::from("alice");
        let bob = SessionId::from("bob");
        store.session_query("hi", &alice).await.unwrap();
        store.session_query("hi", &bob).await.unwrap();

        store.clear_session(&alice).await.unwrap();

        assert!(store.get(&alice).await.unwrap().is_none());
        assert!(store.get(&bob).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_all_sessions_empties_store() {
        let store = store();
        store.session_query("hi", &SessionId::from("a")).await.unwrap();
        store.session_query("hi", &SessionId::from("b")).await.unwrap();

        store.clear_all_sessions().await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn quota_evicts_oldest_turns_first() {
        // Each 8-char turn estimates to 2 tokens
        let store = store_with(BotConfig {
            conversation_max_tokens: 4,
            ..BotConfig::default()
        });
        let id = SessionId::from("alice");
        store.session_query("aaaaaaaa", &id).await.unwrap();
        store.session_reply("bbbbbbbb", &id, 1).await.unwrap();
        let session = store.session_query("cccccccc", &id).await.unwrap();

        let contents: Vec<&str> = session.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["bbbbbbbb", "cccccccc"]);
    }

    #[test]
    fn oversized_single_turn_is_kept() {
        let mut session = Session::new(SessionId::from("s"));
        session.push(Turn::user("x".repeat(400)));
        assert_eq!(discard_exceeding(&mut session, 10), 0);
        assert_eq!(session.turns.len(), 1);
    }

    #[tokio::test]
    async fn persona_survives_eviction() {
        let store = store_with(BotConfig {
            conversation_max_tokens: 4,
            character_desc: Some("be brief".into()),
            ..BotConfig::default()
        });
        let id = SessionId::from("alice");
        store.session_query("aaaaaaaa", &id).await.unwrap();
        store.session_reply("bbbbbbbb", &id, 1).await.unwrap();
        let session = store.session_query("cccccccc", &id).await.unwrap();

        assert_eq!(session.turns[0], Turn::system("be brief"));
        assert_eq!(session.last_turn().unwrap(), &Turn::user("cccccccc"));
    }

    #[tokio::test]
    async fn expired_session_starts_over() {
        let store = store_with(BotConfig {
            expires_in_seconds: Some(60),
            ..BotConfig::default()
        });
        let id = SessionId::from("alice");
        store.session_query("old question", &id).await.unwrap();
        store.session_reply("old answer", &id, 5).await.unwrap();

        // Backdate the session past its TTL
        {
            let mut sessions = store.sessions.write().await;
            let session = sessions.get_mut(&id).unwrap();
            session.updated_at = Utc::now() - Duration::seconds(120);
        }

        let session = store.session_query("new question", &id).await.unwrap();
        assert_eq!(session.turns, vec![Turn::user("new question")]);
        assert_eq!(session.total_tokens, 0);
    }
}
