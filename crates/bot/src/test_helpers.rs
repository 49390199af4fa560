//! Shared test helpers for bot tests.

use aideas_config::SharedConfig;
use aideas_core::error::SessionError;
use aideas_core::message::SessionId;
use aideas_core::qa::{Answer, QaClient};
use aideas_core::session::{Session, SessionStore};
use aideas_memory::InMemorySessionStore;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

/// A mock client that returns scripted answers in order, repeating the
/// last one, and records every session it was asked about.
pub struct ScriptedClient {
    answers: Vec<Answer>,
    seen: Mutex<Vec<Session>>,
}

impl ScriptedClient {
    pub fn new(answers: Vec<Answer>) -> Self {
        assert!(!answers.is_empty(), "ScriptedClient needs at least one answer");
        Self {
            answers,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `text` without reporting token usage.
    pub fn text(text: &str) -> Self {
        Self::new(vec![answer(text, None)])
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_session(&self) -> Option<Session> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl QaClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn answer(&self, session: &Session) -> Answer {
        let mut seen = self.seen.lock().unwrap();
        seen.push(session.clone());
        let idx = (seen.len() - 1).min(self.answers.len() - 1);
        self.answers[idx].clone()
    }
}

pub fn answer(content: &str, total_tokens: Option<u64>) -> Answer {
    Answer {
        content: content.into(),
        total_tokens,
        attempts: 1,
        degraded: false,
    }
}

/// An in-memory store that counts how often it is touched.
pub struct CountingStore {
    inner: InMemorySessionStore,
    calls: Mutex<usize>,
}

impl CountingStore {
    pub fn new(config: Arc<SharedConfig>) -> Self {
        Self {
            inner: InMemorySessionStore::new(config),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn touch(&self) {
        *self.calls.lock().unwrap() += 1;
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn session_query(&self, query: &str, session_id: &SessionId) -> Result<Session, SessionError> {
        self.touch();
        self.inner.session_query(query, session_id).await
    }

    async fn session_reply(
        &self,
        content: &str,
        session_id: &SessionId,
        total_tokens: u64,
    ) -> Result<Session, SessionError> {
        self.touch();
        self.inner.session_reply(content, session_id, total_tokens).await
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.touch();
        self.inner.clear_session(session_id).await
    }

    async fn clear_all_sessions(&self) -> Result<(), SessionError> {
        self.touch();
        self.inner.clear_all_sessions().await
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, SessionError> {
        self.inner.get(session_id).await
    }

    async fn len(&self) -> Result<usize, SessionError> {
        self.inner.len().await
    }
}
