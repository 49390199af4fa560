//! Reply orchestration: one inbound context in, one reply out.

use crate::command::Dispatcher;
use aideas_config::SharedConfig;
use aideas_core::context::{Context, ContextType};
use aideas_core::error::Result;
use aideas_core::qa::QaClient;
use aideas_core::reply::Reply;
use aideas_core::session::SessionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Error text for inputs other than plain text.
pub fn unsupported_type_message(context_type: ContextType) -> String {
    format!("Bot不支持处理{context_type}类型的消息")
}

/// The Aideas bot.
///
/// Text queries are checked for commands first; anything else is appended
/// to the sender's session, sent to the QA client, and the answer is
/// appended back before being returned.
pub struct AideasBot {
    config: Arc<SharedConfig>,
    sessions: Arc<dyn SessionStore>,
    client: Arc<dyn QaClient>,
    dispatcher: Dispatcher,
}

impl AideasBot {
    pub fn new(
        config: Arc<SharedConfig>,
        sessions: Arc<dyn SessionStore>,
        client: Arc<dyn QaClient>,
    ) -> Self {
        let dispatcher = Dispatcher::new(sessions.clone(), config.clone());
        Self {
            config,
            sessions,
            client,
            dispatcher,
        }
    }

    /// Reply to one inbound message.
    ///
    /// Only command failures (session store or config reload) return `Err`;
    /// remote API failures have already degraded to a fallback answer.
    pub async fn reply(&self, context: &Context) -> Result<Reply> {
        if !context.is_text() {
            warn!(context_type = %context.context_type, "Unsupported context type");
            return Ok(Reply::error(unsupported_type_message(context.context_type)));
        }

        let query = context.content.as_str();
        let session_id = &context.session_id;
        info!(session_id = %session_id, query, "Received query");

        if let Some(reply) = self.dispatcher.dispatch(query, session_id).await? {
            return Ok(reply);
        }

        let session = self.sessions.session_query(query, session_id).await?;
        debug!(
            session_id = %session_id,
            model = %self.config.snapshot().aideas_model,
            turns = ?session.turns,
            "Session query"
        );

        let answer = self.client.answer(&session).await;
        debug!(
            session_id = %session_id,
            client = self.client.name(),
            attempts = answer.attempts,
            degraded = answer.degraded,
            content = %answer.content,
            "Answer received"
        );

        self.sessions
            .session_reply(&answer.content, session_id, answer.token_usage())
            .await?;

        Ok(Reply::text(answer.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ALL_MEMORY_CLEARED, CONFIG_RELOADED, MEMORY_CLEARED};
    use crate::test_helpers::{CountingStore, ScriptedClient, answer};
    use aideas_config::BotConfig;
    use aideas_core::message::{SessionId, Turn};
    use aideas_core::reply::ReplyType;

    struct Harness {
        bot: AideasBot,
        store: Arc<CountingStore>,
        client: Arc<ScriptedClient>,
    }

    fn harness_with(config: Arc<SharedConfig>, client: ScriptedClient) -> Harness {
        let store = Arc::new(CountingStore::new(config.clone()));
        let client = Arc::new(client);
        let bot = AideasBot::new(config, store.clone(), client.clone());
        Harness { bot, store, client }
    }

    fn harness(client: ScriptedClient) -> Harness {
        harness_with(Arc::new(SharedConfig::fixed(BotConfig::default())), client)
    }

    fn text(query: &str, session: &str) -> Context {
        Context::text(query, SessionId::from(session))
    }

    #[tokio::test]
    async fn non_text_input_is_rejected_without_store_access() {
        let h = harness(ScriptedClient::text("unused"));
        for kind in [ContextType::Image, ContextType::Voice, ContextType::File] {
            let ctx = Context::new(kind, "/tmp/blob", SessionId::from("alice"));
            let reply = h.bot.reply(&ctx).await.unwrap();
            assert_eq!(reply.reply_type, ReplyType::Error);
            assert_eq!(reply.content, unsupported_type_message(kind));
        }
        assert_eq!(h.store.calls(), 0);
        assert_eq!(h.client.calls(), 0);
    }

    #[test]
    fn unsupported_message_names_the_type() {
        assert_eq!(
            unsupported_type_message(ContextType::Image),
            "Bot不支持处理IMAGE类型的消息"
        );
    }

    #[tokio::test]
    async fn text_query_round_trip() {
        let h = harness(ScriptedClient::text("Rust is a systems language"));
        let reply = h.bot.reply(&text("what is rust", "alice")).await.unwrap();

        assert_eq!(reply, Reply::text("Rust is a systems language"));
        let session = h.store.get(&SessionId::from("alice")).await.unwrap().unwrap();
        assert_eq!(
            session.turns,
            vec![Turn::user("what is rust"), Turn::assistant("Rust is a systems language")]
        );
        assert_eq!(session.total_tokens, 1);

        // The client saw the pending question as the last turn
        let asked = h.client.last_session().unwrap();
        assert_eq!(asked.last_turn().unwrap(), &Turn::user("what is rust"));
    }

    #[tokio::test]
    async fn reported_usage_updates_token_count() {
        let h = harness(ScriptedClient::new(vec![
            answer("one", Some(10)),
            answer("two", None),
        ]));
        let id = SessionId::from("alice");

        h.bot.reply(&text("q1", "alice")).await.unwrap();
        let before = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(before.total_tokens, 10);

        h.bot.reply(&text("q2", "alice")).await.unwrap();
        let after = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(after.turns.len(), before.turns.len() + 2);
        assert_eq!(after.total_tokens, 11);
    }

    #[tokio::test]
    async fn degraded_answer_is_still_a_text_reply() {
        let mut fallback = answer("我现在有点累了，等会再来吧", None);
        fallback.attempts = 3;
        fallback.degraded = true;
        let h = harness(ScriptedClient::new(vec![fallback]));

        let reply = h.bot.reply(&text("hello", "alice")).await.unwrap();
        assert_eq!(reply.reply_type, ReplyType::Text);
        assert_eq!(reply.content, "我现在有点累了，等会再来吧");
    }

    #[tokio::test]
    async fn clear_memory_clears_only_that_session() {
        let h = harness(ScriptedClient::text("answer"));
        h.bot.reply(&text("hi", "alice")).await.unwrap();
        h.bot.reply(&text("hi", "bob")).await.unwrap();
        let calls_before = h.client.calls();

        let reply = h.bot.reply(&text("#清除记忆", "alice")).await.unwrap();

        assert_eq!(reply, Reply::info(MEMORY_CLEARED));
        assert!(h.store.get(&SessionId::from("alice")).await.unwrap().is_none());
        assert!(h.store.get(&SessionId::from("bob")).await.unwrap().is_some());
        assert_eq!(h.client.calls(), calls_before);
    }

    #[tokio::test]
    async fn clear_all_clears_every_session() {
        let h = harness(ScriptedClient::text("answer"));
        h.bot.reply(&text("hi", "alice")).await.unwrap();
        h.bot.reply(&text("hi", "bob")).await.unwrap();

        let reply = h.bot.reply(&text("#清除所有", "alice")).await.unwrap();

        assert_eq!(reply, Reply::info(ALL_MEMORY_CLEARED));
        assert_eq!(h.store.len().await.unwrap(), 0);
        assert_eq!(h.client.calls(), 2);
    }

    #[tokio::test]
    async fn reload_applies_new_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "aideas_model = \"v1\"\n").unwrap();
        let config = Arc::new(SharedConfig::load_from(&path).unwrap());
        let h = harness_with(config.clone(), ScriptedClient::text("answer"));

        // Not a command yet: goes to the client
        h.bot.reply(&text("/forget", "alice")).await.unwrap();
        assert_eq!(h.client.calls(), 1);

        std::fs::write(&path, "clear_memory_commands = [\"/forget\"]\n").unwrap();
        let reply = h.bot.reply(&text("#更新配置", "alice")).await.unwrap();
        assert_eq!(reply, Reply::info(CONFIG_RELOADED));
        assert_eq!(config.snapshot().clear_memory_commands, vec!["/forget".to_string()]);

        let reply = h.bot.reply(&text("/forget", "alice")).await.unwrap();
        assert_eq!(reply, Reply::info(MEMORY_CLEARED));
        assert_eq!(h.client.calls(), 1);
    }

    #[tokio::test]
    async fn failed_reload_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let config = Arc::new(SharedConfig::load_from(&path).unwrap());
        let h = harness_with(config, ScriptedClient::text("answer"));

        std::fs::write(&path, "request_timeout_secs = \"soon\"\n").unwrap();
        let err = h.bot.reply(&text("#更新配置", "alice")).await.unwrap_err();
        assert!(matches!(err, aideas_core::Error::Config { .. }));
    }
}
