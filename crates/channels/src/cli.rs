//! CLI channel: interactive terminal-based chat.
//!
//! Reads from stdin, writes to stdout. Every line becomes a text context
//! for one fixed session, except lines that start with a media prefix
//! (`/image <path>`, `/voice <path>`, `/file <path>`), which are classified
//! as that media type so non-text handling can be exercised locally.

use aideas_core::channel::Channel;
use aideas_core::context::{Context, ContextType};
use aideas_core::error::ChannelError;
use aideas_core::message::SessionId;
use aideas_core::reply::{Reply, ReplyType};
use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// What a single input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Blank line
    Skip,
    /// Leave the chat loop
    Exit,
    /// Forward to the bot
    Send(ContextType, String),
}

/// Classify one raw stdin line.
pub fn parse_line(line: &str) -> LineAction {
    let line = line.trim();
    if line.is_empty() {
        return LineAction::Skip;
    }

    if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
        return LineAction::Exit;
    }

    for (prefix, kind) in [
        ("/image ", ContextType::Image),
        ("/voice ", ContextType::Voice),
        ("/file ", ContextType::File),
    ] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return LineAction::Send(kind, rest.trim().to_string());
        }
    }

    LineAction::Send(ContextType::Text, line.to_string())
}

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    session_id: SessionId,
}

impl CliChannel {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new(SessionId::from("cli_session"))
    }
}

/// Render a reply the way the terminal shows it.
pub fn render_reply(reply: &Reply) -> String {
    match reply.reply_type {
        ReplyType::Text => reply
            .content
            .lines()
            .map(|line| format!("  Assistant > {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        ReplyType::Info => format!("  [Info] {}", reply.content),
        ReplyType::Error => format!("  [Error] {}", reply.content),
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<Context, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let stdin = io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_line(&line) {
                        LineAction::Skip => continue,
                        LineAction::Exit => break,
                        LineAction::Send(kind, content) => {
                            let ctx = Context::new(kind, content, session_id.clone());
                            if tx.send(Ok(ctx)).await.is_err() {
                                break;
                            }
                        }
                    },
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, _session_id: &SessionId, reply: &Reply) -> Result<(), ChannelError> {
        println!("{}", render_reply(reply));
        Ok(())
    }
}
