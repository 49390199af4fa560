//! Channel trait: the abstraction over chat front ends.
//!
//! A Channel receives messages from users as [`Context`]s and delivers the
//! bot's [`Reply`] back to the conversation they came from.

use async_trait::async_trait;
use crate::context::Context;
use crate::error::ChannelError;
use crate::message::SessionId;
use crate::reply::Reply;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    ///
    /// Returns a receiver that yields inbound contexts. The channel
    /// implementation handles polling internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<Context, ChannelError>>,
        ChannelError,
    >;

    /// Deliver a reply to a session.
    async fn send(&self, session_id: &SessionId, reply: &Reply) -> std::result::Result<(), ChannelError>;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}
