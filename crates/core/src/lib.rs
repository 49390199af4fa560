//! # Aideas Core
//!
//! Domain types, traits, and error definitions for the Aideas bot.
//! This crate has no framework dependencies: it defines the model that
//! the store, client, channel and bot crates implement against.
//!
//! Every collaborator the bot talks to is a trait here:
//! - [`SessionStore`] keeps per-conversation turn history
//! - [`QaClient`] turns a session into an answer
//! - [`Channel`] delivers inbound [`Context`]s and outbound [`Reply`]s

pub mod error;
pub mod message;
pub mod session;
pub mod context;
pub mod reply;
pub mod qa;
pub mod channel;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Role, Turn, SessionId};
pub use session::{Session, SessionStore, estimate_tokens};
pub use context::{Context, ContextType};
pub use reply::{Reply, ReplyType};
pub use qa::{Answer, QaClient};
pub use channel::Channel;
