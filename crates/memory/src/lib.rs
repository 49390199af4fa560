//! Session store implementations for the Aideas bot.

pub mod in_memory;

pub use in_memory::{InMemorySessionStore, discard_exceeding};
