//! The Aideas bot: command dispatch and reply orchestration.
//!
//! Flow for one text query:
//! 1. [`Dispatcher`] handles administrative commands and may short-circuit
//! 2. the query is appended to the sender's session
//! 3. the [`QaClient`](aideas_core::QaClient) answers it (retrying internally)
//! 4. the answer is appended to the session and returned as a text reply

pub mod bot;
pub mod command;

pub use bot::{AideasBot, unsupported_type_message};
pub use command::{Command, Dispatcher};

#[cfg(test)]
pub(crate) mod test_helpers;
