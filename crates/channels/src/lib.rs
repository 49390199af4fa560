//! Chat channel implementations for the Aideas bot.

pub mod cli;

pub use cli::{CliChannel, LineAction, parse_line, render_reply};
