//! Client for the Aideas question-answering API.
//!
//! `format` turns a session into the request body; `client` sends it,
//! retries, and falls back.

pub mod client;
pub mod format;

pub use client::{AideasClient, FALLBACK_CONTENT, MAX_ATTEMPTS, ParsedAnswer, parse_response};
pub use format::{ApiRequest, ContextPair, build_context, format_request, format_request_with_id};
