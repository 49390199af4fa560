//! Error types for the Aideas domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Aideas operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Session store errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Remote QA API errors ---
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A single failed attempt against the remote QA API.
///
/// Every variant is recoverable: the client retries and finally degrades
/// to a fallback answer instead of returning one of these to its caller.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("API endpoint not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed API response: {0}")]
    InvalidResponse(String),

    #[error("API returned code {code}: {body}")]
    ApiError { code: i64, body: String },

    #[error("Session {0} has no turns to ask about")]
    EmptySession(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}
