//! Request formatting: session history to the Aideas wire shape.
//!
//! The API takes the pending question plus earlier exchanges flattened into
//! `{question, answer}` pairs:
//!
//! ```json
//! {"id": 1804289383, "question": "...", "sessionId": "...",
//!  "context": [{"question": "...", "answer": "..."}]}
//! ```

use aideas_core::error::ClientError;
use aideas_core::message::{Role, Turn};
use aideas_core::session::Session;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of request correlation ids.
pub const MAX_REQUEST_ID: u32 = i32::MAX as u32;

/// Body of a QA request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Random correlation id; for tracing only, not unique
    pub id: u32,

    pub question: String,

    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub context: Vec<ContextPair>,
}

/// One earlier exchange in the request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPair {
    pub question: String,
    pub answer: String,
}

/// Build the request for the last turn of `session` with a fresh random id.
pub fn format_request(session: &Session) -> Result<ApiRequest, ClientError> {
    let id = rand::rng().random_range(0..=MAX_REQUEST_ID);
    format_request_with_id(session, id)
}

/// Build the request for the last turn of `session`.
pub fn format_request_with_id(session: &Session, id: u32) -> Result<ApiRequest, ClientError> {
    let question = session
        .last_turn()
        .ok_or_else(|| ClientError::EmptySession(session.id.to_string()))?;

    Ok(ApiRequest {
        id,
        question: question.content.clone(),
        session_id: session.id.to_string(),
        context: build_context(&session.turns),
    })
}

/// Pair adjacent user → assistant turns, oldest first.
///
/// The final two positions are never considered, so the pending question
/// (and the answer it does not have yet) stay out of the context. Turns that
/// do not start a user → assistant pair are skipped.
pub fn build_context(turns: &[Turn]) -> Vec<ContextPair> {
    let mut context = Vec::new();
    let mut index = 0;

    while index + 2 < turns.len() {
        let current = &turns[index];
        let next = &turns[index + 1];

        if current.role == Role::User && next.role == Role::Assistant {
            // FIXME: `answer` carries the user turn's text, not `next.content`.
            // The deployed API has only ever received this shape; confirm with
            // the service owners before switching it to the assistant reply.
            context.push(ContextPair {
                question: current.content.clone(),
                answer: current.content.clone(),
            });
            index += 2;
        } else {
            index += 1;
        }
    }

    context
}
