//! Aideas API client with bounded retry.
//!
//! Every failure mode of a single call (transport error, timeout, non-JSON
//! body, missing fields, `code != 200`) is a [`ClientError`]. `answer` runs
//! up to [`MAX_ATTEMPTS`] immediate attempts and, if all of them fail,
//! answers with [`FALLBACK_CONTENT`] instead of an error.

use crate::format::{ApiRequest, format_request};
use aideas_config::SharedConfig;
use aideas_core::error::ClientError;
use aideas_core::qa::{Answer, QaClient};
use aideas_core::session::Session;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Total calls per answer, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Sent to the user when every attempt failed.
pub const FALLBACK_CONTENT: &str = "我现在有点累了，等会再来吧";

/// Response envelope. Every field is optional so that a missing field is
/// reported as [`ClientError::InvalidResponse`] rather than a parse failure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    answer: Option<ApiAnswer>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiAnswer {
    #[serde(default)]
    content: Option<String>,
}

/// A successfully decoded answer envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub content: String,
    pub total_tokens: Option<u64>,
}

/// Decode a response body, accepting only `code == 200` with `answer.content`.
pub fn parse_response(body: &str) -> Result<ParsedAnswer, ClientError> {
    let envelope: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::InvalidResponse(format!("{e}; body: {body}")))?;

    match envelope.code {
        Some(200) => {}
        Some(code) => {
            return Err(ClientError::ApiError {
                code,
                body: body.to_string(),
            });
        }
        None => {
            return Err(ClientError::InvalidResponse(format!("missing `code`; body: {body}")));
        }
    }

    let content = envelope
        .answer
        .and_then(|a| a.content)
        .ok_or_else(|| ClientError::InvalidResponse(format!("missing `answer.content`; body: {body}")))?;

    Ok(ParsedAnswer {
        content,
        total_tokens: envelope.total_tokens,
    })
}

/// HTTP client for the Aideas QA endpoint.
///
/// The endpoint URL and timeout come from the shared config snapshot taken
/// at the start of each `answer` call.
pub struct AideasClient {
    config: Arc<SharedConfig>,
    client: reqwest::Client,
}

impl AideasClient {
    pub fn new(config: Arc<SharedConfig>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// One POST of `request` to `url`.
    async fn call_once(
        &self,
        url: &str,
        timeout: Duration,
        request: &ApiRequest,
    ) -> Result<ParsedAnswer, ClientError> {
        debug!(request_id = request.id, session_id = %request.session_id, "Sending Aideas request");

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(format!("{url} after {}s", timeout.as_secs()))
                } else {
                    ClientError::Network(e.to_string())
                }
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        parse_response(&body)
    }

    /// Format and send one request for `session`.
    async fn try_answer(
        &self,
        url: Option<&str>,
        timeout: Duration,
        session: &Session,
    ) -> Result<ParsedAnswer, ClientError> {
        let url = url.ok_or_else(|| ClientError::NotConfigured("aideas_api".into()))?;
        let request = format_request(session)?;
        self.call_once(url, timeout, &request).await
    }
}

#[async_trait]
impl QaClient for AideasClient {
    fn name(&self) -> &str {
        "aideas"
    }

    async fn answer(&self, session: &Session) -> Answer {
        let config = self.config.snapshot();
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let url = config.aideas_api.as_deref();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_answer(url, timeout, session).await {
                Ok(parsed) => {
                    return Answer {
                        content: parsed.content,
                        total_tokens: parsed.total_tokens,
                        attempts: attempt,
                        degraded: false,
                    };
                }
                Err(e) => {
                    error!(session_id = %session.id, attempt, error = %e, "Aideas request failed");
                    if attempt < MAX_ATTEMPTS {
                        warn!(session_id = %session.id, retry = attempt, "Retrying Aideas request");
                    }
                }
            }
        }

        Answer {
            content: FALLBACK_CONTENT.to_string(),
            total_tokens: None,
            attempts: MAX_ATTEMPTS,
            degraded: true,
        }
    }
}
