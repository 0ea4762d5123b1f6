//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All generation requests MUST go through `GenerationClient`.
//!
//! Model: gemini-2.0-flash (hardcoded, do not make configurable)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
pub mod sampling;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use sampling::SamplingConfig;
use types::{GeminiError, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// The model used for all generation calls.
pub const MODEL: &str = "gemini-2.0-flash";
/// Response bodies above this size are refused rather than parsed.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Candidate finish reasons that mean the model refused to produce content.
const REJECTING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingCredential,

    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unreadable response envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Request rejected by the model: {0}")]
    Rejected(String),
}

impl LlmError {
    /// Transport failures, 429 and 5xx are transient; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Whether the caller expects prose or a JSON document back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

impl ResponseFormat {
    fn mime_type(self) -> Option<&'static str> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::Json => Some("application/json"),
        }
    }
}

/// Raw model output, exactly as the endpoint returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub raw_text: String,
}

/// Status and body of a single HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// The outbound HTTP seam. One call is one network request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_generate(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<TransportResponse, LlmError>;
}

/// Production transport over `reqwest`, bounded by a per-request timeout.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_generate(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<TransportResponse, LlmError> {
        let mut response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let oversized = || {
            LlmError::Rejected(format!("response body exceeds {MAX_RESPONSE_BYTES} bytes"))
        };

        if status.is_success()
            && response
                .content_length()
                .is_some_and(|len| len > MAX_RESPONSE_BYTES as u64)
        {
            return Err(oversized());
        }

        // Content-Length is absent on chunked replies, so the cap is enforced while reading.
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?
        {
            let room = MAX_RESPONSE_BYTES - body.len();
            if chunk.len() > room {
                if status.is_success() {
                    return Err(oversized());
                }
                // Error bodies are only read for their message.
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body: body.freeze(),
        })
    }
}

/// Bounded exponential back-off applied to transient failures only.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: RETRY_BASE_DELAY,
        }
    }

    /// Delay before attempt `attempt + 1`: base, 2×base, 4×base, ...
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// The single generation client shared by every analysis operation.
/// Stateless between calls; cloning shares the underlying transport.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    endpoint: String,
    retry: RetryPolicy,
}

impl GenerationClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: Option<String>,
        base_url: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            api_key,
            endpoint: format!(
                "{}/v1beta/models/{MODEL}:generateContent",
                base_url.trim_end_matches('/')
            ),
            retry,
        }
    }

    /// Builds the production client from startup configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.llm_timeout_secs))?;
        Ok(Self::new(
            Arc::new(transport),
            config.gemini_api_key.clone(),
            &config.gemini_base_url,
            RetryPolicy::new(config.llm_max_attempts),
        ))
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Sends one instruction and returns the model's text.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn generate(
        &self,
        instruction: &str,
        sampling: &SamplingConfig,
        format: ResponseFormat,
    ) -> Result<GenerationResult, LlmError> {
        let api_key = self.credential().ok_or(LlmError::MissingCredential)?;

        if instruction.trim().is_empty() {
            return Err(LlmError::InvalidRequest(
                "instruction cannot be empty".to_string(),
            ));
        }
        sampling.validate()?;

        let request = GenerateContentRequest::user_text(
            instruction,
            sampling.to_generation_config(format.mime_type()),
        );

        let mut attempt = 1;
        loop {
            match self.send_once(api_key, &request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Generation attempt {}/{} failed ({}), retrying after {}ms...",
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResult, LlmError> {
        let response = self
            .transport
            .post_generate(&self.endpoint, api_key, request)
            .await?;

        if !(200..300).contains(&response.status) {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: response.status,
                message,
            });
        }

        if response.body.len() > MAX_RESPONSE_BYTES {
            return Err(LlmError::Rejected(format!(
                "response body exceeds {MAX_RESPONSE_BYTES} bytes"
            )));
        }

        let envelope: GenerateContentResponse = serde_json::from_slice(&response.body)?;
        let raw_text = extract_text(envelope)?;

        debug!("Generation call succeeded: {} chars", raw_text.len());

        Ok(GenerationResult { raw_text })
    }
}

/// Pulls the first candidate's text out of the envelope, refusing blocked
/// or truncated output.
fn extract_text(envelope: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = envelope
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(LlmError::Rejected(format!("prompt blocked: {reason}")));
    }

    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Rejected("response contained no candidates".to_string()))?;

    match candidate.finish_reason.as_deref() {
        Some(reason) if REJECTING_FINISH_REASONS.contains(&reason) => {
            Err(LlmError::Rejected(format!("generation stopped: {reason}")))
        }
        Some("MAX_TOKENS") => Err(LlmError::Rejected(
            "output exceeded maxOutputTokens and was truncated".to_string(),
        )),
        _ => Ok(candidate.text()),
    }
}
