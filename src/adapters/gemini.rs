//! Google Gemini `generateContent` client.
//!
//! Throttling (HTTP 429) and timeouts are retried with exponential backoff,
//! `retry_backoff * 2^(attempt - 1)`; a `Retry-After` header replaces the
//! computed delay when present. Every other failure is returned at once.

use crate::domain::model::Prompt;
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ServiceError::config("provider", format!("could not build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn backoff_for(&self, attempt: u32, err: &ServiceError) -> Duration {
        if let ServiceError::ProviderRateLimit {
            retry_after_secs: Some(secs),
        } = err
        {
            return Duration::from_secs(*secs).min(MAX_RETRY_AFTER);
        }
        self.settings
            .retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    async fn generate_once(&self, prompt: &Prompt) -> Result<String> {
        let url = self.endpoint();
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        debug!(
            "Gemini API call: POST {} ({}: <redacted>) operation={} prompt_chars={}",
            url,
            API_KEY_HEADER,
            prompt.operation.as_str(),
            prompt.system.chars().count() + prompt.user.chars().count()
        );

        let started = Instant::now();
        let response = match self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Err(map_transport_error(e, started)),
        };

        let status = response.status();
        debug!("Gemini API response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(ServiceError::ProviderRateLimit { retry_after_secs });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&error_body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_body);
            return Err(ServiceError::provider(format!(
                "provider returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(e, started))?;

        debug!(
            "Gemini API call finished in {}ms",
            started.elapsed().as_millis()
        );
        candidate_text(payload)
    }
}

fn map_transport_error(err: reqwest::Error, started: Instant) -> ServiceError {
    if err.is_timeout() {
        ServiceError::ProviderTimeout {
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    } else if err.is_connect() {
        ServiceError::provider(format!("failed to connect to provider: {}", err))
    } else if err.is_decode() {
        ServiceError::provider(format!("could not decode provider response: {}", err))
    } else {
        ServiceError::provider(format!("provider request failed: {}", err))
    }
}

fn candidate_text(payload: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = payload.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ServiceError::provider(format!(
            "provider blocked the prompt: {}",
            reason
        )));
    }

    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::provider("provider returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::provider(format!(
            "provider returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.generate_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_for(attempt, &err);
                    warn!(
                        "Gemini call failed ({}), retry {}/{} after {}ms",
                        err,
                        attempt,
                        self.settings.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
