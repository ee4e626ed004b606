/// Gemini HTTP client implementation.
///
/// This module provides `GeminiClient` for making synchronous requests to the Gemini
/// `generateContent` endpoint, along with the error type and builder used to configure it.
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default Gemini REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Status string Google APIs use for quota and rate-limit failures.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Failures reported by a remote text-generation call.
///
/// The query layer only distinguishes two kinds: quota exhaustion, which is always
/// retried, and everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The caller exceeded a rate or usage limit (HTTP 429 / `RESOURCE_EXHAUSTED`)
    #[error("Quota exhausted: {message}")]
    QuotaExhausted { message: String },

    /// Any other API, transport or decoding failure
    #[error("{message}")]
    Api { message: String },
}

impl GenerateError {
    /// Creates an `Api` error from any displayable detail.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Creates a `QuotaExhausted` error from any displayable detail.
    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::QuotaExhausted {
            message: message.into(),
        }
    }
}

/// Remote text generation: "generate text for prompt P using model M".
///
/// This trait is the seam between `QueryClient` and the network, and enables
/// mocking in unit tests. An empty string means the model produced no text.
pub trait TextGenerator: Send + Sync {
    /// Generates text for `prompt` with the given model.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerateError>;
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use gemini_ask::gemini::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new()
///     .api_key("secret")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "https://generativelanguage.googleapis.com/v1beta");
/// ```
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl GeminiClientBuilder {
    /// Creates a new `GeminiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key sent in the `x-goog-api-key` header.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the REST endpoint root (mainly for proxies and tests).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the `GeminiClient`.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::Api` if no API key was set, the base URL does not
    /// parse, or the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<GeminiClient, GenerateError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerateError::api("API key is required"))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| GenerateError::api(format!("Invalid URL {base_url}: {e}")))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GenerateError::api(e.to_string()))?;

        Ok(GeminiClient {
            client,
            base_url,
            api_key,
        })
    }
}

/// Synchronous client for the Gemini `generateContent` endpoint.
///
/// Each call is a single HTTP request; retrying is the caller's job.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Returns the REST endpoint root configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn generate_internal(&self, model: &str, prompt: &str) -> Result<String, GenerateError> {
        let request_body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        tracing::debug!(model, prompt_chars = prompt.chars().count(), "calling generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .map_err(|e| GenerateError::api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerateError::api(format!("Failed to decode response: {e}")))?;

        Ok(parsed.text())
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerateError> {
        self.generate_internal(model, prompt)
    }
}

/// `generateContent` response, reduced to the fields we read.
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate; empty when the model returned none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Maps a non-2xx response to a `GenerateError`.
///
/// HTTP 429 or a `RESOURCE_EXHAUSTED` status in the body is quota exhaustion;
/// everything else is an API error carrying `"<status> <message>"`, or just
/// `"HTTP <status>"` when the body has no usable message.
fn classify_failure(status: u16, body: &str) -> GenerateError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let detail = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.message.as_deref())
        .filter(|m| !m.is_empty())
        .map(|message| format!("{status} {message}"))
        .unwrap_or_else(|| format!("HTTP {status}"));

    let exhausted = status == 429
        || parsed
            .as_ref()
            .and_then(|envelope| envelope.error.status.as_deref())
            == Some(RESOURCE_EXHAUSTED);

    if exhausted {
        GenerateError::QuotaExhausted { message: detail }
    } else {
        GenerateError::Api { message: detail }
    }
}
