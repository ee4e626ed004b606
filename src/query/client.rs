//! `QueryClient`: validation plus the retry loop around one generation call.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::gemini::{GeminiClientBuilder, GenerateError, TextGenerator};

use super::backoff::{Sleeper, ThreadSleeper, backoff_delay};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Number of generation attempts per question.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles on each further attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 10_000;

/// Answer returned when the model succeeds but produces no text.
pub const NO_RESPONSE_GENERATED: &str = "No response generated.";

/// Answer returned when every attempt ended in quota exhaustion.
pub const FAILED_AFTER_RETRIES: &str = "Failed after retries.";

/// Errors raised by `QueryClient` construction and input validation.
///
/// Remote failures are not listed here: they are retried, and the last one is
/// turned into answer text.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No credential was passed and none was found in the environment
    #[error("API key not found. Set GEMINI_API_KEY in .env or pass directly.")]
    MissingApiKey,

    /// The HTTP client for the remote API could not be set up
    #[error("Failed to set up Gemini client: {0}")]
    ClientSetup(#[source] GenerateError),

    /// The question was empty or whitespace-only
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// The question exceeded `MAX_QUESTION_CHARS`
    #[error("Question too long (max {max} characters)")]
    QuestionTooLong { max: usize, actual: usize },
}

impl QueryError {
    /// True for errors raised while constructing the client.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::ClientSetup(_))
    }

    /// True for errors caused by the question itself.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyQuestion | Self::QuestionTooLong { .. })
    }
}

/// Checks that a question is non-blank and at most `MAX_QUESTION_CHARS` long.
///
/// # Examples
///
/// ```
/// use gemini_ask::query::validate;
///
/// assert!(validate("What is Rust?").is_ok());
/// assert!(validate("   ").is_err());
/// ```
pub fn validate(question: &str) -> Result<(), QueryError> {
    if question.trim().is_empty() {
        return Err(QueryError::EmptyQuestion);
    }

    let chars = question.chars().count();
    if chars > MAX_QUESTION_CHARS {
        return Err(QueryError::QuestionTooLong {
            max: MAX_QUESTION_CHARS,
            actual: chars,
        });
    }

    Ok(())
}

/// Builder for constructing `QueryClient` instances.
///
/// The credential comes from `api_key()` or, failing that, from
/// `fallback_api_key()`, which entry points fill from the environment.
pub struct QueryClientBuilder {
    api_key: Option<String>,
    fallback_api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    max_retries: u32,
    base_delay: Duration,
    generator: Option<Arc<dyn TextGenerator>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl Default for QueryClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            fallback_api_key: None,
            model: None,
            base_url: None,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            generator: None,
            sleeper: None,
        }
    }
}

impl QueryClientBuilder {
    /// Creates a new builder with the default retry policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential explicitly.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the credential used when no explicit one was given.
    pub fn fallback_api_key(mut self, api_key: Option<String>) -> Self {
        self.fallback_api_key = api_key;
        self
    }

    /// Sets the model name (default `DEFAULT_MODEL`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the Gemini REST endpoint root of the default generator.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets how many generation attempts are made per question.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Replaces the Gemini HTTP client with another generator.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replaces the thread sleeper used between attempts.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Builds the `QueryClient`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MissingApiKey` when neither the explicit nor the fallback
    /// credential is set (blank values count as unset), and `QueryError::ClientSetup`
    /// when the default Gemini client cannot be created.
    pub fn build(self) -> Result<QueryClient, QueryError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or(self.fallback_api_key.filter(|key| !key.trim().is_empty()))
            .ok_or(QueryError::MissingApiKey)?;

        let generator: Arc<dyn TextGenerator> = match self.generator {
            Some(generator) => generator,
            None => {
                let mut builder = GeminiClientBuilder::new().api_key(api_key);
                if let Some(url) = self.base_url {
                    builder = builder.base_url(url);
                }
                Arc::new(builder.build().map_err(QueryError::ClientSetup)?)
            }
        };

        Ok(QueryClient {
            generator,
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(ThreadSleeper)),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_retries: self.max_retries,
            base_delay: self.base_delay,
        })
    }
}

/// Validates questions and asks them with bounded exponential-backoff retries.
///
/// The client holds only read-only configuration and can be shared across threads.
pub struct QueryClient {
    generator: Arc<dyn TextGenerator>,
    sleeper: Arc<dyn Sleeper>,
    model: String,
    max_retries: u32,
    base_delay: Duration,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Returns a builder with the default retry policy.
    pub fn builder() -> QueryClientBuilder {
        QueryClientBuilder::new()
    }

    /// Returns the model questions are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the number of attempts made per question.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Validates a question without sending it.
    pub fn validate(&self, question: &str) -> Result<(), QueryError> {
        validate(question)
    }

    /// Asks `question` and returns the answer text.
    ///
    /// Quota exhaustion always sleeps `base_delay * 2^attempt` and moves on, including
    /// after the final attempt. Other API errors are retried the same way until the
    /// final attempt, whose error is returned as `"API Error: <detail>"`. Empty model
    /// output yields `NO_RESPONSE_GENERATED`; exhausting every attempt on quota errors
    /// yields `FAILED_AFTER_RETRIES`.
    ///
    /// # Errors
    ///
    /// Only validation failures are returned as errors, before any remote call.
    pub fn ask(&self, question: &str) -> Result<String, QueryError> {
        validate(question)?;

        for attempt in 0..self.max_retries {
            let is_last = attempt + 1 >= self.max_retries;
            debug!(attempt, model = %self.model, "sending question");

            match self.generator.generate(&self.model, question) {
                Ok(text) if text.is_empty() => {
                    debug!(attempt, "model returned no text");
                    return Ok(NO_RESPONSE_GENERATED.to_string());
                }
                Ok(text) => return Ok(text),
                Err(GenerateError::QuotaExhausted { message }) => {
                    let delay = backoff_delay(self.base_delay, attempt);
                    warn!(attempt, ?delay, %message, "quota exhausted, backing off");
                    self.sleeper.sleep(delay);
                }
                Err(GenerateError::Api { message }) if is_last => {
                    error!(attempt, %message, "API error on final attempt");
                    return Ok(format!("API Error: {message}"));
                }
                Err(GenerateError::Api { message }) => {
                    let delay = backoff_delay(self.base_delay, attempt);
                    warn!(attempt, ?delay, %message, "API error, retrying");
                    self.sleeper.sleep(delay);
                }
            }
        }

        error!(attempts = self.max_retries, "giving up after repeated quota errors");
        Ok(FAILED_AFTER_RETRIES.to_string())
    }
}
