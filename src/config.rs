//! Process-wide settings resolved once at startup.
//!
//! This is the only place that reads the environment. Binaries call
//! `load_dotenv()` first so values from a `.env` file are visible here.

use thiserror::Error;

use crate::query::{DEFAULT_MODEL, QueryClient, QueryClientBuilder, QueryError};

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable selecting the model when no flag is given.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

/// Environment variable selecting the web server port.
pub const PORT_VAR: &str = "PORT";

/// Port the web server listens on when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8000;

/// Errors raised while resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT value '{value}': expected a port number")]
    InvalidPort { value: String },
}

/// Settings shared by the CLI and web entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Credential from the environment, if any
    pub api_key: Option<String>,
    /// Model questions are sent to
    pub model: String,
    /// Web server port
    pub port: u16,
}

/// Loads `.env` from the working directory (or a parent) into the environment.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
    }
}

impl Settings {
    /// Resolves settings from the environment.
    ///
    /// The model is taken from `model_override`, then `GEMINI_MODEL`, then
    /// `DEFAULT_MODEL`. A blank `GEMINI_API_KEY` counts as unset.
    pub fn from_env(model_override: Option<String>) -> Result<Self, ConfigError> {
        let api_key = non_blank_var(API_KEY_VAR);

        let model = model_override
            .filter(|m| !m.trim().is_empty())
            .or_else(|| non_blank_var(MODEL_VAR))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let port = match non_blank_var(PORT_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            model,
            port,
        })
    }

    /// Builds a `QueryClient` using the environment credential as the fallback.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::MissingApiKey` when no credential is configured.
    pub fn query_client(&self) -> Result<QueryClient, QueryError> {
        self.query_client_builder().build()
    }

    /// Returns a builder pre-filled with these settings.
    pub fn query_client_builder(&self) -> QueryClientBuilder {
        QueryClientBuilder::new()
            .fallback_api_key(self.api_key.clone())
            .model(self.model.clone())
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
