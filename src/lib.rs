//! Ask Gemini questions from the terminal or a small web form.
//!
//! The core is `QueryClient`: it validates the question, calls the model and retries
//! transient failures with exponential backoff. The binaries add argument parsing,
//! `.env` loading and, for the web server, Markdown rendering.

pub mod config;
pub mod gemini;
pub mod query;
pub mod render;
pub mod web;

pub use config::{ConfigError, Settings};
pub use gemini::{GeminiClient, GeminiClientBuilder, GenerateError, TextGenerator};
pub use query::{QueryClient, QueryClientBuilder, QueryError, Sleeper, ThreadSleeper};

/// Installs the `tracing` subscriber used by the binaries.
///
/// Output goes to stderr so stdout only carries answers. `RUST_LOG` overrides
/// `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
