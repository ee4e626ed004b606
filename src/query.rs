//! Question answering over a remote text generator.
//!
//! `QueryClient` validates a question, forwards it to a `TextGenerator` and retries
//! transient failures with exponential backoff. It always answers with text once the
//! question is valid.

mod backoff;
mod client;

pub use backoff::{Sleeper, ThreadSleeper, backoff_delay};
pub use client::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, FAILED_AFTER_RETRIES,
    MAX_QUESTION_CHARS, NO_RESPONSE_GENERATED, QueryClient, QueryClientBuilder, QueryError,
    validate,
};
