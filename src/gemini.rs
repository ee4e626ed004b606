/// Gemini HTTP client module.
///
/// This module provides the `TextGenerator` trait that the query layer calls,
/// and `GeminiClient`, a synchronous client for the Gemini `generateContent` endpoint.
mod client;

pub use client::{
    DEFAULT_BASE_URL, GeminiClient, GeminiClientBuilder, GenerateError, TextGenerator,
};
