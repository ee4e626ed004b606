//! Shared test doubles for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gemini_ask::{GenerateError, QueryClient, QueryClientBuilder, Sleeper, TextGenerator};

/// Generator that replays a fixed list of outcomes, then repeats the last one.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerateError>>>,
    last: Mutex<Option<Result<String, GenerateError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String, GenerateError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn always(reply: Result<String, GenerateError>) -> Arc<Self> {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(model, prompt)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));

        let mut last = self.last.lock().unwrap();
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            *last = Some(reply);
        }
        last.clone().expect("ScriptedGenerator needs at least one reply")
    }
}

/// Sleeper that records requested delays instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Client with a test credential and the given doubles.
pub fn client(generator: Arc<ScriptedGenerator>, sleeper: Arc<RecordingSleeper>) -> QueryClient {
    QueryClientBuilder::new()
        .api_key("test-key")
        .generator(generator)
        .sleeper(sleeper)
        .build()
        .expect("Failed to build test client")
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}
