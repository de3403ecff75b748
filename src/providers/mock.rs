/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different backend behaviors:
 * - `MockProvider::working()` - Translates every payload line
 * - `MockProvider::merging(n)` - Returns only the first `n` lines (line merge)
 * - `MockProvider::padding(n)` - Appends `n` extra lines
 * - `MockProvider::intermittent(n)` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::scripted(..)` - Replays canned responses in order
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::prompts::extract_payload;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// Model the caller asked for
    pub model: String,
    /// Full prompt text
    pub prompt: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with one translated line per payload line
    Working,
    /// Succeeds but keeps only the first `keep` lines
    Merging { keep: usize },
    /// Succeeds but appends `extra` invented lines
    Padding { extra: usize },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, in order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Canned responses served before `behavior` applies; `None` means fail
    script: Arc<Mutex<VecDeque<Option<String>>>>,
    /// Custom line translator (optional)
    line_translator: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            line_translator: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn merging(keep: usize) -> Self {
        Self::new(MockBehavior::Merging { keep })
    }

    pub fn padding(extra: usize) -> Self {
        Self::new(MockBehavior::Padding { extra })
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Replay `responses` in order (`None` = backend failure), then behave as `working()`
    pub fn scripted(responses: Vec<Option<String>>) -> Self {
        let provider = Self::working();
        *provider.script.lock() = responses.into_iter().collect();
        provider
    }

    /// Translate each payload line with `translator` instead of the default tag
    pub fn with_line_translator(mut self, translator: fn(&str) -> String) -> Self {
        self.line_translator = Some(translator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every prompt received
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn translate_lines(&self, payload: &str) -> Vec<String> {
        payload
            .split('\n')
            .map(|line| match self.line_translator {
                Some(translator) => translator(line),
                None => format!("[TRANSLATED] {}", line),
            })
            .collect()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            prompts: Arc::clone(&self.prompts),
            script: Arc::clone(&self.script),
            line_translator: self.line_translator,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, model: &str, prompt: &str) -> MockRequest {
        MockRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());

        if let Some(scripted) = self.script.lock().pop_front() {
            return scripted
                .map(|text| MockResponse { text })
                .ok_or_else(|| ProviderError::ConnectionError("Simulated scripted failure".to_string()));
        }

        let payload = extract_payload(&request.prompt);
        let mut lines = self.translate_lines(payload);

        match self.behavior {
            MockBehavior::Working => {}
            MockBehavior::Merging { keep } => lines.truncate(keep),
            MockBehavior::Padding { extra } => {
                lines.extend((0..extra).map(|i| format!("[EXTRA] {}", i)));
            }
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    });
                }
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }
        }

        Ok(MockResponse { text: lines.join("\n") })
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
