//! Mock LLM provider for testing
//!
//! This module provides a mock implementation of the `LlmProvider` trait
//! that can be configured to return a predefined response or an error,
//! without making real API calls.

use async_trait::async_trait;
use std::time::Duration;

use crate::llms::{LlmError, LlmProvider};

/// Mock LLM provider for testing
///
/// Answers every prompt with one configured response, or fails, optionally after a delay.
pub struct MockLlmProvider {
    /// Response returned for any prompt
    default_response: Option<String>,
    /// If true, always return an error
    should_fail: bool,
    /// Wait this long before answering
    delay: Option<Duration>,
}

impl MockLlmProvider {
    /// Create a new empty mock provider
    pub fn new() -> Self {
        Self {
            default_response: None,
            should_fail: false,
            delay: None,
        }
    }

    /// Create a mock with a default response for any prompt
    pub fn with_default(response: &str) -> Self {
        let mut provider = Self::new();
        provider.set_default(response);
        provider
    }

    /// Create a mock that answers every prompt with this title + description as JSON
    pub fn with_summary(title: &str, description: &str) -> Self {
        Self::with_default(&summary_json(title, description))
    }

    /// Create a mock that always fails with an error
    pub fn with_failure() -> Self {
        let mut provider = Self::new();
        provider.set_should_fail(true);
        provider
    }

    /// Answer only after `delay`
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the default response
    pub fn set_default(&mut self, response: &str) {
        self.default_response = Some(response.to_string());
    }

    /// Set whether this provider should fail
    pub fn set_should_fail(&mut self, should_fail: bool) {
        self.should_fail = should_fail;
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete_prompt(&self, _prompt: &str) -> Result<String, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(LlmError::Mock("Mock LLM provider configured to fail".to_string()));
        }

        self.default_response
            .clone()
            .ok_or_else(|| LlmError::Mock("Mock LLM provider has no response configured".to_string()))
    }
}

//
// Test Fixtures
//

/// A well-formed summary response
pub fn summary_json(title: &str, description: &str) -> String {
    serde_json::json!({ "title": title, "description": description }).to_string()
}
