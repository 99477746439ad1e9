pub mod chatgpt;
pub mod mock;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

pub use chatgpt::ChatGpt;
pub use prompts::prompt_summarize_page;

/// Interface to a hosted LLM that lets us complete a prompt and await a response.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete_prompt(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Why a generated summary could not be produced.
#[derive(Debug)]
pub enum LlmError {
    /// The provider's API call failed (network, auth, quota).
    ApiError(async_openai::error::OpenAIError),
    /// The provider answered without any content.
    NoResponse,
    /// The answer was not the JSON object we asked for.
    MalformedResponse(String),
    /// The provider did not answer in time.
    Timeout(Duration),
    /// Internal error: prompt substitution failed.
    PromptCreationFailure(subst::Error),
    /// Failure injected by a mock provider.
    Mock(String),
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::ApiError(e) => write!(f, "OpenAI API error: {}", e),
            LlmError::NoResponse => write!(f, "No response from LLM"),
            LlmError::MalformedResponse(msg) => write!(f, "Malformed LLM response: {}", msg),
            LlmError::Timeout(after) => write!(f, "LLM did not respond within {:?}", after),
            LlmError::PromptCreationFailure(e) => write!(f, "Failed to create prompt: {}", e),
            LlmError::Mock(msg) => write!(f, "Mock LLM failure: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        LlmError::ApiError(err)
    }
}

impl From<subst::Error> for LlmError {
    fn from(err: subst::Error) -> Self {
        LlmError::PromptCreationFailure(err)
    }
}

/// A generated short title + description for one page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Asks the provider for a 3-4 word title and a 9-10 word description of the page.
/// Gives up with `LlmError::Timeout` if the provider takes longer than `timeout`.
pub async fn summarize_page(
    provider: &dyn LlmProvider,
    url: &str,
    markdown: &str,
    timeout: Duration,
) -> Result<PageSummary, LlmError> {
    let prompt = prompt_summarize_page(url, markdown)?;
    let response = tokio::time::timeout(timeout, provider.complete_prompt(&prompt))
        .await
        .map_err(|_| LlmError::Timeout(timeout))??;
    parse_summary(&response)
}

/// Parses the JSON object out of an LLM response, tolerating code fences or chatter around it.
pub fn parse_summary(response: &str) -> Result<PageSummary, LlmError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => return Err(LlmError::MalformedResponse(format!("no JSON object in: '{}'", response))),
    };

    serde_json::from_str::<PageSummary>(json).map_err(|e| LlmError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::mock::MockLlmProvider;

    #[test]
    fn test_parse_summary() {
        let summary = parse_summary(r#"{"title": "Install Guide", "description": "How to install the tool."}"#).unwrap();
        assert_eq!(summary.title, "Install Guide");
        assert_eq!(summary.description, "How to install the tool.");
    }

    #[test]
    fn test_parse_summary_with_code_fence() {
        let response = "```json\n{\"title\": \"API Reference\", \"description\": \"Endpoints.\"}\n```";
        let summary = parse_summary(response).unwrap();
        assert_eq!(summary.title, "API Reference");
    }

    #[test]
    fn test_parse_summary_missing_field() {
        let summary = parse_summary(r#"{"title": "Only Title"}"#).unwrap();
        assert_eq!(summary.description, "");
    }

    #[test]
    fn test_parse_summary_malformed() {
        assert!(matches!(parse_summary("Sure! Here you go."), Err(LlmError::MalformedResponse(_))));
        assert!(matches!(parse_summary("{not json}"), Err(LlmError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_summarize_page() {
        let provider = MockLlmProvider::with_summary("Pricing Plans", "Compare the monthly and yearly subscription plans.");
        let summary = summarize_page(&provider, "https://ex.com/pricing", "# Pricing", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(summary.title, "Pricing Plans");
    }

    #[tokio::test]
    async fn test_summarize_page_timeout() {
        let provider = MockLlmProvider::with_summary("Slow", "Slow").delayed(Duration::from_millis(200));
        let result = summarize_page(&provider, "https://ex.com", "# Slow", Duration::from_millis(10)).await;
        assert!(matches!(result, Err(LlmError::Timeout(_))));
    }
}
