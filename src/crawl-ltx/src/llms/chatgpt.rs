use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::llms::{LlmError, LlmProvider};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Summaries through the OpenAI chat completions API.
pub struct ChatGpt {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatGpt {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::with_config(OpenAIConfig::new().with_api_key(api_key)),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmProvider for ChatGpt {
    async fn complete_prompt(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You write short, factual titles and descriptions of web pages. You answer in JSON.")
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(LlmError::NoResponse)
    }
}
