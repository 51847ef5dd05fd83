//! services/countdown/src/adapters/prompt_llm.rs
//!
//! This module contains the adapter for the prompt-writing LLM.
//! It implements the `TextCompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use countdown_core::ports::{PortError, PortResult, TextCompletionService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextCompletionService` using an OpenAI-compatible chat model.
#[derive(Clone)]
pub struct OpenAiPromptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiPromptAdapter {
    /// Creates a new `OpenAiPromptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }
}

//=========================================================================================
// `TextCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextCompletionService for OpenAiPromptAdapter {
    /// Sends the instruction as a single user message and returns the first choice's text.
    async fn complete(&self, instruction: &str) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(instruction)
            .build()
            .map_err(|e| PortError::PromptSynthesisFailed(e.to_string()))?
            .into()];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .n(1)
            .stream(false)
            .build()
            .map_err(|e| PortError::PromptSynthesisFailed(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::PromptSynthesisFailed(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::PromptSynthesisFailed(
                    "Prompt LLM response contained no text content.".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_is_prompt_synthesis_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = OpenAIConfig::new()
            .with_api_key("sk-test")
            .with_api_base(format!("http://{addr}/v1"));
        let adapter =
            OpenAiPromptAdapter::new(Client::with_config(config), "gpt-4o-mini".to_string(), 50);

        let err = adapter.complete("Write a prompt").await.unwrap_err();

        assert!(matches!(err, PortError::PromptSynthesisFailed(_)));
    }
}
