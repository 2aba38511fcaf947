use async_trait::async_trait;
use tracing::{debug, info};

use super::compat::{ChatMessage, ChatRequest, CompatClient, CompletionRequest, CompletionResponse};
use super::AiProvider;
use crate::ai::prompts::SYSTEM_PROMPT;
use crate::config::OpenAiConfig;
use crate::error::ProviderError;
use crate::Result;

/// OpenAI provider
///
/// Tries the chat completions API first and falls back to the legacy
/// completions API when the endpoint does not serve chat (older proxies and
/// self-hosted OpenAI-compatible servers).
pub struct OpenAiProvider {
    client: CompatClient,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, config: &OpenAiConfig, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: CompatClient::new(&config.base_url, api_key, config.timeout_secs)?,
            model: config.model.clone(),
            temperature,
        })
    }

    async fn chat(&self, prompt: &str, max_tokens: Option<u32>) -> std::result::Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
            max_tokens,
        };

        let response: CompletionResponse = self.client.post("chat/completions", &request).await?;
        response.first_content()
    }

    async fn legacy_completion(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> std::result::Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt: format!("{SYSTEM_PROMPT}\n\n{prompt}"),
            temperature: self.temperature,
            max_tokens,
        };

        let response: CompletionResponse = self.client.post("completions", &request).await?;
        response.first_content()
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> std::result::Result<String, ProviderError> {
        info!("Trying OpenAI chat completions (model={})", self.model);
        match self.chat(prompt, max_tokens).await {
            Err(ProviderError::Unsupported(reason)) => {
                debug!("Chat completions unavailable ({}); trying legacy completions", reason);
            }
            other => return other,
        }

        info!("Trying OpenAI legacy completions (model={})", self.model);
        match self.legacy_completion(prompt, max_tokens).await {
            Err(ProviderError::Unsupported(reason)) => Err(ProviderError::Fatal(format!(
                "no supported completion endpoint at {} ({})",
                self.client.base_url(),
                reason
            ))),
            other => other,
        }
    }
}
