use async_trait::async_trait;
use tracing::info;

use super::compat::{ChatMessage, ChatRequest, CompatClient, CompletionResponse};
use super::AiProvider;
use crate::ai::prompts::SYSTEM_PROMPT;
use crate::config::GroqConfig;
use crate::error::ProviderError;
use crate::Result;

/// Groq chat completions provider (OpenAI-compatible API)
pub struct GroqProvider {
    client: CompatClient,
    model: String,
    temperature: f32,
    timeout_secs: f64,
}

impl GroqProvider {
    pub fn new(api_key: &str, config: &GroqConfig, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: CompatClient::new(&config.base_url, api_key, config.timeout_secs)?,
            model: config.model.clone(),
            temperature,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl AiProvider for GroqProvider {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> std::result::Result<String, ProviderError> {
        info!("Attempting Groq call (model={}, timeout={}s)", self.model, self.timeout_secs);

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
}
