use std::sync::Arc;

use tracing::{error, info, warn};

use super::prompts::build_prompt;
use super::providers::{AiProvider, GroqProvider, OpenAiProvider};
use super::stub::stub_summary;
use crate::config::{AppConfig, RateLimitPolicy};
use crate::validation::Style;
use crate::{Error, Result};

/// A provider position in the fallback order. `provider` is `None` when the
/// integration is unavailable (no credential), which is skipped silently.
pub struct ProviderSlot {
    name: String,
    provider: Option<Arc<dyn AiProvider>>,
}

impl ProviderSlot {
    pub fn available(provider: Arc<dyn AiProvider>) -> Self {
        Self {
            name: provider.name().to_string(),
            provider: Some(provider),
        }
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }
}

/// AI Summarizer with ordered provider fallback and an offline stub
pub struct Summarizer {
    stub_mode: bool,
    policy: RateLimitPolicy,
    providers: Vec<ProviderSlot>,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let llm = &config.llm;

        let groq = match &llm.groq.api_key {
            Some(key) => ProviderSlot::available(Arc::new(GroqProvider::new(
                key.expose(),
                &llm.groq,
                llm.temperature,
            )?)),
            None => ProviderSlot::unavailable("Groq"),
        };
        let openai = match &llm.openai.api_key {
            Some(key) => ProviderSlot::available(Arc::new(OpenAiProvider::new(
                key.expose(),
                &llm.openai,
                llm.temperature,
            )?)),
            None => ProviderSlot::unavailable("OpenAI"),
        };

        let providers = if llm.groq_first() {
            vec![groq, openai]
        } else {
            vec![openai, groq]
        };

        Ok(Self::with_providers(llm.stub_mode, llm.rate_limit_policy, providers))
    }

    /// Build a summarizer from explicit provider slots, tried in the given order
    pub fn with_providers(stub_mode: bool, policy: RateLimitPolicy, providers: Vec<ProviderSlot>) -> Self {
        Self {
            stub_mode,
            policy,
            providers,
        }
    }

    /// Provider names in the order they are tried
    pub fn provider_order(&self) -> Vec<&str> {
        self.providers.iter().map(ProviderSlot::name).collect()
    }

    pub fn stub_mode(&self) -> bool {
        self.stub_mode
    }

    /// Summarize validated text in the given style
    pub async fn summarize(&self, text: &str, style: Style, max_tokens: Option<u32>) -> Result<String> {
        if self.stub_mode {
            info!("Stub mode enabled, returning offline summary");
            return Ok(stub_summary(text, style));
        }

        let prompt = build_prompt(style, text);

        for slot in &self.providers {
            let Some(provider) = &slot.provider else {
                info!("{} not configured, skipping", slot.name);
                continue;
            };

            match provider.complete(&prompt, max_tokens).await {
                Ok(content) => {
                    info!("{} returned a summary ({} chars)", slot.name, content.len());
                    return Ok(content);
                }
                Err(e) if e.is_rate_or_quota() => match self.policy {
                    RateLimitPolicy::Stub => {
                        warn!("{} rate limited or timed out ({}), using stub summary", slot.name, e);
                        return Ok(stub_summary(text, style));
                    }
                    RateLimitPolicy::NextProvider => {
                        warn!("{} rate limited or timed out ({}), trying next provider", slot.name, e);
                    }
                },
                Err(e) => {
                    error!("{} call failed: {}", slot.name, e);
                    return Err(Error::Provider {
                        provider: slot.name.clone(),
                        source: e,
                    });
                }
            }
        }

        warn!(
            "No provider produced a summary (tried: {}), using stub summary",
            self.provider_order().join(", ")
        );
        Ok(stub_summary(text, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::error::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEXT: &str = "Hello world. This is a test. Third sentence here.";
    const BRIEF_STUB: &str = "[STUB - brief] Hello world. This is a test.";

    struct FakeProvider {
        name: &'static str,
        outcome: std::result::Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, outcome: std::result::Result<String, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl AiProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(
            &self,
            prompt: &str,
            _max_tokens: Option<u32>,
        ) -> std::result::Result<String, ProviderError> {
            assert!(prompt.contains(TEXT));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn summarizer(policy: RateLimitPolicy, providers: &[Arc<FakeProvider>]) -> Summarizer {
        let slots = providers
            .iter()
            .map(|p| ProviderSlot::available(p.clone() as Arc<dyn AiProvider>))
            .collect();
        Summarizer::with_providers(false, policy, slots)
    }

    #[tokio::test]
    async fn test_stub_mode_never_calls_providers() {
        let groq = FakeProvider::new("Groq", Ok("model output".to_string()));
        let slots = vec![ProviderSlot::available(groq.clone())];
        let summarizer = Summarizer::with_providers(true, RateLimitPolicy::Stub, slots);

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, BRIEF_STUB);
        assert_eq!(groq.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = FakeProvider::new("Groq", Ok("A model summary.".to_string()));
        let second = FakeProvider::new("OpenAI", Ok("unused".to_string()));
        let summarizer = summarizer(RateLimitPolicy::Stub, &[first.clone(), second.clone()]);

        let summary = summarizer.summarize(TEXT, Style::Brief, Some(50)).await.unwrap();
        assert_eq!(summary, "A model summary.");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_to_stub_without_next_provider() {
        let first = FakeProvider::new("Groq", Err(ProviderError::RateLimited("HTTP 429".to_string())));
        let second = FakeProvider::new("OpenAI", Ok("unused".to_string()));
        let summarizer = summarizer(RateLimitPolicy::Stub, &[first.clone(), second.clone()]);

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, BRIEF_STUB);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_treated_like_rate_limit() {
        let first = FakeProvider::new("OpenAI", Err(ProviderError::Transient("timed out".to_string())));
        let summarizer = summarizer(RateLimitPolicy::Stub, &[first.clone()]);

        let summary = summarizer.summarize(TEXT, Style::Bullets, None).await.unwrap();
        assert!(summary.starts_with("[STUB - bullets]\n- Hello world."));
    }

    #[tokio::test]
    async fn test_next_provider_policy_tries_second_provider() {
        let first = FakeProvider::new("Groq", Err(ProviderError::RateLimited("quota".to_string())));
        let second = FakeProvider::new("OpenAI", Ok("Second provider summary.".to_string()));
        let summarizer = summarizer(RateLimitPolicy::NextProvider, &[first.clone(), second.clone()]);

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, "Second provider summary.");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_next_provider_policy_stubs_when_all_throttled() {
        let first = FakeProvider::new("Groq", Err(ProviderError::RateLimited("429".to_string())));
        let second = FakeProvider::new("OpenAI", Err(ProviderError::Transient("timeout".to_string())));
        let summarizer = summarizer(RateLimitPolicy::NextProvider, &[first, second]);

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, BRIEF_STUB);
    }

    #[tokio::test]
    async fn test_fatal_error_is_surfaced_with_provider_name() {
        let first = FakeProvider::new("Groq", Err(ProviderError::Fatal("HTTP 500: boom".to_string())));
        let second = FakeProvider::new("OpenAI", Ok("unused".to_string()));
        let summarizer = summarizer(RateLimitPolicy::NextProvider, &[first, second.clone()]);

        let err = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap_err();
        match err {
            Error::Provider { provider, source } => {
                assert_eq!(provider, "Groq");
                assert_eq!(source, ProviderError::Fatal("HTTP 500: boom".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_is_surfaced() {
        let first = FakeProvider::new("OpenAI", Err(ProviderError::Unauthorized("bad key".to_string())));
        let summarizer = summarizer(RateLimitPolicy::Stub, &[first]);

        let err = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_slot_is_skipped() {
        let second = FakeProvider::new("OpenAI", Ok("From OpenAI.".to_string()));
        let slots = vec![
            ProviderSlot::unavailable("Groq"),
            ProviderSlot::available(second.clone()),
        ];
        let summarizer = Summarizer::with_providers(false, RateLimitPolicy::Stub, slots);

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, "From OpenAI.");
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_unconfigured_returns_stub() {
        let summarizer = Summarizer::new(&AppConfig::default()).unwrap();
        assert!(!summarizer.stub_mode());

        let summary = summarizer.summarize(TEXT, Style::Brief, None).await.unwrap();
        assert_eq!(summary, BRIEF_STUB);
    }

    #[test]
    fn test_provider_order_from_config() {
        let mut config = AppConfig::default();
        let summarizer = Summarizer::new(&config).unwrap();
        assert_eq!(summarizer.provider_order(), vec!["OpenAI", "Groq"]);

        config.llm.prefer_groq = true;
        let summarizer = Summarizer::new(&config).unwrap();
        assert_eq!(summarizer.provider_order(), vec!["Groq", "OpenAI"]);

        config.llm.prefer_groq = false;
        config.llm.groq.api_key = Some(ApiKey::new("gsk-test"));
        let summarizer = Summarizer::new(&config).unwrap();
        assert_eq!(summarizer.provider_order(), vec!["Groq", "OpenAI"]);
        assert!(summarizer.providers[0].is_available());
        assert!(!summarizer.providers[1].is_available());
    }

    #[test]
    fn test_invalid_provider_timeout_fails_construction() {
        let mut config = AppConfig::default();
        config.llm.openai.api_key = Some(ApiKey::new("sk-test"));
        config.llm.openai.timeout_secs = 0.0;
        assert!(matches!(Summarizer::new(&config), Err(Error::Config(_))));
    }
}
