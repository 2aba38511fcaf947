mod compat;
mod groq;
mod openai;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;

use crate::error::ProviderError;

/// Trait for LLM providers
///
/// Implementations classify every failure into a [`ProviderError`]; the
/// summarizer decides what to do with each class.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Human-readable provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Run one completion for `prompt`, trying the provider's calling conventions in order
    async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroqConfig, OpenAiConfig};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn openai(base_url: String, timeout_secs: f64) -> OpenAiProvider {
        let config = OpenAiConfig {
            base_url,
            timeout_secs,
            ..OpenAiConfig::default()
        };
        OpenAiProvider::new("sk-test", &config, 0.2).unwrap()
    }

    fn groq(base_url: String) -> GroqProvider {
        let config = GroqConfig {
            base_url,
            ..GroqConfig::default()
        };
        GroqProvider::new("gsk-test", &config, 0.2).unwrap()
    }

    #[tokio::test]
    async fn test_chat_request_shape() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let content = format!(
                    "{}|{}|{}|{}",
                    auth, body["model"], body["max_tokens"], body["messages"][0]["role"]
                );
                Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
            }),
        );
        let provider = openai(spawn_mock(router).await, 5.0);

        let content = provider.complete("Summarize this", Some(64)).await.unwrap();
        assert_eq!(content, "Bearer sk-test|\"gpt-4o-mini\"|64|\"system\"");
    }

    #[tokio::test]
    async fn test_rate_limit_response_is_classified() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}})),
                )
            }),
        );
        let provider = groq(spawn_mock(router).await);

        let err = provider.complete("prompt", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_openai_falls_back_to_legacy_completions() {
        let router = Router::new().route(
            "/v1/completions",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                let text = if prompt.starts_with("You are a helpful summarization assistant.") {
                    "legacy ok"
                } else {
                    "missing system prompt"
                };
                Json(json!({"choices": [{"text": text}]}))
            }),
        );
        let provider = openai(spawn_mock(router).await, 5.0);

        assert_eq!(provider.complete("prompt", None).await.unwrap(), "legacy ok");
    }

    #[tokio::test]
    async fn test_no_endpoint_at_all_is_fatal() {
        let provider = openai(spawn_mock(Router::new()).await, 5.0);
        let err = provider.complete("prompt", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Fatal(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": []}))
            }),
        );
        let provider = openai(spawn_mock(router).await, 0.2);

        let err = provider.complete("prompt", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transient(_)));
        assert!(err.is_rate_or_quota());
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_recoverable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error", "code": "invalid_api_key"}})),
                )
            }),
        );
        let provider = groq(spawn_mock(router).await);

        let err = provider.complete("prompt", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized(_)));
        assert!(!err.is_rate_or_quota());
    }
}
