//! Wire types and HTTP plumbing shared by OpenAI-compatible APIs
//!
//! Both Groq and OpenAI speak the same JSON shapes. Failures are classified here,
//! once, into a [`ProviderError`] so callers never look at message text.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ProviderError;
use crate::{Error, Result};

/// Longest slice of an upstream error body kept for logs
const MAX_ERROR_DETAIL: usize = 300;

#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response of both `/chat/completions` and `/completions`
#[derive(Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    /// Trimmed content of the first choice, chat or legacy shape
    pub fn first_content(self) -> std::result::Result<String, ProviderError> {
        let first = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Fatal("returned no choices".to_string()))?;

        let content = first
            .message
            .and_then(|m| m.content)
            .or(first.text)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<serde_json::Value>,
}

/// Structured error fields from a failed response, when the body has them
struct ErrorDetail {
    message: String,
    /// `type` and `code` lowercased, used for classification
    codes: String,
}

fn error_detail(body: &str) -> ErrorDetail {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error);

    match parsed {
        Some(err) => {
            let code = match err.code {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            ErrorDetail {
                message: err.message.unwrap_or_default(),
                codes: format!("{} {}", err.kind.unwrap_or_default(), code).to_lowercase(),
            }
        }
        None => ErrorDetail {
            message: body.chars().take(MAX_ERROR_DETAIL).collect(),
            codes: String::new(),
        },
    }
}

/// Classify a non-success HTTP response
pub(crate) fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let detail = error_detail(body);
    let described = format!("HTTP {}: {}", status.as_u16(), detail.message);

    if status == StatusCode::TOO_MANY_REQUESTS
        || detail.codes.contains("rate_limit")
        || detail.codes.contains("quota")
    {
        return ProviderError::RateLimited(described);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(described),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Transient(described),
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED if !detail.codes.contains("model") => {
            ProviderError::Unsupported(described)
        }
        _ => ProviderError::Fatal(described),
    }
}

/// Classify a transport-level failure
pub(crate) fn classify_transport(err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Transient(err.to_string())
    } else {
        ProviderError::Fatal(format!("request failed: {}", err))
    }
}

/// Authenticated JSON client for one OpenAI-compatible endpoint
pub(crate) struct CompatClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl CompatClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: f64) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                Error::Config(format!("Provider timeout must be positive, got {}", timeout_secs))
            })?;

        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` to `path` under the base URL and decode the JSON answer
    pub async fn post<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ProviderError::Fatal(format!("invalid endpoint '{}': {}", path, e)))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| ProviderError::Fatal(format!("failed to parse response: {}", e)))
    }
}
