use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::extract::DocumentFormat;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// What to do when a provider reports throttling, quota exhaustion or a timeout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Return the offline stub right away without trying the remaining providers
    #[default]
    Stub,
    /// Move on to the next configured provider, stubbing only when all are exhausted
    NextProvider,
}

impl std::str::FromStr for RateLimitPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "next_provider" | "next-provider" | "next" => Ok(Self::NextProvider),
            other => Err(crate::Error::Config(format!(
                "Unknown rate limit policy '{}' (expected 'stub' or 'next_provider')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Never call a provider, always answer with the offline stub
    #[serde(default)]
    pub stub_mode: bool,
    /// Try Groq before OpenAI even without a Groq key
    #[serde(default)]
    pub prefer_groq: bool,
    /// Sampling temperature sent to every provider
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub rate_limit_policy: RateLimitPolicy,
    #[serde(default)]
    pub groq: GroqConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            stub_mode: false,
            prefer_groq: false,
            temperature: default_temperature(),
            rate_limit_policy: RateLimitPolicy::default(),
            groq: GroqConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Groq goes first when explicitly preferred or when it has a credential
    pub fn groq_first(&self) -> bool {
        self.prefer_groq || self.groq.api_key.is_some()
    }
}

/// API credential that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Groq API key
    #[serde(default)]
    pub api_key: Option<ApiKey>,
    /// Groq model name
    #[serde(default = "default_groq_model")]
    pub model: String,
    /// OpenAI-compatible base URL
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_groq_timeout")]
    pub timeout_secs: f64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_groq_model(),
            base_url: default_groq_base_url(),
            timeout_secs: default_groq_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// OpenAI API key
    #[serde(default)]
    pub api_key: Option<ApiKey>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// API base URL, override for proxies and compatible servers
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            timeout_secs: default_openai_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Formats to refuse even when their parser is compiled in
    #[serde(default)]
    pub disabled_formats: Vec<DocumentFormat>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            disabled_formats: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_temperature() -> f32 {
    0.2
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_timeout() -> f64 {
    10.0
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_timeout() -> f64 {
    30.0
}

fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> crate::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| crate::Error::Config(format!("Invalid value for {}: '{}'", key, value)))
}

/// Treat empty strings as unset so `FOO=` in a .env file clears nothing
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl AppConfig {
    /// Load configuration from the default file (if any), then apply process environment
    pub fn load() -> crate::Result<Self> {
        let path = std::env::var("BRIEFLY_CONFIG")
            .ok()
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);
        Self::load_from(&path)
    }

    /// Load configuration from `path` (defaults when missing), then apply process environment
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("briefly")
            .join("config.toml")
    }

    /// Override settings from environment-style variables.
    ///
    /// `lookup` is usually `std::env::var`, but tests hand in a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_empty);

        if let Some(v) = get("USE_STUB") {
            self.llm.stub_mode = parse_flag(&v);
        }
        if let Some(v) = get("USE_GROQ") {
            self.llm.prefer_groq = parse_flag(&v);
        }
        if let Some(v) = get("LLM_RATE_LIMIT_POLICY") {
            self.llm.rate_limit_policy = v.parse()?;
        }
        if let Some(v) = get("LLM_TEMPERATURE") {
            self.llm.temperature = parse_env("LLM_TEMPERATURE", &v)?;
        }

        if let Some(v) = get("GROQ_API_KEY") {
            self.llm.groq.api_key = Some(ApiKey::new(v));
        }
        if let Some(v) = get("GROQ_MODEL") {
            self.llm.groq.model = v;
        }
        if let Some(v) = get("GROQ_API_BASE") {
            self.llm.groq.base_url = v;
        }
        if let Some(v) = get("GROQ_TIMEOUT_SEC") {
            self.llm.groq.timeout_secs = parse_env("GROQ_TIMEOUT_SEC", &v)?;
        }

        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm.openai.api_key = Some(ApiKey::new(v));
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.llm.openai.model = v;
        }
        if let Some(v) = get("OPENAI_API_BASE") {
            self.llm.openai.base_url = v;
        }
        if let Some(v) = get("OPENAI_TIMEOUT_SEC") {
            self.llm.openai.timeout_secs = parse_env("OPENAI_TIMEOUT_SEC", &v)?;
        }

        if let Some(v) = get("MAX_UPLOAD_BYTES") {
            self.extract.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", &v)?;
        }

        if let Some(v) = get("FRONTEND_ALLOW_ORIGINS") {
            let origins: Vec<String> = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if !origins.is_empty() {
                self.server.allowed_origins = origins;
            }
        }
        if let Some(v) = get("BACKEND_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("BACKEND_PORT") {
            self.server.port = parse_env("BACKEND_PORT", &v)?;
        }

        if let Some(v) = get("LOG_LEVEL") {
            self.general.log_level = v;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.llm.stub_mode);
        assert_eq!(config.extract.max_upload_bytes, 2_097_152);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.openai.model, "gpt-4o-mini");
        assert_eq!(config.llm.rate_limit_policy, RateLimitPolicy::Stub);
        assert!(!config.llm.groq_first());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("USE_STUB", "Yes"),
                ("GROQ_API_KEY", "gsk-test"),
                ("GROQ_TIMEOUT_SEC", "2.5"),
                ("MAX_UPLOAD_BYTES", "1024"),
                ("FRONTEND_ALLOW_ORIGINS", "http://a.test, ,http://b.test"),
                ("BACKEND_PORT", "9000"),
                ("LLM_RATE_LIMIT_POLICY", "next_provider"),
            ]))
            .unwrap();

        assert!(config.llm.stub_mode);
        assert_eq!(config.llm.groq.api_key.as_ref().map(ApiKey::expose), Some("gsk-test"));
        assert_eq!(config.llm.groq.timeout_secs, 2.5);
        assert_eq!(config.extract.max_upload_bytes, 1024);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.rate_limit_policy, RateLimitPolicy::NextProvider);
        assert!(config.llm.groq_first());
    }

    #[test]
    fn test_flag_parsing() {
        for (value, expected) in [("1", true), ("TRUE", true), ("yes", true), ("0", false), ("no", false)] {
            let mut config = AppConfig::default();
            config.apply_env(env(&[("USE_GROQ", value)])).unwrap();
            assert_eq!(config.llm.prefer_groq, expected, "USE_GROQ={}", value);
        }
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "  ")])).unwrap();
        assert!(config.llm.openai.api_key.is_none());
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("BACKEND_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_toml_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [llm]
            stub_mode = true
            rate_limit_policy = "next_provider"

            [llm.openai]
            model = "gpt-4o"

            [extract]
            disabled_formats = ["pdf"]
            "#,
        )
        .unwrap();

        assert!(config.llm.stub_mode);
        assert_eq!(config.llm.openai.model, "gpt-4o");
        assert_eq!(config.llm.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(config.extract.disabled_formats, vec![DocumentFormat::Pdf]);
        assert_eq!(config.extract.max_upload_bytes, 2_097_152);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.llm.openai.api_key = Some(ApiKey::new("sk-secret"));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
