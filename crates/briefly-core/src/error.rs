use thiserror::Error;

use crate::extract::DocumentFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Uploaded file is too large ({size} bytes). Max {limit} bytes allowed.")]
    SizeLimit { size: usize, limit: usize },

    #[error("{provider} provider error: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejections produced by the request validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No text provided. Provide 'text' or upload a file with readable text.")]
    EmptyText,

    #[error("Invalid style '{0}'. Allowed: brief | detailed | bullets")]
    InvalidStyle(String),

    #[error("max_tokens must be a positive integer (got {0})")]
    InvalidMaxTokens(i64),
}

/// Failures turning uploaded bytes into text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{format} support is not available: the '{library}' parser is not enabled in this build")]
    MissingCapability {
        format: DocumentFormat,
        library: &'static str,
    },

    #[error("Failed to parse {format}: {reason}")]
    Parse {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExtractionError {
    pub fn parse(format: DocumentFormat, reason: impl Into<String>) -> Self {
        Self::Parse {
            format,
            reason: reason.into(),
        }
    }
}

/// Classified outcome of a failed provider call.
///
/// Adapters compute this from the HTTP status, the structured error code in the
/// response body, or the transport error. Callers never inspect messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Throttled or out of quota.
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request timed out before the provider answered.
    #[error("timed out: {0}")]
    Transient(String),

    #[error("{0}")]
    Fatal(String),

    /// The calling convention is not served at this endpoint.
    #[error("unsupported endpoint: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Rate, quota and timeout conditions are recovered locally and never surfaced.
    pub fn is_rate_or_quota(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Transient(_))
    }
}
