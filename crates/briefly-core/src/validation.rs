//! Request validation
//!
//! Checks run in a fixed order: text, then style, then max_tokens, so the first
//! problem reported is always the same for a given request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Summarization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Brief,
    Detailed,
    Bullets,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Brief, Style::Detailed, Style::Bullets];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Brief => "brief",
            Style::Detailed => "detailed",
            Style::Bullets => "bullets",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = ValidationError;

    /// Exact, case-sensitive match on the three style names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStyle(s.to_string()))
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    /// Trimmed, never empty
    pub text: String,
    pub style: Style,
    /// Positive when present
    pub max_tokens: Option<u32>,
}

/// Validate raw request fields
pub fn validate(
    text: Option<&str>,
    style: Option<&str>,
    max_tokens: Option<i64>,
) -> Result<ValidRequest, ValidationError> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let style = match style {
        Some(s) => s.parse()?,
        None => Style::default(),
    };

    let max_tokens = match max_tokens {
        Some(n) if n <= 0 => return Err(ValidationError::InvalidMaxTokens(n)),
        Some(n) => Some(u32::try_from(n).map_err(|_| ValidationError::InvalidMaxTokens(n))?),
        None => None,
    };

    Ok(ValidRequest {
        text: text.to_string(),
        style,
        max_tokens,
    })
}
