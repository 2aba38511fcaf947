//! Text extraction from uploaded documents
//!
//! The format is picked by file extension, then content type, then magic bytes;
//! anything unrecognised is decoded as text. Each format parser is an optional
//! capability: compiled in through a Cargo feature and switchable off at runtime.

#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "html")]
mod html;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "rtf")]
mod rtf;
mod text;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::ExtractionError;
use crate::{Error, Result};

pub use text::decode_text;

/// Document formats the extractor knows how to dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Html,
    Rtf,
    Text,
}

impl DocumentFormat {
    /// Formats that need a parser capability
    pub const PARSED: [DocumentFormat; 4] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Html,
        DocumentFormat::Rtf,
    ];

    /// Name of the parsing library backing this format
    pub fn library(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "lopdf",
            DocumentFormat::Docx => "docx-rs",
            DocumentFormat::Html => "html2text",
            DocumentFormat::Rtf => "rtf",
            DocumentFormat::Text => "utf-8",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Docx),
            "html" | "htm" => Some(DocumentFormat::Html),
            "rtf" => Some(DocumentFormat::Rtf),
            "txt" | "md" | "markdown" => Some(DocumentFormat::Text),
            _ => None,
        }
    }

    fn from_content_type(ct: &str) -> Option<Self> {
        if ct.contains("pdf") {
            Some(DocumentFormat::Pdf)
        } else if ct.contains("word") {
            Some(DocumentFormat::Docx)
        } else if ct.contains("html") {
            Some(DocumentFormat::Html)
        } else if ct.contains("rtf") {
            Some(DocumentFormat::Rtf)
        } else if ct.starts_with("text/") {
            Some(DocumentFormat::Text)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Html => "HTML",
            DocumentFormat::Rtf => "RTF",
            DocumentFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Guess the format of an upload. `None` means "decode as text and hope".
pub fn detect_format(
    data: &[u8],
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Option<DocumentFormat> {
    let by_extension = filename
        .and_then(|name| name.rsplit_once('.'))
        .and_then(|(_, ext)| DocumentFormat::from_extension(&ext.to_lowercase()));
    if by_extension.is_some() {
        return by_extension;
    }

    let by_content_type = content_type
        .map(str::to_lowercase)
        .and_then(|ct| DocumentFormat::from_content_type(&ct));
    if by_content_type.is_some() {
        return by_content_type;
    }

    if data.len() > 4 && data.starts_with(b"%PDF") {
        return Some(DocumentFormat::Pdf);
    }

    None
}

/// A parser for one document format
pub trait FormatExtractor: Send + Sync {
    /// Extract plain text, skipping sub-units (pages, paragraphs) that fail
    fn extract(&self, data: &[u8]) -> std::result::Result<String, ExtractionError>;
}

/// Dispatches uploads to the parser for their format
pub struct TextExtractor {
    handlers: HashMap<DocumentFormat, Option<Box<dyn FormatExtractor>>>,
    max_upload_bytes: usize,
}

impl TextExtractor {
    /// Create an extractor with every compiled-in parser, minus the ones disabled in config
    pub fn new(config: &ExtractConfig) -> Self {
        let mut handlers: HashMap<DocumentFormat, Option<Box<dyn FormatExtractor>>> =
            DocumentFormat::PARSED.iter().map(|f| (*f, None)).collect();

        #[cfg(feature = "pdf")]
        handlers.insert(DocumentFormat::Pdf, Some(Box::new(pdf::PdfExtractor)));
        #[cfg(feature = "docx")]
        handlers.insert(DocumentFormat::Docx, Some(Box::new(docx::DocxExtractor)));
        #[cfg(feature = "html")]
        handlers.insert(DocumentFormat::Html, Some(Box::new(html::HtmlExtractor)));
        #[cfg(feature = "rtf")]
        handlers.insert(DocumentFormat::Rtf, Some(Box::new(rtf::RtfExtractor)));

        let mut extractor = Self {
            handlers,
            max_upload_bytes: config.max_upload_bytes,
        };
        for format in &config.disabled_formats {
            extractor.disable(*format);
        }
        extractor
    }

    /// Make a format unavailable. Plain text cannot be disabled.
    pub fn disable(&mut self, format: DocumentFormat) {
        if format != DocumentFormat::Text {
            self.handlers.insert(format, None);
        }
    }

    /// Whether a parser is available for `format`
    pub fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Text
            || self.handlers.get(&format).map_or(false, Option::is_some)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Extract trimmed plain text from an uploaded file
    pub fn extract(
        &self,
        data: &[u8],
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<String> {
        if data.len() > self.max_upload_bytes {
            return Err(Error::SizeLimit {
                size: data.len(),
                limit: self.max_upload_bytes,
            });
        }

        let format = detect_format(data, filename, content_type);
        debug!(
            "Extracting {} bytes (filename={:?}, content_type={:?}) as {}",
            data.len(),
            filename,
            content_type,
            format.map_or_else(|| "fallback text".to_string(), |f| f.to_string())
        );

        let text = match format {
            None | Some(DocumentFormat::Text) => decode_text(data),
            Some(format) => match self.handlers.get(&format) {
                Some(Some(handler)) => handler.extract(data)?,
                _ => {
                    return Err(ExtractionError::MissingCapability {
                        format,
                        library: format.library(),
                    }
                    .into())
                }
            },
        };

        Ok(text.trim().to_string())
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}
