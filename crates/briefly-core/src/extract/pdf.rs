use lopdf::Document;
use tracing::debug;

use super::{DocumentFormat, FormatExtractor};
use crate::error::ExtractionError;

/// PDF text extraction, page by page
pub struct PdfExtractor;

impl FormatExtractor for PdfExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(data)
            .map_err(|e| ExtractionError::parse(DocumentFormat::Pdf, e.to_string()))?;

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut texts = Vec::with_capacity(pages.len());

        for page in &pages {
            match doc.extract_text(&[*page]) {
                Ok(text) => texts.push(text),
                Err(e) => debug!("Skipping unreadable PDF page {}: {}", page, e),
            }
        }

        debug!("Extracted text from {}/{} PDF pages", texts.len(), pages.len());
        Ok(texts.join("\n").trim().to_string())
    }
}
