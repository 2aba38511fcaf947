use super::{DocumentFormat, FormatExtractor};
use crate::error::ExtractionError;

/// Wide enough that wrapping rarely splits a line
const WRAP_WIDTH: usize = 1000;

/// HTML to plain text
pub struct HtmlExtractor;

impl FormatExtractor for HtmlExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        html2text::from_read(data, WRAP_WIDTH)
            .map(|text| text.trim().to_string())
            .map_err(|e| ExtractionError::parse(DocumentFormat::Html, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text() {
        let html = b"<html><head><title>t</title></head><body><h1>Report</h1><p>Sales rose. Costs fell.</p></body></html>";
        let text = HtmlExtractor.extract(html).unwrap();
        assert!(text.contains("Report"));
        assert!(text.contains("Sales rose. Costs fell."));
        assert!(!text.contains("<p>"));
    }
}
