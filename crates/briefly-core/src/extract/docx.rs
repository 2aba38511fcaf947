use serde_json::Value;
use tracing::debug;

use super::{DocumentFormat, FormatExtractor};
use crate::error::ExtractionError;

/// Word (.docx) text extraction
///
/// docx-rs exposes the parsed document as JSON; each top-level child (paragraph,
/// table) becomes one line, and children with no text are skipped.
pub struct DocxExtractor;

impl FormatExtractor for DocxExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| ExtractionError::parse(DocumentFormat::Docx, e.to_string()))?;

        let json: Value = serde_json::from_str(&docx.json())
            .map_err(|e| ExtractionError::parse(DocumentFormat::Docx, e.to_string()))?;

        let children = json
            .get("document")
            .and_then(|d| d.get("children"))
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractionError::parse(DocumentFormat::Docx, "document body not found"))?;

        let mut lines = Vec::new();
        for child in children {
            let mut line = String::new();
            collect_text(child, &mut line);
            if line.trim().is_empty() {
                continue;
            }
            lines.push(line);
        }

        debug!("Extracted {} DOCX blocks out of {}", lines.len(), children.len());
        Ok(lines.join("\n").trim().to_string())
    }
}

/// Append every `{"type": "text", "data": {"text": ...}}` node under `value`
fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("text") {
                if let Some(text) = map
                    .get("data")
                    .and_then(|d| d.get("text"))
                    .and_then(Value::as_str)
                {
                    out.push_str(text);
                }
                return;
            }
            for v in map.values() {
                collect_text(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_text(v, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            let mut p = Paragraph::new();
            if !text.is_empty() {
                p = p.add_run(Run::new().add_text(*text));
            }
            docx = docx.add_paragraph(p);
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let data = build_docx(&["First paragraph.", "", "Second paragraph."]);
        let text = DocxExtractor.extract(&data).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = DocxExtractor.extract(b"not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { format: DocumentFormat::Docx, .. }));
    }

    #[test]
    fn test_collect_text_concatenates_runs() {
        let value = serde_json::json!({
            "type": "paragraph",
            "data": {"children": [
                {"type": "run", "data": {"children": [{"type": "text", "data": {"text": "Hel"}}]}},
                {"type": "run", "data": {"children": [{"type": "text", "data": {"text": "lo"}}]}}
            ]}
        });
        let mut out = String::new();
        collect_text(&value, &mut out);
        assert_eq!(out, "Hello");
    }
}
