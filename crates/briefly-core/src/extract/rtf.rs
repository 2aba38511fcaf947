use super::{DocumentFormat, FormatExtractor};
use crate::error::ExtractionError;

/// Destinations whose contents are metadata, not document text
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "headerl",
    "headerr",
    "footer",
    "footerl",
    "footerr",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
    "xmlnstbl",
    "object",
    "fldinst",
    "filetbl",
    "revtbl",
];

/// Rich Text Format to plain text
pub struct RtfExtractor;

impl FormatExtractor for RtfExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let source = String::from_utf8_lossy(data);
        if !source.trim_start().starts_with("{\\rtf") {
            return Err(ExtractionError::parse(
                DocumentFormat::Rtf,
                "missing {\\rtf header",
            ));
        }
        Ok(rtf_to_text(&source).trim().to_string())
    }
}

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    /// Number of fallback characters following a \uN escape
    uc: usize,
}

/// Strip RTF control words and groups, keeping the visible text
fn rtf_to_text(source: &str) -> String {
    let mut out = String::new();
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState { skip: false, uc: 1 };
    let mut pending_fallback = 0usize;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                stack.push(state);
                pending_fallback = 0;
            }
            '}' => {
                state = stack.pop().unwrap_or(state);
                pending_fallback = 0;
            }
            '\\' => {
                let Some(&next) = chars.peek() else { break };

                if next.is_ascii_alphabetic() {
                    let mut word = String::new();
                    while let Some(&ch) = chars.peek() {
                        if ch.is_ascii_alphabetic() {
                            word.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }

                    let mut param = String::new();
                    if chars.peek() == Some(&'-') {
                        param.push('-');
                        chars.next();
                    }
                    while let Some(&ch) = chars.peek() {
                        if ch.is_ascii_digit() {
                            param.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let param: Option<i32> = param.parse().ok();

                    // A single space delimits the control word and is not text
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }

                    if SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                        state.skip = true;
                        continue;
                    }
                    if state.skip {
                        continue;
                    }

                    match word.as_str() {
                        "par" | "line" | "sect" | "page" => out.push('\n'),
                        "tab" => out.push('\t'),
                        "emdash" => out.push('\u{2014}'),
                        "endash" => out.push('\u{2013}'),
                        "bullet" => out.push('\u{2022}'),
                        "lquote" | "rquote" => out.push('\''),
                        "ldblquote" | "rdblquote" => out.push('"'),
                        "uc" => {
                            state.uc = param.unwrap_or(1).max(0) as usize;
                        }
                        "u" => {
                            if let Some(code) = param {
                                let code = if code < 0 { code + 65536 } else { code };
                                if let Some(ch) = char::from_u32(code as u32) {
                                    out.push(ch);
                                }
                                pending_fallback = state.uc;
                            }
                        }
                        _ => {}
                    }
                } else {
                    chars.next();
                    match next {
                        '\'' => {
                            let hex: String = chars.by_ref().take(2).collect();
                            if state.skip {
                                continue;
                            }
                            if pending_fallback > 0 {
                                pending_fallback -= 1;
                                continue;
                            }
                            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                                out.push(byte as char);
                            }
                        }
                        '*' => state.skip = true,
                        '\\' | '{' | '}' if !state.skip => out.push(next),
                        '~' if !state.skip => out.push(' '),
                        '_' if !state.skip => out.push('-'),
                        '\n' | '\r' if !state.skip => out.push('\n'),
                        _ => {}
                    }
                }
            }
            '\r' | '\n' => {}
            _ => {
                if state.skip {
                    continue;
                }
                if pending_fallback > 0 {
                    pending_fallback -= 1;
                    continue;
                }
                out.push(c);
            }
        }
    }

    out
}
