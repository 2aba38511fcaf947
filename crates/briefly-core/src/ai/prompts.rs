use crate::validation::Style;

/// System message sent with every chat request
pub const SYSTEM_PROMPT: &str = "You are a helpful summarization assistant.";

/// Instruction header for a summary style
pub fn style_instruction(style: Style) -> &'static str {
    match style {
        Style::Brief => {
            "Summarize the following text in 2-4 concise sentences, focusing on main points and outcomes."
        }
        Style::Detailed => {
            "Provide a detailed summary of the following text. Explain the main points, context, \
and any implications. Use clear paragraphs and make sure key facts are included."
        }
        Style::Bullets => {
            "Summarize the following text as concise bullet points. Each bullet should be short and focus on one idea."
        }
    }
}

/// Build the user prompt for `text` in the given style
pub fn build_prompt(style: Style, text: &str) -> String {
    let header = style_instruction(style);
    format!("{header}\n\nText to summarize:\n\"\"\"\n{text}\n\"\"\"\n\nSummary:")
}
