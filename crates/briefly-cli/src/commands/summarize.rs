use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use briefly_core::{validate, AppConfig, Summarizer, TextExtractor};

pub async fn run(
    config: &AppConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    style: &str,
    max_tokens: Option<i64>,
) -> Result<()> {
    let text = match (text, file) {
        (_, Some(path)) => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path.file_name().and_then(|name| name.to_str());
            TextExtractor::new(&config.extract).extract(&data, filename, None)?
        }
        (Some(text), None) => text,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
    };

    tracing::debug!("Summarizing {} chars of input", text.len());

    let request = validate(Some(&text), Some(style), max_tokens)?;
    let summarizer = Summarizer::new(config)?;

    let summary = summarizer
        .summarize(&request.text, request.style, request.max_tokens)
        .await?;

    println!("{}", summary);

    Ok(())
}
