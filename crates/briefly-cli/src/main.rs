use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use briefly_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "briefly")]
#[command(author, version, about = "Summarize text and documents with LLM providers")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "BRIEFLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Address to bind, overrides BACKEND_HOST
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides BACKEND_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Summarize text or a document once and print the result
    Summarize {
        /// Summary style: brief, detailed or bullets
        #[arg(short, long, default_value = "brief")]
        style: String,
        /// Upper bound on generated tokens
        #[arg(short = 'm', long, allow_negative_numbers = true)]
        max_tokens: Option<i64>,
        /// Document to extract text from
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Text to summarize (read from stdin when neither this nor --file is given)
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so it can also provide BRIEFLY_CONFIG
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Some(Commands::Serve { host, port }) => commands::serve::run(config, host, port).await,
        None => commands::serve::run(config, None, None).await,
        Some(Commands::Summarize {
            style,
            max_tokens,
            file,
            text,
        }) => commands::summarize::run(&config, text, file, &style, max_tokens).await,
    }
}
