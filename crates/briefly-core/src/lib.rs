pub mod ai;
pub mod config;
pub mod error;
pub mod extract;
pub mod validation;

pub use ai::Summarizer;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use extract::TextExtractor;
pub use validation::{validate, Style, ValidRequest};
