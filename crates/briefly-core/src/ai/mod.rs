pub mod prompts;
pub mod providers;
pub mod stub;
mod summarizer;

pub use providers::AiProvider;
pub use stub::stub_summary;
pub use summarizer::{ProviderSlot, Summarizer};
