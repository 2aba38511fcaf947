pub mod serve;
pub mod summarize;
