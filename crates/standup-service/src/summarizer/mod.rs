//! Summarizer implementations and the fallback summary

mod fallback;
mod openai;
mod parse;

use std::sync::Arc;

use async_trait::async_trait;
use standup_common::SummarizerConfig;
use standup_core::{Analysis, Response, Summarizer, SummarizerError};

pub use fallback::{fallback_summary, summary_from_analysis};
pub use openai::{build_prompt, OpenAiSummarizer};
pub use parse::parse_analysis;

/// Summarizer used when no API key is configured; always fails so the
/// completion engine substitutes the fallback summary
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _questions: &[String], _responses: &[Response]) -> Result<Analysis, SummarizerError> {
        Err(SummarizerError::Unavailable)
    }
}

/// Pick the summarizer for a configuration
pub fn summarizer_from_config(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>, SummarizerError> {
    Ok(match OpenAiSummarizer::from_config(config)? {
        Some(openai) => Arc::new(openai),
        None => Arc::new(DisabledSummarizer),
    })
}
