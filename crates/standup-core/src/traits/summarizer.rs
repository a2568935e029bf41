//! Summarizer port - best-effort analysis of a standup's answers

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{Mood, Response};

/// Structured analysis of a standup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analysis {
    pub summary: String,
    pub achievements: Vec<String>,
    pub blockers: Vec<String>,
    pub next_steps: Vec<String>,
    pub mood: Mood,
}

/// Summarizer failures; callers substitute a fallback and carry on
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Summarizer is not configured")]
    Unavailable,

    #[error("Summarizer timed out after {0}s")]
    Timeout(u64),

    #[error("Summarizer request failed: {0}")]
    Request(String),

    #[error("Summarizer returned an unusable answer: {0}")]
    InvalidResponse(String),
}

/// Text analysis collaborator
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the answers to the given questions
    async fn summarize(&self, questions: &[String], responses: &[Response]) -> Result<Analysis, SummarizerError>;
}
