//! OpenAI chat-completions summarizer.
//!
//! Sends the questions and every participant's answers in one prompt and
//! parses the sectioned answer with [`parse_analysis`](super::parse_analysis).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use standup_common::SummarizerConfig;
use standup_core::{Analysis, Response, Summarizer, SummarizerError};

use super::parse::parse_analysis;
use crate::services::messages::mention;

const API_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You are an AI assistant that analyzes team standup responses and \
creates concise, helpful summaries. When you see user mentions like <@U123>, preserve them in \
your response. You can understand and analyze responses in any language - just provide your \
analysis in English using the requested format.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the analysis prompt
pub fn build_prompt(questions: &[String], responses: &[Response]) -> String {
    let numbered: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}", i + 1))
        .collect();
    let answers: Vec<String> = responses
        .iter()
        .map(|r| format!("{}:\n{}", mention(&r.user_id), r.answers.join("\n")))
        .collect();

    format!(
        "Please analyze the following standup responses and provide a structured summary. \
The responses may be in any language - please analyze them accurately and provide your response in English.

STANDUP QUESTIONS:
{}

TEAM RESPONSES:
{}

Please provide your analysis in the following format:

**SUMMARY:**
[2-3 sentences summarizing the key points from all responses]

**ACHIEVEMENTS:**
[List 2-3 specific accomplishments mentioned by team members]

**BLOCKERS:**
[List any specific blockers, challenges, or issues mentioned]

**NEXT STEPS:**
[Key tasks or priorities mentioned for today/upcoming work]

**TEAM MOOD:**
[One word: positive, neutral, or negative, with brief explanation]

Keep each section concise and focus on actionable insights. If no items are found for a category, write \"None mentioned\".",
        numbered.join("\n"),
        answers.join("\n\n---\n\n"),
    )
}

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiSummarizer {
    /// Creates a summarizer with the default endpoint and sampling settings
    pub fn new(api_key: &str, model: impl Into<String>, timeout: Duration) -> Result<Self, SummarizerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| SummarizerError::Request(format!("invalid API key header value: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: 800,
            temperature: 0.3,
            timeout,
        })
    }

    /// Creates a summarizer from configuration; `None` when no API key is set
    pub fn from_config(config: &SummarizerConfig) -> Result<Option<Self>, SummarizerError> {
        let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let summarizer = Self::new(api_key, config.model.clone(), Duration::from_secs(config.timeout_secs))?
            .with_base_url(config.base_url.clone())
            .with_sampling(config.max_tokens, config.temperature);
        Ok(Some(summarizer))
    }

    /// Overrides the base URL (Azure/self-hosted gateways, wiremock)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip_all, fields(model = %self.model, responses = responses.len()))]
    async fn summarize(&self, questions: &[String], responses: &[Response]) -> Result<Analysis, SummarizerError> {
        let prompt = build_prompt(questions, responses);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizerError::Timeout(self.timeout.as_secs())
                } else {
                    SummarizerError::Request(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        debug!(status = %status, "completion response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "summarizer returned an error status");
            return Err(SummarizerError::Request(format!("API returned {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::InvalidResponse(format!("failed to parse API response: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SummarizerError::InvalidResponse("empty completion".to_string()))?;

        Ok(parse_analysis(&content))
    }
}
