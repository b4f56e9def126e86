//! Summarization boundary and the compression pipeline built on it

use crate::compress::{build_summary_prompt, fallback_summary};
use crate::window::partition;
use async_trait::async_trait;
use impostor_core::{CompressorConfig, GameStats, Message, SummarizeOptions};
use impostor_telemetry::CompactionSource;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Failures of the summarization call; all are recovered by the local fallback
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("summarization timed out")]
    Timeout,
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
    #[error("malformed summarization response: {0}")]
    Malformed(String),
}

/// Opaque text generation used to produce summaries
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize_text(
        &self,
        prompt: &str,
        options: &SummarizeOptions,
    ) -> Result<String, SummarizeError>;
}

/// Chat-completions client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct HttpSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpSummarizer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Configure from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `IMPOSTOR_SUMMARY_MODEL`
    pub fn from_env() -> Self {
        let mut summarizer = Self::new(std::env::var("OPENAI_API_KEY").ok());
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            summarizer = summarizer.with_base_url(url);
        }
        if let Ok(model) = std::env::var("IMPOSTOR_SUMMARY_MODEL") {
            summarizer = summarizer.with_model(model);
        }
        summarizer
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for HttpSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSummarizer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize_text(
        &self,
        prompt: &str,
        options: &SummarizeOptions,
    ) -> Result<String, SummarizeError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SummarizeError::Unavailable("no API key configured".to_string()))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(options.timeout)
            .json(&serde_json::json!({
                "model": self.model,
                "temperature": options.temperature,
                "max_tokens": options.max_output_tokens,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::Unavailable(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SummarizeError::Timeout
            } else {
                SummarizeError::Malformed(e.to_string())
            }
        })?;
        extract_text(&body)
    }
}

fn request_error(e: reqwest::Error) -> SummarizeError {
    if e.is_timeout() {
        SummarizeError::Timeout
    } else {
        SummarizeError::Unavailable(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body
fn extract_text(body: &serde_json::Value) -> Result<String, SummarizeError> {
    let text = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| SummarizeError::Malformed("missing message content".to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(SummarizeError::Malformed("empty message content".to_string()));
    }
    Ok(text.to_string())
}

/// Summary text together with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summarized {
    pub text: String,
    pub source: CompactionSource,
}

/// Fold `old_messages` into `existing_summary`
///
/// An empty batch returns the existing summary without calling out. Any
/// failure of the call, including exceeding `options.timeout`, yields the
/// deterministic fallback instead of an error.
pub async fn summarize<S: Summarizer + ?Sized>(
    summarizer: &S,
    old_messages: &[Message],
    existing_summary: Option<&str>,
    scenario: &str,
    stats: &GameStats,
    config: &CompressorConfig,
) -> Summarized {
    if old_messages.is_empty() {
        return Summarized {
            text: existing_summary.unwrap_or_default().to_string(),
            source: CompactionSource::Unchanged,
        };
    }

    let existing_summary = existing_summary.filter(|s| !s.trim().is_empty());

    let prompt = build_summary_prompt(old_messages, existing_summary, scenario, stats);
    let options = &config.options;

    let outcome =
        match tokio::time::timeout(options.timeout, summarizer.summarize_text(&prompt, options))
            .await
        {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(Ok(_)) => Err(SummarizeError::Malformed("empty summary".to_string())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SummarizeError::Timeout),
        };

    match outcome {
        Ok(text) => {
            debug!(messages = old_messages.len(), chars = text.len(), "model summary produced");
            Summarized {
                text,
                source: CompactionSource::Model,
            }
        }
        Err(error) => {
            warn!(%error, messages = old_messages.len(), "summarization failed, using local fallback");
            Summarized {
                text: fallback_summary(old_messages, existing_summary, config),
                source: CompactionSource::Fallback,
            }
        }
    }
}

/// Result of windowing and summarizing a transcript
#[derive(Debug, Clone)]
pub struct CompressedContext {
    /// Summary the caller should persist (or keep, when unchanged)
    pub summary: String,
    /// Literal tail of the input, kept verbatim
    pub recent: Vec<Message>,
    /// Turns folded into `summary`; delete these once it is stored
    pub to_compress: Vec<Message>,
    pub source: CompactionSource,
}

pub async fn prepare_compressed_context<S: Summarizer + ?Sized>(
    summarizer: &S,
    uncompressed: &[Message],
    stats: &GameStats,
    scenario: &str,
    existing_summary: Option<&str>,
    config: &CompressorConfig,
) -> CompressedContext {
    let window = partition(uncompressed, config.keep_recent);
    let summarized = summarize(
        summarizer,
        window.old,
        existing_summary,
        scenario,
        stats,
        config,
    )
    .await;

    CompressedContext {
        summary: summarized.text,
        recent: window.recent.to_vec(),
        to_compress: window.old.to_vec(),
        source: summarized.source,
    }
}
