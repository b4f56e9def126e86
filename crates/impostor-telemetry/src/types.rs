//! Compaction record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which path produced a session's summary text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactionSource {
    /// Nothing to compress; the prior summary was kept as is
    Unchanged,
    /// The summarization call returned usable text
    Model,
    /// The summarization call failed and local truncation was used
    Fallback,
}

impl fmt::Display for CompactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompactionSource::Unchanged => "unchanged",
            CompactionSource::Model => "model",
            CompactionSource::Fallback => "fallback",
        })
    }
}

/// One committed compaction of a session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionRecord {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub compressed_messages: usize,
    pub kept_messages: usize,
    pub source: CompactionSource,
    /// Estimated tokens of the folded turns plus the prior summary
    pub raw_tokens: usize,
    pub summary_tokens: usize,
}

impl CompactionRecord {
    /// Tokens saved relative to the input, 0.0 when nothing was folded
    pub fn savings_ratio(&self) -> f64 {
        if self.raw_tokens == 0 {
            return 0.0;
        }
        1.0 - (self.summary_tokens as f64 / self.raw_tokens as f64)
    }
}
