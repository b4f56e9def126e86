//! Configuration for transcript compression

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Options passed through to the summarization call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,

    /// Hard bound on a single summarization call
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl SummarizeOptions {
    pub fn new() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 200,
            timeout: Duration::from_secs(60),
        }
    }
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Compressor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Number of trailing turns kept verbatim
    pub keep_recent: usize,

    /// Max characters of each old turn kept by the local fallback
    pub message_preview_chars: usize,

    /// Max characters of the prior summary kept by the local fallback
    pub summary_preview_chars: usize,

    /// Joins fallback parts
    pub separator: String,

    pub options: SummarizeOptions,
}

impl CompressorConfig {
    pub fn new() -> Self {
        Self {
            keep_recent: 3,
            message_preview_chars: 120,
            summary_preview_chars: 300,
            separator: " | ".to_string(),
            options: SummarizeOptions::new(),
        }
    }

    /// Load from a JSON file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while reading a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("timeout must be a non-negative number"));
        }
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
