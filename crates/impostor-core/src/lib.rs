//! Core session, message and configuration types for impostor game transcripts

mod config;
mod types;

pub use config::{CompressorConfig, ConfigError, SummarizeOptions};
pub use types::{GameStats, Message, ParseRoleError, Role, Session, Summary, SUMMARY_ROLE};
