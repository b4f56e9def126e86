//! Per-session compaction against a [`SessionStore`]

use crate::compress::render_prompt_context;
use crate::compressor::{prepare_compressed_context, Summarizer};
use crate::storage::{SessionStore, StoreError};
use chrono::Utc;
use impostor_core::{CompressorConfig, Message};
use impostor_telemetry::{estimate_tokens, CompactionRecord, CompactionSource};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CompactError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("failed to read session state: {0}")]
    StoreRead(#[source] StoreError),
    /// The summary or the deletion was not committed; the old turns are still stored
    #[error("failed to persist compaction: {0}")]
    StoreWrite(#[source] StoreError),
}

/// Outcome of one [`ContextManager::compact`] call
#[derive(Debug, Clone, Serialize)]
pub struct CompactionReport {
    pub session_id: String,
    /// Summary now persisted for the session, empty if there never was one
    pub summary: String,
    pub recent: Vec<Message>,
    /// Ids folded into the summary and removed from the store
    pub compressed_ids: Vec<i64>,
    pub source: CompactionSource,
}

impl CompactionReport {
    pub fn prompt_context(&self) -> String {
        render_prompt_context(&self.summary, &self.recent)
    }
}

/// Serializes compaction per session over a shared store
///
/// Store calls are synchronous and run on the calling task; only the
/// summarization call yields. With `SqliteStore` they block a runtime worker
/// while the connection mutex is held, so hosts on a shared multi-threaded
/// runtime should drive `compact` from a dedicated current-thread runtime,
/// as the CLI does.
pub struct ContextManager<St, Su> {
    store: Arc<St>,
    summarizer: Su,
    config: CompressorConfig,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    records_path: Option<PathBuf>,
}

impl<St: SessionStore, Su: Summarizer> ContextManager<St, Su> {
    pub fn new(store: Arc<St>, summarizer: Su, config: CompressorConfig) -> Self {
        Self {
            store,
            summarizer,
            config,
            locks: Mutex::new(HashMap::new()),
            records_path: None,
        }
    }

    /// Append a [`CompactionRecord`] line to `path` after every compaction
    pub fn with_records(mut self, path: impl Into<PathBuf>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    pub fn store(&self) -> &Arc<St> {
        &self.store
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    fn session_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Entries only referenced by the map are idle
        locks.retain(|id, lock| id == session_id || Arc::strong_count(lock) > 1);
        locks.entry(session_id.to_string()).or_default().clone()
    }

    /// Fold everything but the recent window into the session summary
    ///
    /// The summary is committed before the folded turns are deleted; if
    /// the write fails nothing is deleted and `StoreWrite` is returned.
    pub async fn compact(&self, session_id: &str) -> Result<CompactionReport, CompactError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let session = self
            .store
            .get_session(session_id)
            .map_err(CompactError::StoreRead)?
            .ok_or_else(|| CompactError::SessionNotFound(session_id.to_string()))?;
        let messages = self
            .store
            .list_uncompressed(session_id)
            .map_err(CompactError::StoreRead)?;
        let existing = self
            .store
            .get_summary(session_id)
            .map_err(CompactError::StoreRead)?
            .map(|s| s.content);

        let context = prepare_compressed_context(
            &self.summarizer,
            &messages,
            &session.stats,
            &session.scenario,
            existing.as_deref(),
            &self.config,
        )
        .await;

        let compressed_ids: Vec<i64> = context.to_compress.iter().map(|m| m.id).collect();
        if !compressed_ids.is_empty() {
            let deleted = self
                .store
                .commit_compaction(session_id, &context.summary, &compressed_ids)
                .map_err(|e| {
                    warn!(session_id, error = %e, "compaction not persisted");
                    CompactError::StoreWrite(e)
                })?;

            info!(
                session_id,
                compressed = compressed_ids.len(),
                deleted,
                kept = context.recent.len(),
                source = %context.source,
                "session compacted"
            );

            let raw: usize = context
                .to_compress
                .iter()
                .map(|m| estimate_tokens(&m.content))
                .sum::<usize>()
                + existing.as_deref().map(estimate_tokens).unwrap_or(0);
            self.record(CompactionRecord {
                session_id: session_id.to_string(),
                timestamp: Utc::now(),
                compressed_messages: compressed_ids.len(),
                kept_messages: context.recent.len(),
                source: context.source,
                raw_tokens: raw,
                summary_tokens: estimate_tokens(&context.summary),
            });
        }

        Ok(CompactionReport {
            session_id: session_id.to_string(),
            summary: context.summary,
            recent: context.recent,
            compressed_ids,
            source: context.source,
        })
    }

    /// Compact, then render the summary and recent turns for the next prompt
    pub async fn prompt_context(&self, session_id: &str) -> Result<String, CompactError> {
        Ok(self.compact(session_id).await?.prompt_context())
    }

    fn record(&self, record: CompactionRecord) {
        let Some(path) = &self.records_path else {
            return;
        };
        if let Err(e) = impostor_telemetry::append_jsonl(path, &record) {
            warn!(path = %path.display(), error = %e, "failed to append compaction record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::SummarizeError;
    use crate::storage::SqliteStore;
    use async_trait::async_trait;
    use impostor_core::{Role, SummarizeOptions};

    struct Echo;

    #[async_trait]
    impl Summarizer for Echo {
        async fn summarize_text(
            &self,
            prompt: &str,
            _options: &SummarizeOptions,
        ) -> Result<String, SummarizeError> {
            Ok(format!("summary of {} chars", prompt.len()))
        }
    }

    fn seeded(n: usize) -> (Arc<SqliteStore>, String) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let session = store.create_session("ship").unwrap();
        for i in 0..n {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store.add_message(&session.id, role, &format!("turn {}", i + 1)).unwrap();
        }
        (store, session.id)
    }

    #[tokio::test]
    async fn test_compact_below_threshold_is_noop() {
        let (store, id) = seeded(3);
        let manager = ContextManager::new(store.clone(), Echo, CompressorConfig::default());

        let report = manager.compact(&id).await.unwrap();
        assert!(report.compressed_ids.is_empty());
        assert_eq!(report.source, CompactionSource::Unchanged);
        assert!(store.get_summary(&id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compact_unknown_session() {
        let (store, _) = seeded(0);
        let manager = ContextManager::new(store, Echo, CompressorConfig::default());
        let err = manager.compact("missing").await.unwrap_err();
        assert!(matches!(err, CompactError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_repeated_compaction_returns_to_baseline() {
        let (store, id) = seeded(5);
        let manager = ContextManager::new(store.clone(), Echo, CompressorConfig::default());

        let first = manager.compact(&id).await.unwrap();
        assert_eq!(first.compressed_ids.len(), 2);
        assert_eq!(store.list_uncompressed(&id).unwrap().len(), 3);

        store.add_message(&id, Role::User, "turn 6").unwrap();
        store.add_message(&id, Role::Assistant, "turn 7").unwrap();
        let second = manager.compact(&id).await.unwrap();
        assert_eq!(second.compressed_ids.len(), 2);
        assert_eq!(second.source, CompactionSource::Model);

        let remaining: Vec<String> = store
            .list_uncompressed(&id)
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(remaining, vec!["turn 5", "turn 6", "turn 7"]);
    }

    #[tokio::test]
    async fn test_records_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compactions.jsonl");
        let (store, id) = seeded(6);
        let manager =
            ContextManager::new(store, Echo, CompressorConfig::default()).with_records(&path);

        manager.compact(&id).await.unwrap();
        manager.compact(&id).await.unwrap();

        let records: Vec<CompactionRecord> = impostor_telemetry::read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].compressed_messages, 3);
        assert_eq!(records[0].kept_messages, 3);
        assert!(records[0].raw_tokens > 0);
    }

    #[test]
    fn test_idle_locks_pruned() {
        let (store, _) = seeded(0);
        let manager = ContextManager::new(store, Echo, CompressorConfig::default());
        let held = manager.session_lock("a");
        drop(manager.session_lock("b"));
        manager.session_lock("c");

        let locks = manager.locks.lock().unwrap();
        assert!(locks.contains_key("a"));
        assert!(!locks.contains_key("b"));
        assert!(locks.contains_key("c"));
        drop(held);
    }
}
