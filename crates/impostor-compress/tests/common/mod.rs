#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use impostor_compress::{SessionStore, SqliteStore, StoreError, SummarizeError, Summarizer};
use impostor_core::{GameStats, Message, Role, Session, Summary, SummarizeOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Replies with fixed text and keeps every prompt it was given
pub struct Scripted {
    reply: String,
    delay: Duration,
    pub prompts: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(reply: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(reply)
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Summarizer for Scripted {
    async fn summarize_text(
        &self,
        prompt: &str,
        _options: &SummarizeOptions,
    ) -> Result<String, SummarizeError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }
}

/// Always fails with the given error
pub struct Failing(pub SummarizeError);

#[async_trait]
impl Summarizer for Failing {
    async fn summarize_text(
        &self,
        _prompt: &str,
        _options: &SummarizeOptions,
    ) -> Result<String, SummarizeError> {
        Err(self.0.clone())
    }
}

/// Never answers within any reasonable timeout
pub struct Hanging;

#[async_trait]
impl Summarizer for Hanging {
    async fn summarize_text(
        &self,
        _prompt: &str,
        _options: &SummarizeOptions,
    ) -> Result<String, SummarizeError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("never".to_string())
    }
}

/// SQLite store whose summary writes always fail
pub struct BrokenSummaryStore {
    pub inner: SqliteStore,
    pub delete_calls: AtomicUsize,
}

impl BrokenSummaryStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

impl SessionStore for BrokenSummaryStore {
    fn create_session(&self, scenario: &str) -> Result<Session, StoreError> {
        self.inner.create_session(scenario)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        self.inner.get_session(session_id)
    }

    fn update_stats(
        &self,
        session_id: &str,
        stats: GameStats,
    ) -> Result<Option<Session>, StoreError> {
        self.inner.update_stats(session_id, stats)
    }

    fn delete_session(&self, session_id: &str) -> Result<bool, StoreError> {
        self.inner.delete_session(session_id)
    }

    fn add_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<Message, StoreError> {
        self.inner.add_message(session_id, role, content)
    }

    fn list_uncompressed(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        self.inner.list_uncompressed(session_id)
    }

    fn get_summary(&self, session_id: &str) -> Result<Option<Summary>, StoreError> {
        self.inner.get_summary(session_id)
    }

    fn put_summary(&self, _session_id: &str, _content: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }

    fn delete_messages(&self, session_id: &str, ids: &[i64]) -> Result<usize, StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_messages(session_id, ids)
    }
}

/// Unpersisted transcript with ids 1..=n, alternating user/assistant
pub fn transcript(n: i64) -> Vec<Message> {
    (1..=n)
        .map(|id| Message {
            id,
            session_id: "game".to_string(),
            role: if id % 2 == 1 { Role::User } else { Role::Assistant },
            content: format!("message {}", id),
            timestamp: Utc::now(),
        })
        .collect()
}

/// Append `n` alternating turns to a stored session
pub fn seed<S: SessionStore>(store: &S, session_id: &str, n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store
                .add_message(session_id, role, &format!("message {}", i + 1))
                .unwrap()
        })
        .collect()
}
