use chrono::{DateTime, Utc};
use impostor_core::{GameStats, Message, ParseRoleError, Role, Session, Summary, SUMMARY_ROLE};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error(transparent)]
    Role(#[from] ParseRoleError),
    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persisted sessions, their uncompressed turns and one summary slot each
pub trait SessionStore: Send + Sync {
    fn create_session(&self, scenario: &str) -> Result<Session>;

    fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Returns `None` for unknown sessions
    fn update_stats(&self, session_id: &str, stats: GameStats) -> Result<Option<Session>>;

    /// Removes the session with its turns and summary; false if it did not exist
    fn delete_session(&self, session_id: &str) -> Result<bool>;

    fn add_message(&self, session_id: &str, role: Role, content: &str) -> Result<Message>;

    /// User and assistant turns in creation order
    fn list_uncompressed(&self, session_id: &str) -> Result<Vec<Message>>;

    fn get_summary(&self, session_id: &str) -> Result<Option<Summary>>;

    /// Create or overwrite the session's single summary
    fn put_summary(&self, session_id: &str, content: &str) -> Result<()>;

    /// Delete turns by id; unknown or already deleted ids are ignored
    fn delete_messages(&self, session_id: &str, ids: &[i64]) -> Result<usize>;

    /// Store `summary`, then delete `ids`
    ///
    /// Nothing is deleted unless the summary write succeeded.
    fn commit_compaction(&self, session_id: &str, summary: &str, ids: &[i64]) -> Result<usize> {
        self.put_summary(session_id, summary)?;
        self.delete_messages(session_id, ids)
    }
}

/// SQLite-backed [`SessionStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                scenario TEXT NOT NULL,
                health INTEGER NOT NULL,
                coins INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'summary')),
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_one_summary
                ON messages(session_id) WHERE role = 'summary';
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_exists(conn: &Connection, session_id: &str) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM sessions WHERE id = ?",
                params![session_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn upsert_summary(conn: &Connection, session_id: &str, content: &str) -> Result<()> {
        if !Self::session_exists(conn, session_id)? {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        }
        let now = Utc::now().to_rfc3339();
        let updated = conn.execute(
            "UPDATE messages SET content = ?1, timestamp = ?2
             WHERE session_id = ?3 AND role = ?4",
            params![content, now, session_id, SUMMARY_ROLE],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO messages (session_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
                params![session_id, SUMMARY_ROLE, content, now],
            )?;
        }
        Ok(())
    }

    fn delete_turns(conn: &Connection, session_id: &str, ids: &[i64]) -> Result<usize> {
        let mut stmt = conn.prepare(
            "DELETE FROM messages
             WHERE session_id = ?1 AND id = ?2 AND role IN ('user', 'assistant')",
        )?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![session_id, id])?;
        }
        Ok(deleted)
    }

    fn row_to_session(row: &rusqlite::Row) -> Result<Session> {
        Ok(Session {
            id: row.get(0)?,
            scenario: row.get(1)?,
            stats: GameStats::new(row.get(2)?, row.get(3)?),
            created_at: parse_time(&row.get::<_, String>(4)?)?,
            updated_at: parse_time(&row.get::<_, String>(5)?)?,
        })
    }

    fn row_to_message(row: &rusqlite::Row) -> Result<Message> {
        Ok(Message {
            id: row.get(0)?,
            session_id: row.get(1)?,
            role: row.get::<_, String>(2)?.parse()?,
            content: row.get(3)?,
            timestamp: parse_time(&row.get::<_, String>(4)?)?,
        })
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

impl SessionStore for SqliteStore {
    fn create_session(&self, scenario: &str) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            scenario: scenario.to_string(),
            stats: GameStats::default(),
            created_at: now,
            updated_at: now,
        };
        self.conn().execute(
            "INSERT INTO sessions VALUES (?, ?, ?, ?, ?, ?)",
            params![
                session.id,
                session.scenario,
                session.stats.health,
                session.stats.coins,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        Ok(session)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, scenario, health, coins, created_at, updated_at
             FROM sessions WHERE id = ?",
        )?;
        let mut rows = stmt.query(params![session_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_session(row)?)),
            None => Ok(None),
        }
    }

    fn update_stats(&self, session_id: &str, stats: GameStats) -> Result<Option<Session>> {
        let changed = self.conn().execute(
            "UPDATE sessions SET health = ?1, coins = ?2, updated_at = ?3 WHERE id = ?4",
            params![stats.health, stats.coins, Utc::now().to_rfc3339(), session_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_session(session_id)
    }

    fn delete_session(&self, session_id: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?", params![session_id])?;
        Ok(deleted > 0)
    }

    fn add_message(&self, session_id: &str, role: Role, content: &str) -> Result<Message> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        if !Self::session_exists(&tx, session_id)? {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        }

        let now = Utc::now();
        tx.execute(
            "INSERT INTO messages (session_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
            params![session_id, role.as_str(), content, now.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), session_id],
        )?;
        tx.commit()?;

        Ok(Message {
            id,
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            timestamp: now,
        })
    }

    fn list_uncompressed(&self, session_id: &str) -> Result<Vec<Message>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, timestamp FROM messages
             WHERE session_id = ? AND role IN ('user', 'assistant')
             ORDER BY id",
        )?;
        let mut rows = stmt.query(params![session_id])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    fn get_summary(&self, session_id: &str) -> Result<Option<Summary>> {
        let row = self
            .conn()
            .query_row(
                "SELECT content, timestamp FROM messages WHERE session_id = ? AND role = ?",
                params![session_id, SUMMARY_ROLE],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((content, ts)) => Ok(Some(Summary {
                session_id: session_id.to_string(),
                content,
                updated_at: parse_time(&ts)?,
            })),
            None => Ok(None),
        }
    }

    fn put_summary(&self, session_id: &str, content: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        Self::upsert_summary(&tx, session_id, content)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_messages(&self, session_id: &str, ids: &[i64]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let deleted = Self::delete_turns(&tx, session_id, ids)?;
        tx.commit()?;
        Ok(deleted)
    }

    fn commit_compaction(&self, session_id: &str, summary: &str, ids: &[i64]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        Self::upsert_summary(&tx, session_id, summary)?;
        let deleted = Self::delete_turns(&tx, session_id, ids)?;
        tx.commit()?;
        Ok(deleted)
    }
}
