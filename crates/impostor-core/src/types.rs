//! Core types for game sessions and their transcripts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Persisted role text of the rolling summary row
pub const SUMMARY_ROLE: &str = "summary";

/// Speaker of a conversational turn
///
/// The rolling summary is not a turn and has no variant here; it lives
/// in [`Summary`] so uncompressed transcripts can never contain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human player asking questions
    User,
    /// The model-driven character answering
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Speaker label used when a transcript is rendered into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Player",
            Role::Assistant => "Narrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message role: {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Small mutable game state carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub health: i64,
    pub coins: i64,
}

impl GameStats {
    pub fn new(health: i64, coins: i64) -> Self {
        Self { health, coins }
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            health: 100,
            coins: 0,
        }
    }
}

impl fmt::Display for GameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "health={}, coins={}", self.health, self.coins)
    }
}

/// One game conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub scenario: String,
    pub stats: GameStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user or assistant turn that has not been folded into the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The single rolling summary slot of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub session_id: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!(
            SUMMARY_ROLE.parse::<Role>(),
            Err(ParseRoleError("summary".to_string()))
        );
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.label(), "Player");
        assert_eq!(Role::Assistant.label(), "Narrator");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
        assert!(serde_json::from_str::<Role>("\"summary\"").is_err());
    }

    #[test]
    fn test_stats_defaults_and_display() {
        let stats = GameStats::default();
        assert_eq!(stats, GameStats::new(100, 0));
        assert_eq!(GameStats::new(5, 100).to_string(), "health=5, coins=100");
    }
}
