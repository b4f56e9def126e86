//! Path resolution for the local data directory

use std::path::PathBuf;

/// Overrides the data directory when set
pub const HOME_ENV: &str = "IMPOSTOR_HOME";

/// Resolves standard paths under the data directory
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve from `$IMPOSTOR_HOME`, else `~/.impostor`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(dir));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::at(home.join(".impostor")))
    }

    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// SQLite database holding sessions and messages
    pub fn database(&self) -> PathBuf {
        self.data_dir.join("sessions.db")
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Append-only compaction history
    pub fn compactions_file(&self) -> PathBuf {
        self.data_dir.join("telemetry").join("compactions.jsonl")
    }
}
