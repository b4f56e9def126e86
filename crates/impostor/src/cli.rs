use clap::{Parser, Subcommand};
use impostor_core::Role;

#[derive(Parser)]
#[command(name = "impostor")]
#[command(version)]
#[command(about = "Game sessions with rolling transcript summaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, database and default config
    Init,

    /// Start a new game session
    New {
        /// Scenario text shown to the summarizer
        #[arg(short, long)]
        scenario: String,
    },

    /// Append a turn to a session
    Say {
        session: String,

        /// Speaker of the turn (user or assistant)
        #[arg(short, long, default_value = "user")]
        role: Role,

        text: String,
    },

    /// Show or update a session's stats
    Stats {
        session: String,

        #[arg(long)]
        health: Option<i64>,

        #[arg(long)]
        coins: Option<i64>,
    },

    /// Fold old turns into the session summary
    Compact {
        session: String,

        /// Print the compaction report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compact, then print the prompt context for the next turn
    Context { session: String },

    /// Print the stored summary and uncompressed turns
    Show { session: String },

    /// Delete a session and its transcript
    Delete { session: String },

    /// View compaction history
    History {
        /// Only this session
        #[arg(long)]
        session: Option<String>,

        /// Show statistics summary
        #[arg(long)]
        stats: bool,
    },

    /// Print version information
    Version,
}
