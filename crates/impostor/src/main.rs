mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Workspace;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(&impostor_telemetry::Paths::new()?),
        Commands::Version => commands::version::run(),
        Commands::New { scenario } => commands::session::new(&Workspace::open()?, &scenario),
        Commands::Say {
            session,
            role,
            text,
        } => commands::session::say(&Workspace::open()?, &session, role, &text),
        Commands::Stats {
            session,
            health,
            coins,
        } => commands::session::stats(&Workspace::open()?, &session, health, coins),
        Commands::Show { session } => commands::session::show(&Workspace::open()?, &session),
        Commands::Delete { session } => commands::session::delete(&Workspace::open()?, &session),
        Commands::Compact { session, json } => {
            commands::compact::run(&Workspace::open()?, &session, json)
        }
        Commands::Context { session } => commands::compact::context(&Workspace::open()?, &session),
        Commands::History { session, stats } => {
            commands::history::run(&Workspace::open()?, session.as_deref(), stats)
        }
    }
}
