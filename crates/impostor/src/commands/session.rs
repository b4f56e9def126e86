use super::Workspace;
use impostor_compress::SessionStore;
use impostor_core::{GameStats, Message, Role, Session};

fn require_session(ws: &Workspace, session_id: &str) -> anyhow::Result<Session> {
    ws.store
        .get_session(session_id)?
        .ok_or_else(|| anyhow::anyhow!("session {} not found", session_id))
}

pub fn new(ws: &Workspace, scenario: &str) -> anyhow::Result<()> {
    let session = ws.store.create_session(scenario)?;
    tracing::info!(session_id = %session.id, "session created");
    println!("{}", session.id);
    Ok(())
}

pub fn say(ws: &Workspace, session_id: &str, role: Role, text: &str) -> anyhow::Result<()> {
    let message = ws.store.add_message(session_id, role, text)?;
    println!("#{} {}", message.id, message.role);
    Ok(())
}

pub fn stats(
    ws: &Workspace,
    session_id: &str,
    health: Option<i64>,
    coins: Option<i64>,
) -> anyhow::Result<()> {
    let session = require_session(ws, session_id)?;
    let session = if health.is_none() && coins.is_none() {
        session
    } else {
        let updated = GameStats::new(
            health.unwrap_or(session.stats.health),
            coins.unwrap_or(session.stats.coins),
        );
        ws.store
            .update_stats(session_id, updated)?
            .ok_or_else(|| anyhow::anyhow!("session {} not found", session_id))?
    };
    println!("{}", session.stats);
    Ok(())
}

fn format_transcript(session: &Session, summary: Option<&str>, messages: &[Message]) -> String {
    let mut out = format!(
        "Session {}\nScenario: {}\nStats: {}\n",
        session.id, session.scenario, session.stats
    );
    if let Some(summary) = summary {
        out.push_str(&format!("\nSummary: {}\n", summary));
    }
    out.push_str(&format!("\nTurns ({}):\n", messages.len()));
    for msg in messages {
        out.push_str(&format!(
            "  #{} {} [{}] {}\n",
            msg.id,
            msg.timestamp.format("%H:%M:%S"),
            msg.role,
            msg.content
        ));
    }
    out
}

pub fn show(ws: &Workspace, session_id: &str) -> anyhow::Result<()> {
    let session = require_session(ws, session_id)?;
    let summary = ws.store.get_summary(session_id)?;
    let messages = ws.store.list_uncompressed(session_id)?;
    print!(
        "{}",
        format_transcript(&session, summary.as_ref().map(|s| s.content.as_str()), &messages)
    );
    Ok(())
}

pub fn delete(ws: &Workspace, session_id: &str) -> anyhow::Result<()> {
    if ws.store.delete_session(session_id)? {
        println!("Deleted session {}", session_id);
    } else {
        println!("Session {} not found", session_id);
    }
    Ok(())
}
