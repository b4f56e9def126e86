use super::{block_on, Workspace};
use impostor_compress::{CompactionReport, CompactionSource, ContextManager, SqliteStore, Summarizer};

fn compact_with<Su: Summarizer>(
    manager: &ContextManager<SqliteStore, Su>,
    session_id: &str,
) -> anyhow::Result<CompactionReport> {
    Ok(block_on(manager.compact(session_id))??)
}

fn describe(report: &CompactionReport) -> String {
    match report.source {
        CompactionSource::Unchanged => format!(
            "Nothing to compact ({} recent turns kept)",
            report.recent.len()
        ),
        source => format!(
            "Compacted {} turns into summary via {} ({} recent turns kept)",
            report.compressed_ids.len(),
            source,
            report.recent.len()
        ),
    }
}

pub fn run(ws: &Workspace, session_id: &str, json: bool) -> anyhow::Result<()> {
    let report = compact_with(&ws.manager(), session_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{}", describe(&report));
    if !report.summary.is_empty() {
        println!("\nSummary: {}", report.summary);
    }
    Ok(())
}

pub fn context(ws: &Workspace, session_id: &str) -> anyhow::Result<()> {
    let report = compact_with(&ws.manager(), session_id)?;
    println!("{}", report.prompt_context());
    Ok(())
}
