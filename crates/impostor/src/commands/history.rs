use super::Workspace;
use impostor_telemetry::{read_jsonl, CompactionRecord, CompactionSource};

const DISPLAY_LIMIT: usize = 20;

fn filter_records<'a>(
    records: &'a [CompactionRecord],
    session: Option<&str>,
) -> Vec<&'a CompactionRecord> {
    records
        .iter()
        .filter(|r| session.map_or(true, |s| r.session_id == s))
        .collect()
}

fn compute_stats(records: &[&CompactionRecord]) -> String {
    if records.is_empty() {
        return "No compactions to analyze.".to_string();
    }
    let total = records.len();
    let fallbacks = records
        .iter()
        .filter(|r| r.source == CompactionSource::Fallback)
        .count();
    let folded: usize = records.iter().map(|r| r.compressed_messages).sum();
    let raw: usize = records.iter().map(|r| r.raw_tokens).sum();
    let summary: usize = records.iter().map(|r| r.summary_tokens).sum();
    let avg_savings = records.iter().map(|r| r.savings_ratio()).sum::<f64>() / total as f64;

    format!(
        "Total compactions: {}\n\
         Fallback rate: {:.1}%\n\
         Turns folded: {}\n\
         Tokens in: {} / out: {}\n\
         Avg savings: {:.1}%",
        total,
        fallbacks as f64 / total as f64 * 100.0,
        folded,
        raw,
        summary,
        avg_savings * 100.0
    )
}

pub fn run(ws: &Workspace, session: Option<&str>, stats: bool) -> anyhow::Result<()> {
    let records: Vec<CompactionRecord> = read_jsonl(&ws.paths.compactions_file())?;
    let filtered = filter_records(&records, session);

    if filtered.is_empty() {
        println!("No compaction history");
        return Ok(());
    }

    if stats {
        println!("{}", compute_stats(&filtered));
        return Ok(());
    }

    let shown: Vec<_> = filtered.iter().rev().take(DISPLAY_LIMIT).collect();
    println!("Recent Compactions (last {})", shown.len());
    println!("===========================");
    for r in shown {
        println!(
            "  {} | {} | folded:{} kept:{} via {} | {} -> {} tokens",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            r.session_id,
            r.compressed_messages,
            r.kept_messages,
            r.source,
            r.raw_tokens,
            r.summary_tokens,
        );
    }
    Ok(())
}
