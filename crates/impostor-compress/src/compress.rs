use impostor_core::{CompressorConfig, GameStats, Message};

const MAX_PROMPT_MESSAGE_CHARS: usize = 2000;
const EARLIER_TAG: &str = "[Earlier]";

/// Whitespace-collapsed prefix of at most `max_chars` characters
fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
    cut.truncate(cut.trim_end().len());
    cut + "..."
}

pub fn build_summary_prompt(
    old_messages: &[Message],
    existing_summary: Option<&str>,
    scenario: &str,
    stats: &GameStats,
) -> String {
    let mut prompt = String::from(
        "You keep the running memory of a social-deduction game conversation.\n\n",
    );
    prompt.push_str(&format!("Scenario: {}\n", scenario.trim()));
    prompt.push_str(&format!("Current stats: {}\n\n", stats));

    if let Some(summary) = existing_summary.filter(|s| !s.trim().is_empty()) {
        prompt.push_str("Summary so far:\n");
        prompt.push_str(summary.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str("New conversation to fold in:\n");
    for msg in old_messages {
        prompt.push_str(&format!(
            "{}: {}\n",
            msg.role.label(),
            preview(&msg.content, MAX_PROMPT_MESSAGE_CHARS)
        ));
    }

    prompt.push_str(
        "\nWrite an updated factual summary in 2-3 sentences. Keep every fact from the \
         summary so far and add what is new: claims, accusations, alibis, locations and \
         times. Do not invent details. Return only the summary.",
    );
    prompt
}

/// Local compaction used when the summarization call fails
///
/// Deterministic and never empty while `old_messages` is non-empty.
pub fn fallback_summary(
    old_messages: &[Message],
    existing_summary: Option<&str>,
    config: &CompressorConfig,
) -> String {
    let mut parts = Vec::with_capacity(old_messages.len() + 1);

    if let Some(summary) = existing_summary.filter(|s| !s.trim().is_empty()) {
        let body = strip_earlier_tags(summary);
        parts.push(tagged("Earlier", &preview(body, config.summary_preview_chars)));
    }
    for msg in old_messages {
        parts.push(tagged(
            msg.role.as_str(),
            &preview(&msg.content, config.message_preview_chars),
        ));
    }

    parts.join(&config.separator)
}

/// Drop the leading tags left by earlier fallback rounds
fn strip_earlier_tags(summary: &str) -> &str {
    let mut rest = summary.trim_start();
    while let Some(stripped) = rest.strip_prefix(EARLIER_TAG) {
        rest = stripped.trim_start();
    }
    rest
}

fn tagged(tag: &str, body: &str) -> String {
    if body.is_empty() {
        format!("[{}]", tag)
    } else {
        format!("[{}] {}", tag, body)
    }
}

/// Prompt block with the summary ahead of the recent turns
pub fn render_prompt_context(summary: &str, recent: &[Message]) -> String {
    let mut sections = Vec::new();

    let summary = summary.trim();
    if !summary.is_empty() {
        sections.push(format!("Previous events (summary): {}", summary));
    }

    if !recent.is_empty() {
        let mut block = String::from("Recent conversation:");
        for msg in recent {
            block.push('\n');
            block.push_str(msg.role.label());
            block.push_str(": ");
            block.push_str(&msg.content);
        }
        sections.push(block);
    }

    sections.join("\n\n")
}
