//! Token estimation for transcript text

/// Rough BPE token count for conversational prose
///
/// Words average ~1.3 tokens; punctuation-dense text leans toward one
/// token per 3 characters. The larger of the two estimates wins.
pub fn estimate_tokens(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let words = trimmed.split_whitespace().count();
    let by_words = (words as f64 * 1.3).ceil() as usize;
    let by_chars = trimmed.chars().count().div_ceil(3);

    let punctuation = trimmed.chars().filter(|c| c.is_ascii_punctuation()).count();
    if punctuation * 10 > trimmed.len() {
        by_words.max(by_chars)
    } else {
        by_words.max(trimmed.chars().count().div_ceil(4))
    }
}
