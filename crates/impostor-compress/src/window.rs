use impostor_core::Message;

/// Split of a transcript into turns to fold away and turns kept verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub old: &'a [Message],
    pub recent: &'a [Message],
}

impl Window<'_> {
    pub fn needs_compression(&self) -> bool {
        !self.old.is_empty()
    }
}

/// Keep the last `keep_recent` messages; everything before them is old
pub fn partition(messages: &[Message], keep_recent: usize) -> Window<'_> {
    let split = messages.len().saturating_sub(keep_recent);
    let (old, recent) = messages.split_at(split);
    Window { old, recent }
}
