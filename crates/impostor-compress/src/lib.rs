//! Rolling-summary compression of game transcripts
//!
//! Old turns are folded into a single per-session summary while the last
//! few turns stay verbatim. The summary comes from a model call when one
//! is reachable and from deterministic truncation when it is not.

mod compress;
pub mod compressor;
mod manager;
mod storage;
mod window;

pub use compress::{build_summary_prompt, fallback_summary, render_prompt_context};
pub use compressor::{
    prepare_compressed_context, summarize, CompressedContext, HttpSummarizer, Summarized,
    SummarizeError, Summarizer,
};
pub use impostor_telemetry::CompactionSource;
pub use manager::{CompactError, CompactionReport, ContextManager};
pub use storage::{SessionStore, SqliteStore, StoreError};
pub use window::{partition, Window};
