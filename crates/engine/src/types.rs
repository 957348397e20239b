use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Classification of a single word in a diff result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Present in both documents at an aligned position
    Unchanged,
    /// Present only in the comparison document
    Added,
    /// Present only in the base document
    Removed,
}

impl TokenKind {
    /// Wire-format name of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }

    /// Whether a token of this kind came from the base document
    #[must_use]
    pub const fn consumes_base(self) -> bool {
        !matches!(self, Self::Added)
    }

    /// Whether a token of this kind came from the comparison document
    #[must_use]
    pub const fn consumes_comparison(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// One labeled word in a diff result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffToken {
    /// How the word relates to the two documents
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// The word itself, copied out of the caller's input
    pub text: String,
}

impl DiffToken {
    /// Create an unchanged token
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Unchanged,
            text: text.into(),
        }
    }

    /// Create an added token
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Added,
            text: text.into(),
        }
    }

    /// Create a removed token
    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Removed,
            text: text.into(),
        }
    }
}

/// Advisory conditions reported while a comparison proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An input exceeds `max_word_threshold`; chunking handles it anyway
    OversizedInput,
    /// An input exceeds `complex_threshold`; the run may take a while
    HighComplexity,
}

/// Events streamed to the caller during a comparison run.
///
/// Zero or more events precede the run's terminal `Result`; chunks arrive in
/// strictly increasing document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Advisory, never terminal
    Warning(WarningKind),
    /// A committed slice of the diff, final and never revisited
    Chunk(Vec<DiffToken>),
}

/// Cooperative cancellation handle.
///
/// Cloneable; all clones observe the same flag. The diff driver checks the
/// token once per committed chunk, so cancellation latency is bounded by one
/// window iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; visible to every clone
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Aggregate statistics for one completed comparison run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Length of the base token sequence as submitted
    pub base_word_count: usize,

    /// Length of the comparison token sequence as submitted
    pub comparison_word_count: usize,

    /// Wall-clock duration of the chunked diff, excluding the prefilter
    pub duration_ms: u64,

    /// Number of chunk events emitted
    pub chunks_emitted: usize,

    /// Largest window materialized by the driver; bounded by the dynamic
    /// window cap regardless of document size
    pub peak_window: usize,
}
