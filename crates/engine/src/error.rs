use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can terminate a comparison run
#[derive(Error, Debug)]
pub enum EngineError {
    /// One or both token sequences are empty
    #[error("one or both token sequences are empty")]
    EmptyInput,

    /// The documents were judged too dissimilar to be worth diffing
    #[error("documents too dissimilar: {0}")]
    TooDissimilar(DissimilarityReason),

    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The run was cancelled through its `CancelToken`
    #[error("comparison cancelled")]
    Cancelled,

    /// The event sink could not accept a message
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create an invalid-settings error
    pub fn invalid_settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }

    /// Whether this is the anticipated early-stop outcome (prefilter or
    /// stop-loss), as opposed to an unexpected failure
    #[must_use]
    pub const fn is_early_stop(&self) -> bool {
        matches!(self, Self::TooDissimilar(_))
    }
}

/// Which safeguard rejected the document pair, with the evidence it measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DissimilarityReason {
    /// The upfront sampled-Jaccard prefilter: both estimates fell below
    /// their floors
    Prefilter { unigram: f64, bigram: f64 },

    /// The runtime stop-loss: after `processed` committed tokens the
    /// unchanged ratio was still below the floor
    StopLoss { processed: usize, unchanged_ratio: f64 },
}

impl std::fmt::Display for DissimilarityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefilter { unigram, bigram } => write!(
                f,
                "prefilter rejected pair (jaccard unigram {unigram:.6}, bigram {bigram:.6})"
            ),
            Self::StopLoss {
                processed,
                unchanged_ratio,
            } => write!(
                f,
                "stop-loss after {processed} committed tokens (unchanged ratio {unchanged_ratio:.6})"
            ),
        }
    }
}
