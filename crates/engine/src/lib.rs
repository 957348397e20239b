//! # Collate Engine
//!
//! Word-level comparison of large documents with bounded time and memory.
//!
//! ## Philosophy
//!
//! The engine computes exact LCS diffs where exactness is affordable and
//! degrades deliberately where it is not:
//! - Windowed chunking keeps peak memory independent of document size
//! - Committed chunks stream out immediately and are never revisited
//! - Unrelated document pairs are rejected cheaply instead of diffed slowly
//! - Early-stop outcomes are typed results, never swallowed failures
//!
//! ## Architecture
//!
//! ```text
//! tokens (base, comparison)
//!     │
//!     ├──> Validation (empty input, size/complexity warnings)
//!     │
//!     ├──> Similarity Prefilter (sampled unigram+bigram Jaccard gate)
//!     │
//!     └──> Windowed Chunk Driver
//!          ├─> LCS matcher over bounded windows
//!          ├─> stable-prefix commits → Chunk events
//!          └─> Stop-Loss Monitor (mid-run dissimilarity abort)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use collate_engine::{CancelToken, DiffEngine, EngineEvent, EngineSettings};
//!
//! let engine = DiffEngine::new(EngineSettings::default()).unwrap();
//! let base: Vec<String> = "the cat sat".split(' ').map(String::from).collect();
//! let comparison: Vec<String> = "the dog sat".split(' ').map(String::from).collect();
//!
//! let stats = engine
//!     .compare(&base, &comparison, &CancelToken::new(), |event| {
//!         if let EngineEvent::Chunk(tokens) = event {
//!             for token in tokens {
//!                 println!("{} {}", token.kind.as_str(), token.text);
//!             }
//!         }
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(stats.base_word_count, 3);
//! ```

mod config;
mod driver;
mod engine;
mod error;
mod matcher;
mod similarity;
mod stoploss;
mod types;

pub use config::EngineSettings;
pub use engine::DiffEngine;
pub use error::{DissimilarityReason, EngineError, Result};
pub use types::{CancelToken, DiffToken, EngineEvent, RunStats, TokenKind, WarningKind};
