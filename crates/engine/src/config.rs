use serde::{Deserialize, Serialize};

/// Tunable knobs for a comparison run.
///
/// Deserializes from the wire `settings` object: every field is optional and
/// falls back to its default independently, so a request may override any
/// subset of knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Base window ("batch") size in tokens for the chunked diff driver
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Input length above which the run is flagged as high-complexity
    #[serde(default = "defaults::complex_threshold")]
    pub complex_threshold: usize,

    /// Input length above which the oversized-input warning fires
    #[serde(default = "defaults::max_word_threshold")]
    pub max_word_threshold: usize,

    /// Master switch for the similarity prefilter
    #[serde(default = "defaults::early_stop_enabled")]
    pub early_stop_enabled: bool,

    /// Unigram Jaccard floor; below it (together with the bigram floor) the
    /// prefilter rejects the pair as too dissimilar
    #[serde(default = "defaults::min_jaccard_unigram")]
    pub min_jaccard_unigram: f64,

    /// Bigram Jaccard floor for the prefilter
    #[serde(default = "defaults::min_jaccard_bigram")]
    pub min_jaccard_bigram: f64,

    /// Both inputs must reach this length before the prefilter runs
    #[serde(default = "defaults::min_tokens_for_early_stop")]
    pub min_tokens_for_early_stop: usize,

    /// Cap on sampled n-grams per sequence in the prefilter
    #[serde(default = "defaults::sample_limit")]
    pub sample_limit: usize,

    /// Committed-token total after which the runtime stop-loss may fire
    #[serde(default = "defaults::runtime_max_processed_tokens")]
    pub runtime_max_processed_tokens: usize,

    /// Unchanged ratio below which the runtime stop-loss aborts the run
    #[serde(default = "defaults::runtime_min_unchanged_ratio")]
    pub runtime_min_unchanged_ratio: f64,
}

mod defaults {
    pub const fn batch_size() -> usize {
        5_000
    }
    pub const fn complex_threshold() -> usize {
        25_000
    }
    pub const fn max_word_threshold() -> usize {
        60_000
    }
    pub const fn early_stop_enabled() -> bool {
        true
    }
    pub const fn min_jaccard_unigram() -> f64 {
        0.005
    }
    pub const fn min_jaccard_bigram() -> f64 {
        0.003
    }
    pub const fn min_tokens_for_early_stop() -> usize {
        20_000
    }
    pub const fn sample_limit() -> usize {
        50_000
    }
    pub const fn runtime_max_processed_tokens() -> usize {
        150_000
    }
    pub const fn runtime_min_unchanged_ratio() -> f64 {
        0.001
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            complex_threshold: defaults::complex_threshold(),
            max_word_threshold: defaults::max_word_threshold(),
            early_stop_enabled: defaults::early_stop_enabled(),
            min_jaccard_unigram: defaults::min_jaccard_unigram(),
            min_jaccard_bigram: defaults::min_jaccard_bigram(),
            min_tokens_for_early_stop: defaults::min_tokens_for_early_stop(),
            sample_limit: defaults::sample_limit(),
            runtime_max_processed_tokens: defaults::runtime_max_processed_tokens(),
            runtime_min_unchanged_ratio: defaults::runtime_min_unchanged_ratio(),
        }
    }
}

impl EngineSettings {
    /// Settings that never give up: prefilter and stop-loss disabled.
    /// Useful when the caller knows the documents are related and wants the
    /// full diff no matter the cost.
    pub fn exhaustive() -> Self {
        Self {
            early_stop_enabled: false,
            runtime_max_processed_tokens: usize::MAX,
            ..Default::default()
        }
    }

    /// Smaller windows for quicker first chunks on interactive callers
    pub fn low_latency() -> Self {
        Self {
            batch_size: 1_500,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }

        if self.sample_limit == 0 {
            return Err("sample_limit must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_jaccard_unigram) {
            return Err(format!(
                "min_jaccard_unigram ({}) must be within [0, 1]",
                self.min_jaccard_unigram
            ));
        }

        if !(0.0..=1.0).contains(&self.min_jaccard_bigram) {
            return Err(format!(
                "min_jaccard_bigram ({}) must be within [0, 1]",
                self.min_jaccard_bigram
            ));
        }

        if !(0.0..=1.0).contains(&self.runtime_min_unchanged_ratio) {
            return Err(format!(
                "runtime_min_unchanged_ratio ({}) must be within [0, 1]",
                self.runtime_min_unchanged_ratio
            ));
        }

        Ok(())
    }
}
