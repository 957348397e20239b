//! Engine façade: input validation, the similarity prefilter gate, and run
//! orchestration around the windowed driver.

use std::time::Instant;

use log::{debug, warn};

use crate::config::EngineSettings;
use crate::driver;
use crate::error::{DissimilarityReason, EngineError, Result};
use crate::similarity;
use crate::stoploss::{StopLossMonitor, StopLossPolicy};
use crate::types::{CancelToken, EngineEvent, RunStats, WarningKind};

/// A validated comparison engine.
///
/// Building one checks the settings once; [`DiffEngine::compare`] can then be
/// called any number of times. Each run owns its own window buffers, driver
/// state, and stop-loss monitor, so a single engine is safe to reuse
/// sequentially across unrelated document pairs.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    settings: EngineSettings,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
        }
    }
}

impl DiffEngine {
    /// Build an engine, rejecting invalid settings up front
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate().map_err(EngineError::invalid_settings)?;
        Ok(Self { settings })
    }

    /// The settings this engine runs with
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Compare two pre-tokenized documents, streaming warnings and committed
    /// chunks through `on_event` in document order.
    ///
    /// Returns the run stats on completion. Early-stop outcomes surface as
    /// [`EngineError::TooDissimilar`] with the measured evidence; a sink error
    /// or a tripped cancel token aborts the run with the corresponding error
    /// and is never reclassified as dissimilarity.
    pub fn compare<F>(
        &self,
        base_tokens: &[String],
        comparison_tokens: &[String],
        cancel: &CancelToken,
        mut on_event: F,
    ) -> Result<RunStats>
    where
        F: FnMut(EngineEvent) -> Result<()>,
    {
        if base_tokens.is_empty() || comparison_tokens.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let settings = &self.settings;
        let len1 = base_tokens.len();
        let len2 = comparison_tokens.len();

        if len1 > settings.max_word_threshold || len2 > settings.max_word_threshold {
            warn!("oversized comparison: base={len1} comparison={len2} words");
            on_event(EngineEvent::Warning(WarningKind::OversizedInput))?;
        }
        if len1 > settings.complex_threshold || len2 > settings.complex_threshold {
            debug!("complex comparison: base={len1} comparison={len2} words");
            on_event(EngineEvent::Warning(WarningKind::HighComplexity))?;
        }

        let base: Vec<&str> = base_tokens.iter().map(String::as_str).collect();
        let comparison: Vec<&str> = comparison_tokens.iter().map(String::as_str).collect();

        if settings.early_stop_enabled && len1.min(len2) >= settings.min_tokens_for_early_stop {
            let estimate = similarity::estimate(&base, &comparison, settings.sample_limit);
            if estimate.unigram < settings.min_jaccard_unigram
                && estimate.bigram < settings.min_jaccard_bigram
            {
                debug!(
                    "prefilter rejected pair: unigram={:.6} bigram={:.6}",
                    estimate.unigram, estimate.bigram
                );
                return Err(EngineError::TooDissimilar(DissimilarityReason::Prefilter {
                    unigram: estimate.unigram,
                    bigram: estimate.bigram,
                }));
            }
        }

        let mut monitor = StopLossMonitor::new(StopLossPolicy::from_settings(settings));
        let mut chunks_emitted = 0usize;

        let started = Instant::now();
        let report = driver::chunked_diff(
            &base,
            &comparison,
            settings.batch_size,
            &mut monitor,
            cancel,
            &mut |tokens| {
                if tokens.is_empty() {
                    return Ok(());
                }
                chunks_emitted += 1;
                on_event(EngineEvent::Chunk(tokens))
            },
        )?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let stats = RunStats {
            base_word_count: len1,
            comparison_word_count: len2,
            duration_ms,
            chunks_emitted,
            peak_window: report.peak_window,
        };
        debug!(
            "comparison complete: {}x{} words, {} chunks, peak window {}, {}ms",
            stats.base_word_count,
            stats.comparison_word_count,
            stats.chunks_emitted,
            stats.peak_window,
            stats.duration_ms
        );
        Ok(stats)
    }
}
