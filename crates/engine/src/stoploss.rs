//! Runtime stop-loss: abort a diff that is running but not converging.
//!
//! Guards against document pairs that pass the prefilter and then degrade
//! into worst-case behavior partway through (shared boilerplate around an
//! otherwise unrelated body). Counts are updated after every committed
//! chunk; the breach check stays silent until the processed-token threshold
//! is crossed, so slow-starting but legitimate diffs are never cut short.

use crate::config::EngineSettings;
use crate::error::DissimilarityReason;
use crate::types::{DiffToken, TokenKind};

/// Thresholds for the runtime stop-loss
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLossPolicy {
    /// Committed-token total (base + comparison) after which the ratio check
    /// becomes active
    pub max_processed_tokens: usize,

    /// Minimum acceptable `unchanged / processed` ratio once active
    pub min_unchanged_ratio: f64,
}

impl StopLossPolicy {
    /// Extract the stop-loss thresholds from engine settings
    #[must_use]
    pub const fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            max_processed_tokens: settings.runtime_max_processed_tokens,
            min_unchanged_ratio: settings.runtime_min_unchanged_ratio,
        }
    }
}

/// Running totals for one comparison run, plus the policy that judges them
#[derive(Debug, Clone)]
pub struct StopLossMonitor {
    policy: StopLossPolicy,
    processed_base: usize,
    processed_comparison: usize,
    unchanged: usize,
}

impl StopLossMonitor {
    /// Monitor with the given thresholds
    #[must_use]
    pub const fn new(policy: StopLossPolicy) -> Self {
        Self {
            policy,
            processed_base: 0,
            processed_comparison: 0,
            unchanged: 0,
        }
    }

    /// Monitor that counts but can never breach
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(StopLossPolicy {
            max_processed_tokens: usize::MAX,
            min_unchanged_ratio: 0.0,
        })
    }

    /// Account for one committed chunk
    pub fn record(&mut self, chunk: &[DiffToken]) {
        for token in chunk {
            if token.kind.consumes_base() {
                self.processed_base += 1;
            }
            if token.kind.consumes_comparison() {
                self.processed_comparison += 1;
            }
            if token.kind == TokenKind::Unchanged {
                self.unchanged += 1;
            }
        }
    }

    /// Check the thresholds; `Some` means the run should abort
    #[must_use]
    pub fn breach(&self) -> Option<DissimilarityReason> {
        let processed = self.processed_base + self.processed_comparison;
        if processed < self.policy.max_processed_tokens {
            return None;
        }

        let unchanged_ratio = self.unchanged as f64 / processed.max(1) as f64;
        if unchanged_ratio < self.policy.min_unchanged_ratio {
            Some(DissimilarityReason::StopLoss {
                processed,
                unchanged_ratio,
            })
        } else {
            None
        }
    }

    /// Committed tokens consumed from the base document
    #[must_use]
    pub const fn processed_base(&self) -> usize {
        self.processed_base
    }

    /// Committed tokens consumed from the comparison document
    #[must_use]
    pub const fn processed_comparison(&self) -> usize {
        self.processed_comparison
    }

    /// Committed tokens labeled unchanged
    #[must_use]
    pub const fn unchanged(&self) -> usize {
        self.unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed_run(n: usize) -> Vec<DiffToken> {
        (0..n).map(|i| DiffToken::removed(format!("r{i}"))).collect()
    }

    fn unchanged_run(n: usize) -> Vec<DiffToken> {
        (0..n).map(|i| DiffToken::unchanged(format!("u{i}"))).collect()
    }

    #[test]
    fn stays_silent_below_the_processed_threshold() {
        let mut monitor = StopLossMonitor::new(StopLossPolicy {
            max_processed_tokens: 100,
            min_unchanged_ratio: 0.5,
        });
        monitor.record(&removed_run(99));
        assert!(monitor.breach().is_none());
    }

    #[test]
    fn breaches_once_threshold_crossed_with_low_ratio() {
        let mut monitor = StopLossMonitor::new(StopLossPolicy {
            max_processed_tokens: 100,
            min_unchanged_ratio: 0.01,
        });
        monitor.record(&removed_run(120));
        match monitor.breach() {
            Some(DissimilarityReason::StopLoss {
                processed,
                unchanged_ratio,
            }) => {
                assert_eq!(processed, 120);
                assert_eq!(unchanged_ratio, 0.0);
            }
            other => panic!("expected stop-loss breach, got {other:?}"),
        }
    }

    #[test]
    fn healthy_unchanged_ratio_never_breaches() {
        let mut monitor = StopLossMonitor::new(StopLossPolicy {
            max_processed_tokens: 10,
            min_unchanged_ratio: 0.01,
        });
        // Unchanged tokens count against both documents
        monitor.record(&unchanged_run(50));
        assert_eq!(monitor.processed_base(), 50);
        assert_eq!(monitor.processed_comparison(), 50);
        assert_eq!(monitor.unchanged(), 50);
        assert!(monitor.breach().is_none());
    }

    #[test]
    fn counts_accumulate_across_chunks() {
        let mut monitor = StopLossMonitor::disabled();
        monitor.record(&unchanged_run(3));
        monitor.record(&removed_run(2));
        monitor.record(&[DiffToken::added("x")]);
        assert_eq!(monitor.processed_base(), 5);
        assert_eq!(monitor.processed_comparison(), 4);
        assert_eq!(monitor.unchanged(), 3);
        assert!(monitor.breach().is_none());
    }

    #[test]
    fn disabled_monitor_never_breaches() {
        let mut monitor = StopLossMonitor::disabled();
        monitor.record(&removed_run(10_000));
        assert!(monitor.breach().is_none());
    }
}
