//! Windowed chunk diff driver.
//!
//! Diffs unbounded-length sequences in bounded memory by running the exact
//! matcher over a window taken from the fronts of both inputs plus any
//! carried remainder, committing only the prefix that a trailing `Unchanged`
//! anchor proves stable, and carrying the rest into the next window. Peak
//! memory is bounded by the dynamic window cap, never by document size.

use log::debug;

use crate::error::{EngineError, Result};
use crate::matcher;
use crate::stoploss::StopLossMonitor;
use crate::types::{CancelToken, DiffToken, TokenKind};

/// Per-run tuning values that evolve across driver iterations.
///
/// Everything adaptive lives here so the stall/backoff behavior can be
/// exercised without driving a whole diff.
#[derive(Debug, Clone)]
pub struct DriverState {
    base_chunk_size: usize,
    dynamic_chunk_size: usize,
    dynamic_max_window: usize,
    dynamic_min_commit: usize,
    dynamic_step: usize,
    stall_iterations: u32,
    peak_window: usize,
}

impl DriverState {
    /// Derive the initial tuning values from the configured chunk size
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        let base = chunk_size.max(1);
        Self {
            base_chunk_size: base,
            dynamic_chunk_size: base,
            dynamic_max_window: (base * 6).max(base + 512),
            dynamic_min_commit: (base / 10).max(1),
            dynamic_step: (base / 2).max(64),
            stall_iterations: 0,
            peak_window: 0,
        }
    }

    /// Current window ("chunk") size in tokens
    #[must_use]
    pub const fn dynamic_chunk_size(&self) -> usize {
        self.dynamic_chunk_size
    }

    /// Hard cap on window length; never shrinks within a run
    #[must_use]
    pub const fn dynamic_max_window(&self) -> usize {
        self.dynamic_max_window
    }

    /// Commit sizes below this count as a stall iteration
    #[must_use]
    pub const fn dynamic_min_commit(&self) -> usize {
        self.dynamic_min_commit
    }

    /// Window growth increment while searching for a stable anchor
    #[must_use]
    pub const fn dynamic_step(&self) -> usize {
        self.dynamic_step
    }

    /// Consecutive sparse commits observed so far
    #[must_use]
    pub const fn stall_iterations(&self) -> u32 {
        self.stall_iterations
    }

    /// Largest window length materialized so far in this run
    #[must_use]
    pub const fn peak_window(&self) -> usize {
        self.peak_window
    }

    /// Enlarge future windows after repeated stalls. Capped at 8x the base
    /// chunk size; the derived commit/step/cap values follow the new size.
    pub fn grow_chunk_size(&mut self) {
        let cap = self.base_chunk_size * 8;
        if self.dynamic_chunk_size >= cap {
            return;
        }

        let stepped = self.dynamic_chunk_size + self.dynamic_step;
        let scaled = self.dynamic_chunk_size + self.dynamic_chunk_size / 2;
        let next = stepped.max(scaled).min(cap);
        if next == self.dynamic_chunk_size {
            return;
        }

        self.dynamic_chunk_size = next;
        self.dynamic_max_window = self.dynamic_max_window.max((next * 6).max(next + 512));
        self.dynamic_min_commit = (next / 10).max(1);
        self.dynamic_step = (next / 2).max(64);
        debug!(
            "diff window grown: chunk={} max_window={}",
            self.dynamic_chunk_size, self.dynamic_max_window
        );
    }

    /// Stall bookkeeping: three consecutive commits below `dynamic_min_commit`
    /// grow the chunk size and reset the counter.
    pub fn note_commit(&mut self, committed: usize) {
        if committed < self.dynamic_min_commit {
            self.stall_iterations += 1;
        } else {
            self.stall_iterations = 0;
        }

        if self.stall_iterations >= 3 {
            self.grow_chunk_size();
            self.stall_iterations = 0;
        }
    }

    fn note_window(&mut self, len1: usize, len2: usize) {
        self.peak_window = self.peak_window.max(len1.max(len2));
    }
}

/// What one run of the driver did, for stats reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Number of chunks handed to the sink
    pub chunks_emitted: usize,
    /// Largest window length materialized during the run
    pub peak_window: usize,
}

/// One resolved window: the slices diffed, the result, and how much new
/// input the window pulled.
struct WindowPass<'a> {
    window1: Vec<&'a str>,
    window2: Vec<&'a str>,
    tokens: Vec<DiffToken>,
    last_stable: Option<usize>,
    reached_end: bool,
    pulled1: usize,
    pulled2: usize,
}

/// Diff two token sequences through bounded windows, streaming committed
/// chunks into `emit`.
///
/// The stop-loss monitor is consulted after every commit; a breach aborts
/// the run with [`EngineError::TooDissimilar`]. The cancel token is checked
/// once per outer iteration. Emitted chunks concatenate to a diff whose
/// non-`Added` tokens reproduce `base` and whose non-`Removed` tokens
/// reproduce `comparison`; a token is never pulled twice and never dropped.
pub fn chunked_diff<F>(
    base: &[&str],
    comparison: &[&str],
    chunk_size: usize,
    monitor: &mut StopLossMonitor,
    cancel: &CancelToken,
    emit: &mut F,
) -> Result<DriverReport>
where
    F: FnMut(Vec<DiffToken>) -> Result<()>,
{
    let mut report = DriverReport::default();
    if base.is_empty() && comparison.is_empty() {
        return Ok(report);
    }

    let mut state = DriverState::new(chunk_size);
    let mut index1 = 0usize;
    let mut index2 = 0usize;
    let mut buffer1: Vec<&str> = Vec::new();
    let mut buffer2: Vec<&str> = Vec::new();

    while index1 < base.len()
        || index2 < comparison.len()
        || !buffer1.is_empty()
        || !buffer2.is_empty()
    {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let pass = resolve_window(
            base,
            comparison,
            index1,
            index2,
            &buffer1,
            &buffer2,
            &mut state,
        );

        // Pulled tokens are consumed from the inputs here; from now on only
        // the window (and the buffers recomputed from it) hold them.
        index1 += pass.pulled1;
        index2 += pass.pulled2;

        let commit_len = if pass.reached_end {
            pass.tokens.len()
        } else if let Some(stable) = pass.last_stable {
            stable + 1
        } else {
            pass.tokens.len().min(state.dynamic_min_commit())
        };

        let commit = &pass.tokens[..commit_len];
        let base_consumed = commit.iter().filter(|t| t.kind.consumes_base()).count();
        let comparison_consumed = commit
            .iter()
            .filter(|t| t.kind.consumes_comparison())
            .count();

        if commit_len > 0 {
            emit(commit.to_vec())?;
            report.chunks_emitted += 1;
        }

        buffer1 = pass.window1[base_consumed..].to_vec();
        buffer2 = pass.window2[comparison_consumed..].to_vec();

        monitor.record(commit);
        if let Some(reason) = monitor.breach() {
            return Err(EngineError::TooDissimilar(reason));
        }

        if pass.reached_end {
            break;
        }

        state.note_commit(commit_len);

        if commit_len == 0 {
            if let Some(token) = shift_stuck_buffer(
                &mut buffer1,
                &mut buffer2,
                index1 < base.len(),
                index2 < comparison.len(),
            ) {
                monitor.record(std::slice::from_ref(&token));
                emit(vec![token])?;
                report.chunks_emitted += 1;
            }
        }
    }

    debug_assert!(buffer1.is_empty() && buffer2.is_empty());
    report.peak_window = state.peak_window();
    Ok(report)
}

/// Run the matcher over a window, growing it until a stable anchor appears,
/// an input runs dry, or the window cap is reached.
fn resolve_window<'a>(
    base: &[&'a str],
    comparison: &[&'a str],
    index1: usize,
    index2: usize,
    buffer1: &[&'a str],
    buffer2: &[&'a str],
    state: &mut DriverState,
) -> WindowPass<'a> {
    let remaining1 = base.len() - index1;
    let remaining2 = comparison.len() - index2;

    let mut window_size = state
        .dynamic_chunk_size()
        .max(buffer1.len())
        .max(buffer2.len());

    loop {
        let pulled1 = window_size.saturating_sub(buffer1.len()).min(remaining1);
        let pulled2 = window_size.saturating_sub(buffer2.len()).min(remaining2);

        let mut window1 = Vec::with_capacity(buffer1.len() + pulled1);
        window1.extend_from_slice(buffer1);
        window1.extend_from_slice(&base[index1..index1 + pulled1]);

        let mut window2 = Vec::with_capacity(buffer2.len() + pulled2);
        window2.extend_from_slice(buffer2);
        window2.extend_from_slice(&comparison[index2..index2 + pulled2]);

        state.note_window(window1.len(), window2.len());

        let tokens = matcher::diff(&window1, &window2);
        let last_stable = last_unchanged_index(&tokens);
        let reached_end =
            index1 + pulled1 >= base.len() && index2 + pulled2 >= comparison.len();
        let window_capped = window1.len() >= state.dynamic_max_window()
            || window2.len() >= state.dynamic_max_window();

        let can_grow = pulled1 < remaining1 || pulled2 < remaining2;
        if last_stable.is_some() || reached_end || window_capped || !can_grow {
            return WindowPass {
                window1,
                window2,
                tokens,
                last_stable,
                reached_end,
                pulled1,
                pulled2,
            };
        }

        window_size = (window_size + state.dynamic_step()).min(state.dynamic_max_window());
    }
}

fn last_unchanged_index(tokens: &[DiffToken]) -> Option<usize> {
    tokens.iter().rposition(|t| t.kind == TokenKind::Unchanged)
}

/// Forward-progress valve for a zero-commit iteration: move one token out of
/// a stuck carried buffer so the loop can never spin in place. The token is
/// emitted by the caller, not dropped, so output round-trips stay intact.
fn shift_stuck_buffer<'a>(
    buffer1: &mut Vec<&'a str>,
    buffer2: &mut Vec<&'a str>,
    base_has_slack: bool,
    comparison_has_slack: bool,
) -> Option<DiffToken> {
    if !buffer1.is_empty() && base_has_slack {
        Some(DiffToken::removed(buffer1.remove(0)))
    } else if !buffer2.is_empty() && comparison_has_slack {
        Some(DiffToken::added(buffer2.remove(0)))
    } else {
        None
    }
}
