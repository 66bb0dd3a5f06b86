use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{AppResult, FailureKind, MetricsError};

use super::histogram::{LatencyHistogram, duration_ms};
use super::types::{LatencyStats, Outcome, OutcomeResult, OutcomeStream, Summary};

/// Running counters over observed outcomes.
#[derive(Debug, Clone)]
pub struct Tally {
    completed: u64,
    errors: u64,
    timeouts: u64,
    status_counts: BTreeMap<u16, u64>,
    failure_counts: BTreeMap<FailureKind, u64>,
    latency: LatencyHistogram,
    latency_sum_ms: u128,
}

impl Tally {
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            completed: 0,
            errors: 0,
            timeouts: 0,
            status_counts: BTreeMap::new(),
            failure_counts: BTreeMap::new(),
            latency: LatencyHistogram::new()?,
            latency_sum_ms: 0,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the latency cannot be recorded.
    pub fn record(&mut self, outcome: &Outcome) -> Result<(), MetricsError> {
        match &outcome.result {
            OutcomeResult::Completed { status_code, .. } => {
                self.completed = self.completed.saturating_add(1);
                let count = self.status_counts.entry(*status_code).or_insert(0);
                *count = count.saturating_add(1);
            }
            OutcomeResult::Failed { kind, .. } => {
                self.errors = self.errors.saturating_add(1);
                if *kind == FailureKind::Timeout {
                    self.timeouts = self.timeouts.saturating_add(1);
                }
                let count = self.failure_counts.entry(*kind).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
        self.latency_sum_ms = self
            .latency_sum_ms
            .saturating_add(u128::from(duration_ms(outcome.latency).max(1)));
        self.latency.record(outcome.latency)
    }

    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.completed.saturating_add(self.errors)
    }

    fn latency_stats(&self) -> LatencyStats {
        let count = self.latency.count();
        if count == 0 {
            return LatencyStats::default();
        }
        let (p50_ms, p90_ms, p99_ms) = self.latency.percentiles();
        let avg = self
            .latency_sum_ms
            .checked_div(u128::from(count))
            .unwrap_or(0);
        LatencyStats {
            min_ms: self.latency.min(),
            avg_ms: u64::try_from(avg).unwrap_or(u64::MAX),
            max_ms: self.latency.max(),
            p50_ms,
            p90_ms,
            p99_ms,
        }
    }
}

impl Summary {
    /// Pure summary computation over a finished tally.
    #[must_use]
    pub fn from_tally(tally: &Tally, elapsed: Duration) -> Self {
        let total_requests = tally.observed();
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            total_requests as f64 / secs
        } else {
            0.0
        };
        Self {
            total_requests,
            completed: tally.completed,
            errors: tally.errors,
            timeouts: tally.timeouts,
            status_counts: tally.status_counts.clone(),
            failure_counts: tally.failure_counts.clone(),
            latency: tally.latency_stats(),
            elapsed,
            throughput,
        }
    }
}

/// Tracks which request indices have reported.
///
/// Words are allocated up to the highest index seen so far, so memory follows
/// the outcomes actually received rather than the requested total.
#[derive(Debug)]
pub(super) struct SeenIndices {
    words: Vec<u64>,
    total: u64,
}

impl SeenIndices {
    pub(super) const fn new(total: u64) -> Self {
        Self {
            words: Vec::new(),
            total,
        }
    }

    pub(super) fn insert(&mut self, index: u64) -> Result<(), MetricsError> {
        let out_of_range = MetricsError::OutcomeOutOfRange {
            index,
            total: self.total,
        };
        if index >= self.total {
            return Err(out_of_range);
        }
        let Ok(slot) = usize::try_from(index / 64) else {
            return Err(out_of_range);
        };
        if slot >= self.words.len() {
            self.words.resize(slot.saturating_add(1), 0);
        }
        let Some(word) = self.words.get_mut(slot) else {
            return Err(out_of_range);
        };
        let mask = 1_u64.rotate_left((index % 64) as u32);
        if *word & mask != 0 {
            return Err(MetricsError::DuplicateOutcome { index });
        }
        *word |= mask;
        Ok(())
    }
}

/// Consumes the outcome stream until every expected index has reported.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    expected: u64,
    print_outcomes: bool,
}

impl Aggregator {
    #[must_use]
    pub const fn new(expected: u64) -> Self {
        Self {
            expected,
            print_outcomes: false,
        }
    }

    #[must_use]
    pub const fn with_print_outcomes(mut self, print_outcomes: bool) -> Self {
        self.print_outcomes = print_outcomes;
        self
    }

    /// Blocks until `expected` outcomes arrived, then summarises the run
    /// measured from `started`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream closes early, an index repeats or
    /// falls outside the run, or the histogram fails.
    pub async fn collect(&self, mut stream: OutcomeStream, started: Instant) -> AppResult<Summary> {
        let mut tally = Tally::new()?;
        let mut seen = SeenIndices::new(self.expected);
        let progress_step = (self.expected / 10).max(1);

        while tally.observed() < self.expected {
            let Some(outcome) = stream.recv().await else {
                return Err(MetricsError::OutcomesMissing {
                    expected: self.expected,
                    observed: tally.observed(),
                }
                .into());
            };
            seen.insert(outcome.index)?;
            tally.record(&outcome)?;
            if self.print_outcomes {
                println!("{}", outcome.describe());
            }
            let observed = tally.observed();
            if observed.checked_rem(progress_step) == Some(0) {
                debug!("Progress: {}/{} outcomes", observed, self.expected);
            }
        }

        let elapsed = started.elapsed();
        Ok(Summary::from_tally(&tally, elapsed))
    }
}
