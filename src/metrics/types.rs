use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{FailureKind, TransportError};
use crate::pool::Exchange;

/// Result of one work item, produced exactly once per index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub index: u64,
    pub worker_id: usize,
    pub latency: Duration,
    pub result: OutcomeResult,
}

impl Outcome {
    #[must_use]
    pub const fn new(index: u64, worker_id: usize, latency: Duration, result: OutcomeResult) -> Self {
        Self {
            index,
            worker_id,
            latency,
            result,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.result, OutcomeResult::Completed { .. })
    }

    /// One-line rendering used by `--print-outcomes`.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.result {
            OutcomeResult::Completed { status_code, body } => {
                format!("OK: {} {}", status_code, body)
            }
            OutcomeResult::Failed { error, .. } => format!("Error: {}", error),
        }
    }
}

/// Any HTTP status counts as completed; only transport-level failures fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeResult {
    Completed { status_code: u16, body: String },
    Failed { kind: FailureKind, error: String },
}

impl OutcomeResult {
    #[must_use]
    pub fn failed(err: &TransportError) -> Self {
        OutcomeResult::Failed {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

impl From<Result<Exchange, TransportError>> for OutcomeResult {
    fn from(result: Result<Exchange, TransportError>) -> Self {
        match result {
            Ok(exchange) => OutcomeResult::Completed {
                status_code: exchange.status_code,
                body: exchange.body,
            },
            Err(err) => OutcomeResult::failed(&err),
        }
    }
}

/// Receiving end of the completion-ordered outcome channel.
#[derive(Debug)]
pub struct OutcomeStream {
    rx: mpsc::Receiver<Outcome>,
}

impl OutcomeStream {
    pub async fn recv(&mut self) -> Option<Outcome> {
        self.rx.recv().await
    }
}

/// Bounded outcome channel; `capacity` is clamped to at least 1.
#[must_use]
pub fn outcome_channel(capacity: usize) -> (mpsc::Sender<Outcome>, OutcomeStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, OutcomeStream { rx })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub min_ms: u64,
    pub avg_ms: u64,
    pub max_ms: u64,
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p99_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_requests: u64,
    pub completed: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub status_counts: BTreeMap<u16, u64>,
    pub failure_counts: BTreeMap<FailureKind, u64>,
    pub latency: LatencyStats,
    pub elapsed: Duration,
    /// Requests per second over the whole run.
    pub throughput: f64,
}
