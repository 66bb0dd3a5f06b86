//! Fixed-size worker pool pulling request indices from a shared queue.
mod queue;
mod worker;


use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::AppResult;
use crate::metrics::{OutcomeStream, outcome_channel};
use crate::payload::PayloadBuilder;
use crate::pool::{ConnectionPool, Connector};

pub use queue::WorkQueue;
pub use worker::WorkerReport;

use worker::{WorkerContext, run_worker};

/// What the dispatcher needs from a validated run configuration.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub url: Url,
    pub total_requests: PositiveU64,
    pub concurrency: PositiveUsize,
    pub timeout: Duration,
}

/// Join handles of every spawned worker.
#[derive(Debug)]
pub struct WorkerSet {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker and returns their reports in worker-id order.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker task panicked or was cancelled.
    pub async fn join(self) -> AppResult<Vec<WorkerReport>> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for joined in join_all(self.handles).await {
            reports.push(joined?);
        }
        Ok(reports)
    }
}

/// Upper bound on buffered outcomes, whatever the worker count.
const MAX_OUTCOME_BUFFER: usize = 1 << 16;

/// Twice the number of workers that can have an item in flight.
fn channel_capacity(concurrency: usize, total_requests: u64) -> usize {
    let busy = usize::try_from(total_requests).map_or(concurrency, |total| concurrency.min(total));
    busy.saturating_mul(2).clamp(1, MAX_OUTCOME_BUFFER)
}

/// A started run: the completion-ordered outcomes and the workers feeding them.
#[derive(Debug)]
pub struct Dispatch {
    pub outcomes: OutcomeStream,
    pub workers: WorkerSet,
}

/// Spawns exactly `concurrency` workers on the current tokio runtime.
///
/// Every index in `0..total_requests` yields exactly one outcome; the
/// stream closes once the last worker exits.
pub fn run<C: Connector>(
    settings: &DispatchSettings,
    builder: &Arc<PayloadBuilder>,
    pool: &Arc<ConnectionPool<C>>,
) -> Dispatch {
    let concurrency = settings.concurrency.get();
    let queue = Arc::new(WorkQueue::new(settings.total_requests.get()));
    let url = Arc::new(settings.url.clone());
    let (outcomes_tx, outcomes) = outcome_channel(channel_capacity(
        concurrency,
        settings.total_requests.get(),
    ));

    let mut handles = Vec::with_capacity(concurrency);
    for worker_id in 0..concurrency {
        let ctx = WorkerContext {
            queue: Arc::clone(&queue),
            pool: Arc::clone(pool),
            builder: Arc::clone(builder),
            url: Arc::clone(&url),
            timeout: settings.timeout,
            outcomes_tx: outcomes_tx.clone(),
        };
        handles.push(tokio::spawn(run_worker(worker_id, ctx)));
    }
    drop(outcomes_tx);

    debug!(
        "Dispatched {} requests across {} workers",
        queue.total(),
        handles.len()
    );

    Dispatch {
        outcomes,
        workers: WorkerSet { handles },
    }
}
