use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FailureKind, TransportError};
use crate::metrics::{Outcome, OutcomeResult};
use crate::payload::PayloadBuilder;
use crate::pool::{ConnectionHandle, ConnectionPool, Connector, Exchange};

use super::queue::WorkQueue;

/// What one worker did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub served: u64,
    pub failed: u64,
    /// Whether the worker ever held a connection handle.
    pub connected: bool,
}

pub(super) struct WorkerContext<C: Connector> {
    pub(super) queue: Arc<WorkQueue>,
    pub(super) pool: Arc<ConnectionPool<C>>,
    pub(super) builder: Arc<PayloadBuilder>,
    pub(super) url: Arc<Url>,
    pub(super) timeout: Duration,
    pub(super) outcomes_tx: mpsc::Sender<Outcome>,
}

pub(super) async fn run_worker<C: Connector>(worker_id: usize, ctx: WorkerContext<C>) -> WorkerReport {
    let mut report = WorkerReport {
        worker_id,
        ..WorkerReport::default()
    };
    let mut handle: Option<ConnectionHandle<C::Transport>> = None;

    while let Some(index) = ctx.queue.next_index() {
        let started = Instant::now();

        if handle.is_none() {
            match ctx.pool.acquire_handle(worker_id) {
                Ok(acquired) => {
                    debug!("Worker {} opened its connection handle", acquired.worker_id());
                    report.connected = true;
                    handle = Some(acquired);
                }
                Err(err) => {
                    warn!("Worker {} could not open a connection: {}", worker_id, err);
                    let result = OutcomeResult::Failed {
                        kind: FailureKind::Connect,
                        error: err.to_string(),
                    };
                    report.failed = report.failed.saturating_add(1);
                    let outcome = Outcome::new(index, worker_id, started.elapsed(), result);
                    if ctx.outcomes_tx.send(outcome).await.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }
        let Some(bound) = handle.as_ref() else {
            continue;
        };

        let result = execute_item(bound, &ctx, index).await;
        if result.is_ok() {
            report.served = report.served.saturating_add(1);
        } else {
            report.failed = report.failed.saturating_add(1);
        }
        let outcome = Outcome::new(index, worker_id, started.elapsed(), result.into());
        if ctx.outcomes_tx.send(outcome).await.is_err() {
            warn!("Worker {} stopping: outcome stream closed", worker_id);
            break;
        }
    }

    debug!(
        "Worker {} finished: served={} failed={} connected={}",
        report.worker_id, report.served, report.failed, report.connected
    );
    report
}

async fn execute_item<C: Connector>(
    handle: &ConnectionHandle<C::Transport>,
    ctx: &WorkerContext<C>,
    index: u64,
) -> Result<Exchange, TransportError> {
    let body = ctx
        .builder
        .encode(index)
        .map_err(|err| TransportError::Payload { source: err })?;
    handle.exchange(&ctx.url, body, ctx.timeout).await
}
