//! Run controller: validated configuration in, summary out.
mod settings;


use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::dispatch;
use crate::error::AppResult;
use crate::metrics::{Aggregator, Summary};
use crate::payload::PayloadBuilder;
use crate::pool::{ConnectionPool, Connector};

pub use settings::{RawRunConfig, RunConfig};

/// Drives one load run over a validated [`RunConfig`].
#[derive(Debug, Clone)]
pub struct RunController {
    config: RunConfig,
}

impl RunController {
    #[must_use]
    pub const fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Sends every request through `connector` and waits for all outcomes.
    ///
    /// Request failures are counted in the summary, never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when outcome aggregation breaks an invariant or
    /// a worker task panics.
    pub async fn run<C: Connector>(&self, connector: C) -> AppResult<Summary> {
        let config = &self.config;
        let pool = Arc::new(ConnectionPool::new(connector, config.pool().clone()));
        let builder = Arc::new(PayloadBuilder::new(config.payload().clone()));
        let aggregator = Aggregator::new(config.total_requests().get())
            .with_print_outcomes(config.print_outcomes());

        info!(
            "Sending {} requests to {} with {} workers ({} payload)",
            config.total_requests().get(),
            config.url(),
            config.concurrency().get(),
            config.payload().label()
        );

        let started = Instant::now();
        let dispatch::Dispatch { outcomes, workers } =
            dispatch::run(&config.dispatch_settings(), &builder, &pool);
        let summary = aggregator.collect(outcomes, started).await?;
        let reports = workers.join().await?;

        let connected = reports.iter().filter(|report| report.connected).count();
        debug!(
            "{} of {} workers connected; {} handles issued",
            connected,
            reports.len(),
            pool.issued()
        );
        Ok(summary)
    }
}

/// Validates `raw` and runs it.
///
/// # Errors
///
/// Returns a configuration error before any connector call when `raw` is
/// invalid, otherwise whatever [`RunController::run`] returns.
pub async fn execute<C: Connector>(raw: RawRunConfig, connector: C) -> AppResult<Summary> {
    let config = RunConfig::try_from_raw(raw)?;
    RunController::new(config).run(connector).await
}
