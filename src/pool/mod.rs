//! Per-worker connection handles and the connector seam behind them.
mod client;
mod tls;
mod transport;

#[cfg(test)]
pub(crate) mod stub;


use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::args::{PositiveUsize, TlsVersion};
use crate::error::{AppError, AppResult, HttpError, TransportError, ValidationError};

pub use client::{ReqwestConnector, ReqwestTransport};
pub(crate) use client::build_header_map;
pub(crate) use tls::validate_tls_bounds;
pub use transport::{Connector, Exchange, Transport};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection limits and client options shared by every handle of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// In-flight exchanges one handle allows.
    pub max_connections_per_worker: PositiveUsize,
    /// Idle connections a handle keeps alive between exchanges.
    pub pool_size: PositiveUsize,
    /// Wait for a free slot (`true`) or fail the exchange at once.
    pub block_on_overflow: bool,
    pub verify_tls: bool,
    pub tls_min: Option<TlsVersion>,
    pub tls_max: Option<TlsVersion>,
    pub connect_timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections_per_worker: PositiveUsize::ONE,
            pool_size: PositiveUsize::ONE,
            block_on_overflow: true,
            verify_tls: true,
            tls_min: None,
            tls_max: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            headers: Vec::new(),
        }
    }
}

impl PoolSettings {
    /// # Errors
    ///
    /// Returns an error when the pool size is below the connection cap or
    /// the TLS bounds are inverted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pool_size.get() < self.max_connections_per_worker.get() {
            return Err(ValidationError::PoolSizeBelowConnectionCap {
                pool_size: self.pool_size.get(),
                max_connections: self.max_connections_per_worker.get(),
            });
        }
        validate_tls_bounds(self.tls_min, self.tls_max)
    }
}

/// Hands out one [`ConnectionHandle`] per worker id.
#[derive(Debug)]
pub struct ConnectionPool<C: Connector> {
    connector: C,
    settings: PoolSettings,
    issued: Mutex<BTreeSet<usize>>,
}

impl<C: Connector> ConnectionPool<C> {
    #[must_use]
    pub const fn new(connector: C, settings: PoolSettings) -> Self {
        Self {
            connector,
            settings,
            issued: Mutex::new(BTreeSet::new()),
        }
    }

    /// Opens the handle bound to `worker_id`.
    ///
    /// The id is reserved before the connector runs and the lock is released
    /// while it opens, so workers open their transports in parallel. A failed
    /// open drops the reservation and the worker may try again.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker already holds a handle or the
    /// connector cannot open a transport.
    pub fn acquire_handle(&self, worker_id: usize) -> AppResult<ConnectionHandle<C::Transport>> {
        if !self.lock_issued().insert(worker_id) {
            return Err(AppError::http(HttpError::HandleAlreadyIssued { worker_id }));
        }
        match self.connector.open(worker_id) {
            Ok(transport) => Ok(ConnectionHandle::new(worker_id, transport, &self.settings)),
            Err(err) => {
                self.lock_issued().remove(&worker_id);
                Err(AppError::http(err))
            }
        }
    }

    /// Number of handles opened or being opened.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.lock_issued().len()
    }

    fn lock_issued(&self) -> MutexGuard<'_, BTreeSet<usize>> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A worker's reusable connection slot.
///
/// Not `Clone`; each worker task owns its handle.
#[derive(Debug)]
pub struct ConnectionHandle<T: Transport> {
    worker_id: usize,
    transport: T,
    slots: Semaphore,
    capacity: usize,
    block_on_overflow: bool,
    served: AtomicU64,
}

impl<T: Transport> ConnectionHandle<T> {
    fn new(worker_id: usize, transport: T, settings: &PoolSettings) -> Self {
        let capacity = settings.max_connections_per_worker.get();
        Self {
            worker_id,
            transport,
            slots: Semaphore::new(capacity),
            capacity,
            block_on_overflow: settings.block_on_overflow,
            served: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Exchanges that produced an HTTP response.
    #[must_use]
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    /// POSTs `body` within `timeout`, holding one slot for the duration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::PoolExhausted`] when every slot is busy and
    /// the handle does not block, [`TransportError::Timeout`] when the
    /// exchange outlives `timeout`, or whatever the transport reports.
    pub async fn exchange(
        &self,
        url: &Url,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Exchange, TransportError> {
        let _permit = if self.block_on_overflow {
            self.slots
                .acquire()
                .await
                .map_err(|_closed| TransportError::PoolExhausted {
                    limit: self.capacity,
                })?
        } else {
            self.slots
                .try_acquire()
                .map_err(|_busy| TransportError::PoolExhausted {
                    limit: self.capacity,
                })?
        };

        let exchange = tokio::time::timeout(timeout, self.transport.post_json(url, body, timeout))
            .await
            .map_err(|_elapsed| TransportError::Timeout { after: timeout })??;
        self.served.fetch_add(1, Ordering::Relaxed);
        Ok(exchange)
    }
}
