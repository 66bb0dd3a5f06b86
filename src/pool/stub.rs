//! In-process transports for tests; no sockets involved.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{HttpError, TransportError};

use super::transport::{Connector, Exchange, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StubBehavior {
    /// Answer every exchange with `status` and body `ok` after `delay`.
    Respond { status: u16, delay: Duration },
    /// Never answer.
    Hang,
    /// Fail the first exchange of each transport, then answer 200.
    FailFirst,
}

#[derive(Debug, Default)]
pub(crate) struct StubCounters {
    opens: AtomicUsize,
    calls: AtomicUsize,
    refuse_opens: AtomicUsize,
}

impl StubCounters {
    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StubConnector {
    behavior: StubBehavior,
    counters: Arc<StubCounters>,
}

impl StubConnector {
    pub(crate) fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(StubCounters::default()),
        }
    }

    pub(crate) fn ok() -> Self {
        Self::new(StubBehavior::Respond {
            status: 200,
            delay: Duration::ZERO,
        })
    }

    /// Refuse the next `count` open attempts.
    pub(crate) fn refusing_first(self, count: usize) -> Self {
        self.counters.refuse_opens.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn counters(&self) -> Arc<StubCounters> {
        Arc::clone(&self.counters)
    }
}

impl Connector for StubConnector {
    type Transport = StubTransport;

    fn open(&self, worker_id: usize) -> Result<StubTransport, HttpError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .counters
            .refuse_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(HttpError::ConnectorRefused {
                worker_id,
                message: "stub refused".to_owned(),
            });
        }
        Ok(StubTransport {
            behavior: self.behavior,
            counters: Arc::clone(&self.counters),
            local_calls: AtomicUsize::new(0),
        })
    }
}

#[derive(Debug)]
pub(crate) struct StubTransport {
    behavior: StubBehavior,
    counters: Arc<StubCounters>,
    local_calls: AtomicUsize,
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_json(
        &self,
        _url: &Url,
        _body: Vec<u8>,
        _timeout: Duration,
    ) -> Result<Exchange, TransportError> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        let local = self.local_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            StubBehavior::Respond { status, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(Exchange {
                    status_code: status,
                    body: "ok".to_owned(),
                })
            }
            StubBehavior::Hang => std::future::pending().await,
            StubBehavior::FailFirst => {
                if local == 0 {
                    Err(TransportError::Connect {
                        message: "connection reset".to_owned(),
                    })
                } else {
                    Ok(Exchange {
                        status_code: 200,
                        body: "ok".to_owned(),
                    })
                }
            }
        }
    }
}
