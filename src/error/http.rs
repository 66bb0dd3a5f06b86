use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Worker {worker_id} already holds a connection handle.")]
    HandleAlreadyIssued { worker_id: usize },
    #[error("Connector refused to open a connection for worker {worker_id}: {message}")]
    ConnectorRefused { worker_id: usize, message: String },
}

/// Coarse classification of a failed exchange, used for summary counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    Timeout,
    Connect,
    Protocol,
    PoolExhausted,
    Payload,
    Other,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Protocol => "protocol",
            FailureKind::PoolExhausted => "pool-exhausted",
            FailureKind::Payload => "payload",
            FailureKind::Other => "transport",
        }
    }
}

/// A single exchange that did not produce an HTTP response.
///
/// These never abort a run; workers fold them into error outcomes.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out after {}ms.", after.as_millis())]
    Timeout { after: Duration },
    #[error("Connection failed: {message}")]
    Connect { message: String },
    #[error("Malformed response: {message}")]
    Protocol { message: String },
    #[error("All {limit} connection slot(s) of this worker are busy.")]
    PoolExhausted { limit: usize },
    #[error("Failed to encode payload: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },
    #[error("Transport error: {message}")]
    Other { message: String },
}

impl TransportError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            TransportError::Timeout { .. } => FailureKind::Timeout,
            TransportError::Connect { .. } => FailureKind::Connect,
            TransportError::Protocol { .. } => FailureKind::Protocol,
            TransportError::PoolExhausted { .. } => FailureKind::PoolExhausted,
            TransportError::Payload { .. } => FailureKind::Payload,
            TransportError::Other { .. } => FailureKind::Other,
        }
    }

    /// Classifies a `reqwest` failure.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout { after: timeout };
        }
        if err.is_connect() {
            return TransportError::Connect {
                message: err.to_string(),
            };
        }
        if err.is_decode() || err.is_body() {
            return TransportError::Protocol {
                message: err.to_string(),
            };
        }
        TransportError::Other {
            message: err.to_string(),
        }
    }
}
