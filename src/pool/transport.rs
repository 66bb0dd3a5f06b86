use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{HttpError, TransportError};

/// A completed HTTP exchange. Any status code counts as completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub status_code: u16,
    pub body: String,
}

/// One open transport a worker sends its requests over.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as `application/json`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response could be read.
    async fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Exchange, TransportError>;
}

/// Opens the transport behind a worker's connection handle.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    /// # Errors
    ///
    /// Returns an error when the transport cannot be created.
    fn open(&self, worker_id: usize) -> Result<Self::Transport, HttpError>;
}
