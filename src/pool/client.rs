use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    redirect,
};
use tracing::{debug, warn};
use url::Url;

use crate::args::defaults::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError, TransportError, ValidationError};

use super::PoolSettings;
use super::tls::apply_tls_settings;
use super::transport::{Connector, Exchange, Transport};

/// Connector backed by `reqwest`; one client (and so one idle pool) per handle.
#[derive(Debug, Clone)]
pub struct ReqwestConnector {
    settings: PoolSettings,
    headers: HeaderMap,
}

impl ReqwestConnector {
    /// Validates the settings and builds a probe client so that TLS backend
    /// or header problems surface before any worker starts.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid headers, TLS bounds, or when the HTTP
    /// client cannot be built.
    pub fn new(settings: &PoolSettings) -> AppResult<Self> {
        settings.validate().map_err(AppError::validation)?;
        let headers = build_header_map(&settings.headers)?;
        let connector = Self {
            settings: settings.clone(),
            headers,
        };
        connector.build_client().map_err(AppError::http)?;
        if !settings.verify_tls {
            warn!("TLS certificate validation is disabled (--insecure).");
        }
        Ok(connector)
    }

    fn build_client(&self) -> Result<Client, HttpError> {
        let builder = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(self.headers.clone())
            .redirect(redirect::Policy::none())
            .connect_timeout(self.settings.connect_timeout)
            .pool_max_idle_per_host(self.settings.pool_size.get())
            .tcp_nodelay(true);
        apply_tls_settings(builder, &self.settings)
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })
    }
}

impl Connector for ReqwestConnector {
    type Transport = ReqwestTransport;

    fn open(&self, worker_id: usize) -> Result<ReqwestTransport, HttpError> {
        let client = self.build_client()?;
        debug!("Opened HTTP client for worker {}", worker_id);
        Ok(ReqwestTransport { client })
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Exchange, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, timeout))?;
        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, timeout))?;
        Ok(Exchange { status_code, body })
    }
}

pub(crate) fn build_header_map(headers: &[(String, String)]) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderName {
                header: key.clone(),
                source: err,
            })
        })?;
        let val = HeaderValue::from_str(value).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderValue {
                header: key.clone(),
                source: err,
            })
        })?;
        map.append(name, val);
    }
    Ok(map)
}
