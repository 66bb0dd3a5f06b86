use std::time::Duration;

use url::Url;

use crate::args::defaults::{
    DEFAULT_PAYLOAD_VERSION, DEFAULT_SERIAL_PREFIX, DEFAULT_STATIC_SERIAL, MAX_CONCURRENCY,
    SERIAL_PATTERN_MAX_REPEAT,
};
use crate::args::{LoadArgs, PayloadKind, PositiveU64, PositiveUsize, TlsVersion};
use crate::dispatch::DispatchSettings;
use crate::error::{AppError, AppResult, ValidationError};
use crate::payload::{PayloadStrategy, RequestPayload};
use crate::pool::{PoolSettings, build_header_map};

const DEFAULT_TOTAL_REQUESTS: u64 = 10_000;
const DEFAULT_CONCURRENCY: usize = 20;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Unvalidated run parameters, as gathered from the CLI, a config file or
/// a caller embedding the library.
#[derive(Debug, Clone)]
pub struct RawRunConfig {
    pub url: Option<String>,
    pub total_requests: u64,
    pub concurrency: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub verify_tls: bool,
    pub tls_min: Option<TlsVersion>,
    pub tls_max: Option<TlsVersion>,
    pub max_connections_per_worker: usize,
    pub pool_size: Option<usize>,
    pub block_on_overflow: bool,
    pub headers: Vec<(String, String)>,
    pub payload: PayloadKind,
    pub payload_version: String,
    pub serial: String,
    pub serial_prefix: String,
    pub serial_pattern: Option<String>,
    pub print_outcomes: bool,
}

impl Default for RawRunConfig {
    fn default() -> Self {
        Self {
            url: None,
            total_requests: DEFAULT_TOTAL_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            verify_tls: true,
            tls_min: None,
            tls_max: None,
            max_connections_per_worker: 1,
            pool_size: None,
            block_on_overflow: true,
            headers: Vec::new(),
            payload: PayloadKind::Random,
            payload_version: DEFAULT_PAYLOAD_VERSION.to_owned(),
            serial: DEFAULT_STATIC_SERIAL.to_owned(),
            serial_prefix: DEFAULT_SERIAL_PREFIX.to_owned(),
            serial_pattern: None,
            print_outcomes: false,
        }
    }
}

impl From<&LoadArgs> for RawRunConfig {
    fn from(args: &LoadArgs) -> Self {
        Self {
            url: args.url.clone(),
            total_requests: args.requests.get(),
            concurrency: args.concurrency.get(),
            timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            verify_tls: !args.insecure,
            tls_min: args.tls_min,
            tls_max: args.tls_max,
            max_connections_per_worker: args.max_connections_per_worker.get(),
            pool_size: args.pool_size.map(PositiveUsize::get),
            block_on_overflow: !args.no_pool_block,
            headers: args.headers.clone(),
            payload: args.payload,
            payload_version: args.payload_version.clone(),
            serial: args.serial.clone(),
            serial_prefix: args.serial_prefix.clone(),
            serial_pattern: args.serial_pattern.clone(),
            print_outcomes: args.print_outcomes,
        }
    }
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    url: Url,
    total_requests: PositiveU64,
    concurrency: PositiveUsize,
    timeout: Duration,
    payload: PayloadStrategy,
    pool: PoolSettings,
    print_outcomes: bool,
}

impl RunConfig {
    /// Validates every field; nothing is opened or spawned.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero counts, a concurrency above
    /// the supported ceiling, a missing or
    /// non-http(s) URL, a zero timeout, invalid headers, inverted TLS
    /// bounds, a pool size below the connection cap, or a bad payload
    /// strategy.
    pub fn try_from_raw(raw: RawRunConfig) -> AppResult<Self> {
        let total_requests = positive_u64("requests", raw.total_requests)?;
        let concurrency = positive_usize("concurrency", raw.concurrency)?;
        if concurrency.get() > MAX_CONCURRENCY {
            return Err(AppError::validation(ValidationError::FieldTooLarge {
                field: "concurrency",
                value: u64::try_from(concurrency.get()).unwrap_or(u64::MAX),
                max: u64::try_from(MAX_CONCURRENCY).unwrap_or(u64::MAX),
            }));
        }
        let max_connections_per_worker =
            positive_usize("max_connections_per_worker", raw.max_connections_per_worker)?;
        let pool_size = match raw.pool_size {
            Some(size) => positive_usize("pool_size", size)?,
            None => max_connections_per_worker,
        };
        if raw.timeout.is_zero() || raw.connect_timeout.is_zero() {
            return Err(AppError::validation(ValidationError::DurationZero));
        }

        let url = parse_target_url(raw.url.as_deref())?;
        build_header_map(&raw.headers)?;

        let pool = PoolSettings {
            max_connections_per_worker,
            pool_size,
            block_on_overflow: raw.block_on_overflow,
            verify_tls: raw.verify_tls,
            tls_min: raw.tls_min,
            tls_max: raw.tls_max,
            connect_timeout: raw.connect_timeout,
            headers: raw.headers,
        };
        pool.validate().map_err(AppError::validation)?;

        let payload = match raw.payload {
            PayloadKind::Static => {
                PayloadStrategy::Static(RequestPayload::new(raw.payload_version, raw.serial))
            }
            PayloadKind::Random => {
                PayloadStrategy::randomized(raw.payload_version, raw.serial_prefix)?
            }
            PayloadKind::Pattern => {
                let pattern = raw
                    .serial_pattern
                    .ok_or_else(|| AppError::validation(ValidationError::SerialPatternMissing))?;
                PayloadStrategy::pattern(raw.payload_version, &pattern, SERIAL_PATTERN_MAX_REPEAT)?
            }
        };

        Ok(Self {
            url,
            total_requests,
            concurrency,
            timeout: raw.timeout,
            payload,
            pool,
            print_outcomes: raw.print_outcomes,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn total_requests(&self) -> PositiveU64 {
        self.total_requests
    }

    #[must_use]
    pub const fn concurrency(&self) -> PositiveUsize {
        self.concurrency
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn payload(&self) -> &PayloadStrategy {
        &self.payload
    }

    #[must_use]
    pub const fn pool(&self) -> &PoolSettings {
        &self.pool
    }

    #[must_use]
    pub const fn print_outcomes(&self) -> bool {
        self.print_outcomes
    }

    #[must_use]
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            url: self.url.clone(),
            total_requests: self.total_requests,
            concurrency: self.concurrency,
            timeout: self.timeout,
        }
    }
}

impl TryFrom<RawRunConfig> for RunConfig {
    type Error = AppError;

    fn try_from(raw: RawRunConfig) -> Result<Self, Self::Error> {
        RunConfig::try_from_raw(raw)
    }
}

fn positive_u64(field: &'static str, value: u64) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value)
        .map_err(|_zero| AppError::validation(ValidationError::FieldMustBePositive { field }))
}

fn positive_usize(field: &'static str, value: usize) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|_zero| AppError::validation(ValidationError::FieldMustBePositive { field }))
}

fn parse_target_url(raw: Option<&str>) -> AppResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    let url = Url::parse(raw).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::validation(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            }));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(ValidationError::UrlMissingHost));
    }
    Ok(url)
}
