use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS_PER_WORKER,
    DEFAULT_PAYLOAD_VERSION, DEFAULT_REQUESTS, DEFAULT_SERIAL_PREFIX, DEFAULT_STATIC_SERIAL,
    DEFAULT_TIMEOUT,
};
use super::parsers::{
    parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize, parse_tls_version,
};
use super::types::{OutputFormat, PayloadKind, PositiveU64, PositiveUsize, TlsVersion};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Bounded-concurrency HTTP load generator: fixed worker pool, per-worker keep-alive connections, completion-ordered throughput summary."
)]
pub struct LoadArgs {
    /// Target URL (JSON bodies are POSTed here)
    #[arg(long, short, env = "EDGELOAD_URL")]
    pub url: Option<String>,

    /// Named target from the config file's [targets] table
    #[arg(long = "target")]
    pub target: Option<String>,

    /// Total number of requests to send
    #[arg(
        long = "requests",
        short = 'n',
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Number of concurrent workers
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Skip TLS certificate validation (self-signed test targets only)
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// Minimum TLS version (1.0, 1.1, 1.2, 1.3)
    #[arg(long = "tls-min", value_parser = parse_tls_version)]
    pub tls_min: Option<TlsVersion>,

    /// Maximum TLS version (1.0, 1.1, 1.2, 1.3)
    #[arg(long = "tls-max", value_parser = parse_tls_version)]
    pub tls_max: Option<TlsVersion>,

    /// Live connections a worker may hold at once
    #[arg(
        long = "max-connections-per-worker",
        default_value = DEFAULT_MAX_CONNECTIONS_PER_WORKER,
        value_parser = parse_positive_usize
    )]
    pub max_connections_per_worker: PositiveUsize,

    /// Idle connections kept per worker (defaults to --max-connections-per-worker)
    #[arg(long = "pool-size", value_parser = parse_positive_usize)]
    pub pool_size: Option<PositiveUsize>,

    /// Fail the request instead of waiting when all of a worker's connections are busy
    #[arg(long = "no-pool-block")]
    pub no_pool_block: bool,

    /// Payload strategy
    #[arg(long = "payload", default_value = "random", ignore_case = true)]
    pub payload: PayloadKind,

    /// Value of the `version` field
    #[arg(long = "payload-version", default_value = DEFAULT_PAYLOAD_VERSION)]
    pub payload_version: String,

    /// Serial number used by the static payload
    #[arg(long = "serial", default_value = DEFAULT_STATIC_SERIAL)]
    pub serial: String,

    /// Prefix for randomized serial numbers (PREFIX-XXXXXXXX)
    #[arg(long = "serial-prefix", default_value = DEFAULT_SERIAL_PREFIX)]
    pub serial_prefix: String,

    /// Regular expression serial numbers are sampled from (with --payload pattern)
    #[arg(long = "serial-pattern")]
    pub serial_pattern: Option<String>,

    /// Extra HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Print every outcome as it completes
    #[arg(long = "print-outcomes")]
    pub print_outcomes: bool,

    /// Summary format
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Write the summary to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./edgeload.toml or ./edgeload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by EDGELOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
