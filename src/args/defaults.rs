/// Request count of a full keep-alive benchmark run.
pub(crate) const DEFAULT_REQUESTS: &str = "10000";
pub(crate) const DEFAULT_CONCURRENCY: &str = "20";
pub(crate) const DEFAULT_TIMEOUT: &str = "10s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
/// One live connection per worker forces strict keep-alive reuse.
pub(crate) const DEFAULT_MAX_CONNECTIONS_PER_WORKER: &str = "1";
pub(crate) const DEFAULT_PAYLOAD_VERSION: &str = "1.0.0";
pub(crate) const DEFAULT_STATIC_SERIAL: &str = "RED-AAAAAABB";
pub(crate) const DEFAULT_SERIAL_PREFIX: &str = "RED";
/// Upper bound on `--concurrency`; each worker is a task with its own client.
pub(crate) const MAX_CONCURRENCY: usize = 65_536;
/// Bound on repetition operators when sampling `--serial-pattern`.
pub(crate) const SERIAL_PATTERN_MAX_REPEAT: u32 = 16;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("edgeload/", env!("CARGO_PKG_VERSION"));

/// Config files probed when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["edgeload.toml", "edgeload.json"];
