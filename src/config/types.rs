use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, PayloadKind, TlsVersion, parse_duration_arg};
use crate::error::{AppError, AppResult, ConfigError};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    /// Name of an entry in `targets`.
    pub target: Option<String>,
    pub targets: Option<BTreeMap<String, String>>,
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub insecure: Option<bool>,
    pub tls_min: Option<TlsVersion>,
    pub tls_max: Option<TlsVersion>,
    pub max_connections_per_worker: Option<usize>,
    pub pool_size: Option<usize>,
    pub pool_block: Option<bool>,
    pub headers: Option<Vec<String>>,
    pub print_outcomes: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub payload: Option<PayloadConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PayloadConfig {
    pub strategy: Option<PayloadKind>,
    pub version: Option<String>,
    pub serial: Option<String>,
    pub serial_prefix: Option<String>,
    pub serial_pattern: Option<String>,
}

/// Either a bare number of seconds or a suffixed string such as `250ms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> AppResult<Duration> {
        let parsed = match self {
            DurationValue::Seconds(secs) => parse_duration_arg(&secs.to_string()),
            DurationValue::Text(text) => parse_duration_arg(text),
        };
        parsed.map_err(|err| {
            if let AppError::Validation(source) = err {
                AppError::config(ConfigError::InvalidDuration { field, source })
            } else {
                err
            }
        })
    }
}
