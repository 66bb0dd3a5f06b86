use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::defaults::SERIAL_PATTERN_MAX_REPEAT;
use crate::args::{
    LoadArgs, PositiveU64, PositiveUsize, TlsVersion, parse_duration_arg, parse_header,
};
use crate::config::apply_config;
use crate::config::types::ConfigFile;
use crate::error::{AppError, AppResult};
use crate::payload::{PayloadBuilder, PayloadStrategy};
use crate::run::{RawRunConfig, RunConfig};

thread_local! {
    static BASE_MATCHES: ArgMatches = LoadArgs::command().get_matches_from(["edgeload"]);
}

/// Parses a header string in `Key: Value` format.
///
/// # Errors
///
/// Returns an error when the header is malformed.
pub fn parse_header_input(input: &str) -> AppResult<(String, String)> {
    parse_header(input).map_err(AppError::from)
}

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parse_duration_arg(input)
}

/// Parses a TLS version (e.g. `1.2`, `1.3`).
///
/// # Errors
///
/// Returns an error when the version is invalid.
pub fn parse_tls_version_input(input: &str) -> AppResult<TlsVersion> {
    input.parse::<TlsVersion>()
}

/// Parses a positive u64 string value.
///
/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_u64_input(input: &str) -> AppResult<u64> {
    let value: PositiveU64 = input.parse()?;
    Ok(value.get())
}

/// Parses a positive usize string value.
///
/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_usize_input(input: &str) -> AppResult<usize> {
    let value: PositiveUsize = input.parse()?;
    Ok(value.get())
}

/// Compiles a serial pattern and draws one serial from it.
///
/// # Errors
///
/// Returns an error when the pattern is invalid.
pub fn sample_serial_pattern_input(pattern: &str) -> AppResult<String> {
    let strategy = PayloadStrategy::pattern("1.0.0", pattern, SERIAL_PATTERN_MAX_REPEAT)?;
    Ok(PayloadBuilder::new(strategy).build(0).serial_number)
}

/// Parses TOML config, applies it to defaults and validates the result.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<()> {
    let config: ConfigFile = toml::from_str(input)?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config, applies it to defaults and validates the result.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<()> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<()> {
    BASE_MATCHES.with(|matches| {
        let mut args = LoadArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        RunConfig::try_from_raw(RawRunConfig::from(&args)).map(|_config| ())
    })
}
