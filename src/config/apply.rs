use std::collections::BTreeMap;

use clap::ArgMatches;
use clap::parser::ValueSource;
use tracing::warn;

use crate::args::{LoadArgs, PositiveU64, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, PayloadConfig};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line win; config values replace clap
/// defaults. `--target`/`target` resolve through the `[targets]` table.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    apply_target(args, matches, config)?;

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration("timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout.to_duration("connect_timeout")?;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "tls_min")
        && let Some(version) = config.tls_min
    {
        args.tls_min = Some(version);
    }

    if !is_cli(matches, "tls_max")
        && let Some(version) = config.tls_max
    {
        args.tls_max = Some(version);
    }

    if !is_cli(matches, "max_connections_per_worker")
        && let Some(value) = config.max_connections_per_worker
    {
        args.max_connections_per_worker =
            ensure_positive_usize(value, "max_connections_per_worker")?;
    }

    if !is_cli(matches, "pool_size")
        && let Some(value) = config.pool_size
    {
        args.pool_size = Some(ensure_positive_usize(value, "pool_size")?);
    }

    if !is_cli(matches, "no_pool_block")
        && let Some(block) = config.pool_block
    {
        args.no_pool_block = !block;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "print_outcomes")
        && let Some(print) = config.print_outcomes
    {
        args.print_outcomes = print;
    }

    if !is_cli(matches, "output")
        && let Some(output) = config.output.clone()
    {
        args.output = Some(output);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if let Some(payload) = config.payload.as_ref() {
        apply_payload(args, matches, payload);
    }

    Ok(())
}

fn apply_payload(args: &mut LoadArgs, matches: &ArgMatches, payload: &PayloadConfig) {
    if !is_cli(matches, "payload")
        && let Some(strategy) = payload.strategy
    {
        args.payload = strategy;
    }

    if !is_cli(matches, "payload_version")
        && let Some(version) = payload.version.clone()
    {
        args.payload_version = version;
    }

    if !is_cli(matches, "serial")
        && let Some(serial) = payload.serial.clone()
    {
        args.serial = serial;
    }

    if !is_cli(matches, "serial_prefix")
        && let Some(prefix) = payload.serial_prefix.clone()
    {
        args.serial_prefix = prefix;
    }

    if !is_cli(matches, "serial_pattern")
        && let Some(pattern) = payload.serial_pattern.clone()
    {
        args.serial_pattern = Some(pattern);
    }
}

/// Resolves the target URL. An explicit `--url` (flag or `EDGELOAD_URL`)
/// wins, then a named target, then the config `url`.
fn apply_target(args: &mut LoadArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if config.url.is_some() && config.target.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "url",
            right: "target",
        }));
    }

    let target_name = if is_cli(matches, "target") {
        args.target.clone()
    } else {
        config.target.clone().or_else(|| args.target.clone())
    };

    if is_explicit(matches, "url") {
        if let Some(name) = target_name {
            warn!("Ignoring target '{}': --url was given.", name);
        }
        return Ok(());
    }

    if let Some(name) = target_name {
        args.url = Some(resolve_target(config.targets.as_ref(), &name)?);
        args.target = Some(name);
        return Ok(());
    }

    if let Some(url) = config.url.clone() {
        args.url = Some(url);
    }
    Ok(())
}

fn resolve_target(targets: Option<&BTreeMap<String, String>>, name: &str) -> AppResult<String> {
    let targets = targets.ok_or_else(|| AppError::config(ConfigError::TargetsMissing))?;
    targets.get(name).cloned().ok_or_else(|| {
        AppError::config(ConfigError::UnknownTarget {
            name: name.to_owned(),
            known: targets.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    })
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
