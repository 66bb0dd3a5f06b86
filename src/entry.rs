use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::args::LoadArgs;
use crate::args::defaults::DEFAULT_CONFIG_FILES;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::pool::ReqwestConnector;
use crate::report;
use crate::run::{RawRunConfig, RunConfig, RunController};

/// Binary entry point: parse, configure, run, report.
///
/// # Errors
///
/// Returns an error for invalid configuration, runtime setup failures or
/// when the summary cannot be written. Failed requests are not errors.
pub fn run() -> AppResult<()> {
    let Some((args, matches)) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run_async(args, &matches));
    if let Err(err) = result.as_ref() {
        error!("{}", err);
    }
    result
}

fn parse_args() -> AppResult<Option<(LoadArgs, ArgMatches)>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = LoadArgs::from_arg_matches(&matches)?;
    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty || std::env::var_os("EDGELOAD_URL").is_some() {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(mut args: LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }

    let config = RunConfig::try_from_raw(RawRunConfig::from(&args))?;
    let connector = ReqwestConnector::new(config.pool())?;
    let summary = RunController::new(config).run(connector).await?;

    report::emit(&summary, args.output_format, args.output.as_deref()).await
}
