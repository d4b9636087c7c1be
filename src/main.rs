use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod api;
mod cli;
mod client;
mod commands;
mod config;
mod format;
mod logging;
mod merge;
mod output;
mod record;
mod resolve;
mod resource;
#[cfg(test)]
mod testing;

use crate::cli::Cli;
use crate::client::Clients;
use crate::commands::PartialFailure;
use crate::config::Config;
use crate::output::OutputFormat;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);
    let format = cli.format;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, format);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Config::from_env()
        .apply(cli.connection.overrides())
        .validate()?;
    tracing::debug!(host = %settings.host, "connecting");
    let clients = Clients::connect(&settings)?;
    let output = commands::run(cli.command, &clients)?;
    print!("{}", output.render(cli.format));
    Ok(())
}

/// Print what a failed command still produced, then the error chain.
fn report(err: &anyhow::Error, format: OutputFormat) {
    if let Some(partial) = err.downcast_ref::<PartialFailure>() {
        print!("{}", partial.output.render(format));
    }
    eprintln!("error: {err:#}");
}
