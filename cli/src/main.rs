//! fleet CLI - resolve compound minion targets

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_cli::cli::Cli;
use fleet_cli::domain::error::ParseError;
use fleet_cli::output::json::format_error;

/// Exit status for a target expression that does not parse.
const EXIT_INVALID_TARGET: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match cli.run() {
        Ok(code) => code,
        Err(err) => report_error(&err, json),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the default level. Logs go to
/// stderr so stdout stays machine-readable.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(err: &anyhow::Error, json: bool) -> ExitCode {
    let (code, status) = match err.downcast_ref::<ParseError>() {
        Some(_) => ("invalid_target", ExitCode::from(EXIT_INVALID_TARGET)),
        None => ("error", ExitCode::FAILURE),
    };
    let message = format!("{err:#}");
    match format_error(&message, code) {
        Ok(out) if json => println!("{out}"),
        _ => eprintln!("Error: {message}"),
    }
    status
}
