//! `fleet match`: resolve a target to minion IDs.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use fleet_common::{MatchReport, TargetType};
use tracing::debug;

use crate::app::AppContext;
use crate::application::services::{config_service, resolver};

/// Arguments for the match command.
#[derive(Args)]
pub struct MatchArgs {
    /// Target expression, e.g. `web* and G@os:Debian`
    pub expr: String,

    /// How to interpret the expression
    #[arg(short = 't', long = "tgt-type", value_enum, default_value_t = TargetType::Compound)]
    pub tgt_type: TargetType,

    /// Path delimiter for grain and pillar targets, and the default for their compound terms
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Also consider minions that only exist in the metadata cache
    #[arg(long)]
    pub greedy: bool,

    /// Exit 1 when nothing matches
    #[arg(long)]
    pub fail_empty: bool,
}

/// Run the match command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the target
/// fails to parse or resolve.
pub fn run(app: &AppContext, args: &MatchArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let resolver_cfg = app.resolver_config(&config);
    let result = resolver::check_minions(
        &resolver_cfg,
        &args.expr,
        args.tgt_type,
        args.delimiter,
        args.greedy,
    )?;

    let report = MatchReport {
        target: args.expr.clone(),
        tgt_type: args.tgt_type,
        greedy: args.greedy,
        minions: result.minions.into_iter().collect(),
        missing: result.missing.into_iter().collect(),
    };
    app.renderer().render_match(&report)?;

    if args.fail_empty && report.minions.is_empty() {
        debug!(expr = %args.expr, "no minions matched, failing as requested");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
