//! `fleet validate`: check that a target stays inside an allowed scope.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use fleet_common::{ScopeReport, TargetType};

use crate::app::AppContext;
use crate::application::services::{config_service, resolver};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Compound expression describing the allowed scope
    pub valid: String,

    /// Target expression to check
    pub expr: String,

    /// How to interpret the target expression
    #[arg(short = 't', long = "tgt-type", value_enum, default_value_t = TargetType::Compound)]
    pub tgt_type: TargetType,

    /// Also consider minions that only exist in the metadata cache
    #[arg(long)]
    pub greedy: bool,
}

/// Run the validate command. Exits 1 when any targeted minion is outside
/// the allowed scope.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or either
/// expression fails to parse or resolve.
pub fn run(app: &AppContext, args: &ValidateArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let resolver_cfg = app.resolver_config(&config);
    let outside = resolver::out_of_scope(
        &resolver_cfg,
        &args.valid,
        &args.expr,
        args.tgt_type,
        args.greedy,
    )?;

    let report = ScopeReport {
        valid: args.valid.clone(),
        target: args.expr.clone(),
        tgt_type: args.tgt_type,
        in_scope: outside.is_empty(),
        outside: outside.into_iter().collect(),
    };
    app.renderer().render_scope(&report)?;

    Ok(if report.in_scope {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
