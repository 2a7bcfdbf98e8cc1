//! `fleet parse`: show the expression tree for a target.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use fleet_common::TargetType;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::domain::parser::parse_target;
use crate::domain::token::DEFAULT_DELIMITER;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Target expression
    pub expr: String,

    /// How to interpret the expression
    #[arg(short = 't', long = "tgt-type", value_enum, default_value_t = TargetType::Compound)]
    pub tgt_type: TargetType,

    /// Path delimiter for grain and pillar targets, and the default for their compound terms
    #[arg(long)]
    pub delimiter: Option<char>,
}

/// Run the parse command. Reads the configuration for nodegroups only; no
/// key or metadata is touched.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the target
/// fails to parse.
pub fn run(app: &AppContext, args: &ParseArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let tree = parse_target(
        &args.expr,
        args.tgt_type,
        args.delimiter.unwrap_or(DEFAULT_DELIMITER),
        &config.nodegroups,
    )?;
    app.renderer().render_tree(&args.expr, args.tgt_type, &tree)?;
    Ok(ExitCode::SUCCESS)
}
