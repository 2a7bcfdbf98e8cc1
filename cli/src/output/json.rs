//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout. Failures use the error object produced by [`format_error`].

use std::path::Path;

use anyhow::{Context, Result};
use fleet_common::{MatchReport, ScopeReport, TargetType};
use serde_json::{Value, json};

use crate::domain::ast::Node;
use crate::domain::config::FleetConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders command results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_match(&self, report: &MatchReport) -> Result<()> {
        print_pretty(report)
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_tree(&self, target: &str, tgt_type: TargetType, tree: &Node) -> Result<()> {
        print_pretty(&json!({
            "target": target,
            "tgt_type": tgt_type,
            "tree": tree_value(tree),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_scope(&self, report: &ScopeReport) -> Result<()> {
        print_pretty(report)
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &FleetConfig, path: &Path) -> Result<()> {
        print_pretty(&json!({
            "path": path.display().to_string(),
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_pretty(&json!({ "version": version }))
    }
}

fn print_pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

/// Structured form of a parse tree: operators carry `op` and their operands,
/// leaves carry `matcher`, `pattern` and the source `offset`.
#[must_use]
pub fn tree_value(node: &Node) -> Value {
    match node {
        Node::Leaf(leaf) => json!({
            "matcher": leaf.kind.name(),
            "pattern": leaf.pattern,
            "offset": leaf.offset,
        }),
        Node::And { left, right } => binary("and", left, right),
        Node::Or { left, right } => binary("or", left, right),
        Node::AndNot { left, right } => binary("and_not", left, right),
        Node::Group { inner } => json!({ "op": "group", "inner": tree_value(inner) }),
    }
}

fn binary(op: &str, left: &Node, right: &Node) -> Value {
    json!({
        "op": op,
        "left": tree_value(left),
        "right": tree_value(right),
    })
}
