//! Human-readable terminal renderer.

use std::path::Path;

use fleet_common::{MatchReport, ScopeReport};
use owo_colors::OwoColorize as _;

use crate::domain::ast::Node;
use crate::domain::config::{FleetConfig, VALID_CONFIG_KEYS};
use crate::domain::nodegroup::NodegroupDef;
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("fleet {version}");
    }

    /// Matched IDs go to stdout one per line, bare, so the output can be piped.
    pub fn render_match(&self, report: &MatchReport) {
        for id in &report.minions {
            println!("{id}");
        }
        if report.minions.is_empty() && self.ctx.show_hints() {
            self.ctx.info(&format!("No minions matched '{}'", report.target));
        }
        if !report.missing.is_empty() && !self.ctx.quiet {
            eprintln!(
                "{} {}",
                "Listed but not accepted:".style(self.ctx.styles.warning),
                report.missing.join(", ")
            );
        }
    }

    /// Render the parse tree, one node per line, children indented.
    pub fn render_tree(&self, tree: &Node) {
        let mut lines = Vec::new();
        tree_lines(tree, 0, &mut lines);
        for (depth, label, pattern) in lines {
            let indent = "  ".repeat(depth);
            match pattern {
                Some(pattern) => println!(
                    "{indent}{} {pattern:?}",
                    label.style(self.ctx.styles.matcher)
                ),
                None => println!("{indent}{}", label.style(self.ctx.styles.bold)),
            }
        }
    }

    pub fn render_scope(&self, report: &ScopeReport) {
        if report.in_scope {
            self.ctx.success(&format!(
                "'{}' stays within '{}'",
                report.target, report.valid
            ));
            return;
        }
        self.ctx.error(&format!(
            "{} targeted minion(s) fall outside '{}':",
            report.outside.len(),
            report.valid
        ));
        for id in &report.outside {
            eprintln!("      {id}");
        }
    }

    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    /// Render the current fleet configuration. Suppressed when `quiet`.
    pub fn render_config(&self, config: &FleetConfig, path: &Path) {
        self.ctx.header(&format!("Configuration ({})", path.display()));
        for key in VALID_CONFIG_KEYS {
            let value = config.get(key).unwrap_or_default();
            self.ctx.kv(&format!("{:<20}", format!("{key}:")), &value);
        }

        self.ctx.header("Nodegroups");
        if config.nodegroups.is_empty() {
            self.ctx.kv("(none)", "");
        }
        for (name, def) in &config.nodegroups {
            let shown = match def {
                NodegroupDef::Expr(expr) => expr.clone(),
                NodegroupDef::Words(words) => format!("[{}]", words.join(", ")),
            };
            self.ctx.kv(&format!("{:<20}", format!("{name}:")), &shown);
        }

        self.ctx.header("Environment");
        for var in [CONFIG_ENV, "NO_COLOR", "RUST_LOG"] {
            let value = std::env::var(var).unwrap_or_else(|_| "(not set)".to_string());
            self.ctx.kv(&format!("{:<20}", format!("{var}:")), &value);
        }
    }
}

fn tree_lines(node: &Node, depth: usize, out: &mut Vec<(usize, &'static str, Option<String>)>) {
    let (label, children): (&'static str, Vec<&Node>) = match node {
        Node::Leaf(leaf) => {
            out.push((depth, leaf.kind.name(), Some(leaf.pattern.clone())));
            return;
        }
        Node::And { left, right } => ("and", vec![left.as_ref(), right.as_ref()]),
        Node::Or { left, right } => ("or", vec![left.as_ref(), right.as_ref()]),
        Node::AndNot { left, right } => ("and-not", vec![left.as_ref(), right.as_ref()]),
        Node::Group { inner } => ("group", vec![inner.as_ref()]),
    };
    out.push((depth, label, None));
    for child in children {
        tree_lines(child, depth + 1, out);
    }
}
