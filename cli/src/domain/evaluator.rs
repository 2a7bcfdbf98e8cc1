//! Set-algebra evaluation of an expression tree.
//!
//! Both operands of a binary node are evaluated against the same universe,
//! so evaluation order never changes the result.

use std::collections::BTreeSet;

use fleet_common::MinionId;

use crate::domain::ast::Node;
use crate::domain::error::ResolveError;
use crate::domain::matcher::{MatchContext, MatchSet};

/// Result of evaluating one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Always a subset of the universe.
    pub minions: MatchSet,
    /// IDs named by list terms that are not in the universe.
    pub missing: BTreeSet<MinionId>,
}

/// Evaluate `node` against the snapshot in `ctx`.
///
/// # Errors
///
/// Returns `ResolveError` when a leaf cannot be evaluated at all, e.g. a
/// range term with no range service. Absent metadata is never an error.
pub fn evaluate(node: &Node, ctx: &MatchContext<'_>) -> Result<Evaluation, ResolveError> {
    let mut missing = BTreeSet::new();
    let minions = eval(node, ctx, &mut missing)?;
    Ok(Evaluation { minions, missing })
}

fn eval(
    node: &Node,
    ctx: &MatchContext<'_>,
    missing: &mut BTreeSet<MinionId>,
) -> Result<MatchSet, ResolveError> {
    match node {
        Node::Leaf(leaf) => {
            missing.extend(leaf.kind.missing(leaf, ctx));
            leaf.kind.select(leaf, ctx)
        }
        Node::And { left, right } => {
            let l = eval(left, ctx, missing)?;
            let r = eval(right, ctx, missing)?;
            Ok(&l & &r)
        }
        Node::Or { left, right } => {
            let l = eval(left, ctx, missing)?;
            let r = eval(right, ctx, missing)?;
            Ok(&l | &r)
        }
        Node::AndNot { left, right } => {
            let l = eval(left, ctx, missing)?;
            // IDs excluded by name are expected to be absent.
            let r = match right.as_ref() {
                Node::Leaf(leaf) => leaf.kind.select(leaf, ctx)?,
                other => eval(other, ctx, missing)?,
            };
            Ok(&l - &r)
        }
        Node::Group { inner } => eval(inner, ctx, missing),
    }
}
