//! Expression tree produced by the parser.

use std::fmt;

use crate::domain::matcher::MatcherKind;

/// A single matcher invocation.
///
/// Invariant: `pattern` is non-empty and `kind` is never `Nodegroup`-like;
/// nodegroups are expanded before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub kind: MatcherKind,
    pub pattern: String,
    /// Path separator for metadata matchers; `:` unless overridden.
    pub delimiter: char,
    /// Byte offset of the term in the source expression.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    And { left: Box<Node>, right: Box<Node> },
    Or { left: Box<Node>, right: Box<Node> },
    /// Relative complement: everything in `left` that is not in `right`.
    AndNot { left: Box<Node>, right: Box<Node> },
    Group { inner: Box<Node> },
}

impl Node {
    #[must_use]
    pub fn and(left: Node, right: Node) -> Self {
        Node::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn or(left: Node, right: Node) -> Self {
        Node::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn and_not(left: Node, right: Node) -> Self {
        Node::AndNot {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn group(inner: Node) -> Self {
        Node::Group {
            inner: Box::new(inner),
        }
    }

    /// All leaves, left to right.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Node::Leaf(leaf) => out.push(leaf),
            Node::And { left, right } | Node::Or { left, right } | Node::AndNot { left, right } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
            Node::Group { inner } => inner.collect_leaves(out),
        }
    }

    /// True when any leaf needs the per-minion facts or pillar document.
    #[must_use]
    pub fn uses_metadata(&self) -> bool {
        self.leaves().iter().any(|leaf| leaf.kind.uses_metadata())
    }
}

/// S-expression rendering used by `fleet parse`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(f, "({} {:?})", leaf.kind.name(), leaf.pattern),
            Node::And { left, right } => write!(f, "(and {left} {right})"),
            Node::Or { left, right } => write!(f, "(or {left} {right})"),
            Node::AndNot { left, right } => write!(f, "(and-not {left} {right})"),
            Node::Group { inner } => write!(f, "(group {inner})"),
        }
    }
}
