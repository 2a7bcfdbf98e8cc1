//! Recursive-descent parser for compound targets.
//!
//! ```text
//! target  := or
//! or      := and ( "or" and )*
//! and     := not ( ("and" | "not") not )*
//! not     := [ "not" ] atom
//! atom    := TERM | "(" target ")"
//! ```
//!
//! `not` between two operands is a relative complement: `A not B` parses
//! the same as `A and not B` and yields `AndNot(A, B)`. A `not` with no
//! left operand complements against the whole universe, represented as
//! `AndNot(All, B)`.

use fleet_common::TargetType;
use tracing::debug;

use crate::domain::ast::{Leaf, Node};
use crate::domain::error::ParseError;
use crate::domain::matcher::MatcherKind;
use crate::domain::nodegroup::{self, Nodegroups};
use crate::domain::token::{DEFAULT_DELIMITER, Term, Token, TokenKind, tokenize};

/// Compile a target of any type into an expression tree.
///
/// Single-type targets become one leaf whose whole string is the pattern.
/// Compound and nodegroup targets are tokenized, nodegroup-expanded and
/// parsed. `delimiter` applies to metadata leaves; in compound targets it is
/// the default for terms without their own `X<delim>@` override.
///
/// # Errors
///
/// Returns `ParseError` if the target is malformed.
pub fn parse_target(
    expr: &str,
    tgt_type: TargetType,
    delimiter: char,
    nodegroups: &Nodegroups,
) -> Result<Node, ParseError> {
    if let Some(kind) = MatcherKind::from_target_type(tgt_type) {
        if expr.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        return leaf(kind, expr, delimiter, 0);
    }
    let compound = match tgt_type {
        TargetType::Nodegroup => format!("N@{expr}"),
        _ => expr.to_string(),
    };
    let tokens = nodegroup::expand(tokenize(&compound)?, nodegroups)?;
    debug!(
        expr = %compound,
        tokens = %tokens.iter().map(|t| t.kind.to_string()).collect::<Vec<_>>().join(" "),
        "tokenized target"
    );
    parse_with_delimiter(&tokens, delimiter)
}

/// Parse a token stream into an expression tree.
///
/// # Errors
///
/// Returns `ParseError` for an empty stream, unbalanced parentheses,
/// operators without operands, adjacent terms, unknown engines, and
/// patterns the engine cannot evaluate.
pub fn parse(tokens: &[Token]) -> Result<Node, ParseError> {
    parse_with_delimiter(tokens, DEFAULT_DELIMITER)
}

/// Like [`parse`], with `delimiter` used by metadata terms that do not set
/// their own.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_with_delimiter(tokens: &[Token], delimiter: char) -> Result<Node, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        delimiter,
    };
    let node = parser.or_expr()?;
    match parser.peek() {
        None => Ok(node),
        Some(tok) if tok.kind == TokenKind::RParen => {
            Err(ParseError::UnmatchedClose { offset: tok.offset })
        }
        Some(tok) => Err(ParseError::MissingOperator {
            offset: tok.offset,
            found: tok.kind.to_string(),
        }),
    }
}

/// Build a validated leaf from an engine kind and pattern.
///
/// # Errors
///
/// Returns `ParseError::InvalidPattern` when `kind` rejects the pattern.
pub fn leaf(
    kind: MatcherKind,
    pattern: &str,
    delimiter: char,
    offset: usize,
) -> Result<Node, ParseError> {
    kind.check_pattern(pattern, delimiter)
        .map_err(|reason| ParseError::InvalidPattern {
            matcher: kind.name(),
            pattern: pattern.to_string(),
            offset,
            reason,
        })?;
    Ok(Node::Leaf(Leaf {
        kind,
        pattern: pattern.to_string(),
        delimiter,
        offset,
    }))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Default path delimiter for metadata terms.
    delimiter: char,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// The last consumed token; used to report a dangling operator.
    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn or_expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.and_expr()?;
        while self.peek().is_some_and(|t| t.kind == TokenKind::Or) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            node = Node::or(node, rhs);
        }
        Ok(node)
    }

    fn and_expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.not_expr()?;
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::And) => {
                    self.pos += 1;
                    let rhs = self.not_expr()?;
                    node = Node::and(node, rhs);
                }
                Some(TokenKind::Not) => {
                    self.pos += 1;
                    let rhs = self.not_operand()?;
                    node = Node::and_not(node, rhs);
                }
                _ => return Ok(node),
            }
        }
    }

    fn not_expr(&mut self) -> Result<Node, ParseError> {
        if self.peek().is_some_and(|t| t.kind == TokenKind::Not) {
            let offset = self.peek().map_or(0, |t| t.offset);
            self.pos += 1;
            let operand = self.not_operand()?;
            let universe = Node::Leaf(Leaf {
                kind: MatcherKind::All,
                pattern: "*".to_string(),
                delimiter: DEFAULT_DELIMITER,
                offset,
            });
            return Ok(Node::and_not(universe, operand));
        }
        self.atom()
    }

    /// Operand of a `not`: itself optionally negated, so `A not not B` is
    /// `A` minus the complement of `B`.
    fn not_operand(&mut self) -> Result<Node, ParseError> {
        if self.peek().is_some_and(|t| t.kind == TokenKind::Not) {
            return self.not_expr();
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Node, ParseError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.dangling());
        };
        match tok.kind {
            TokenKind::Term(term) => {
                self.pos += 1;
                term_leaf(&term, self.delimiter, tok.offset)
            }
            TokenKind::LParen => {
                self.pos += 1;
                if self.peek().is_some_and(|t| t.kind == TokenKind::RParen) {
                    let close = self.peek().map_or(tok.offset, |t| t.offset);
                    return Err(ParseError::MissingOperand {
                        offset: close,
                        found: ")".to_string(),
                    });
                }
                let inner = self.or_expr()?;
                match self.next() {
                    Some(t) if t.kind == TokenKind::RParen => Ok(Node::group(inner)),
                    Some(t) => Err(ParseError::MissingOperator {
                        offset: t.offset,
                        found: t.kind.to_string(),
                    }),
                    None => Err(ParseError::UnmatchedOpen { offset: tok.offset }),
                }
            }
            TokenKind::RParen if self.pos == 0 => {
                Err(ParseError::UnmatchedClose { offset: tok.offset })
            }
            kind => Err(ParseError::MissingOperand {
                offset: tok.offset,
                found: kind.to_string(),
            }),
        }
    }

    fn dangling(&self) -> ParseError {
        match self.previous() {
            Some(prev) if prev.is_operator() => ParseError::DanglingOperator {
                operator: prev.kind.to_string(),
                offset: prev.offset,
            },
            Some(prev) if prev.kind == TokenKind::LParen => {
                ParseError::UnmatchedOpen { offset: prev.offset }
            }
            _ => ParseError::Empty,
        }
    }
}

fn term_leaf(term: &Term, default_delimiter: char, offset: usize) -> Result<Node, ParseError> {
    let delimiter = term.delimiter.unwrap_or(default_delimiter);
    let Some(sigil) = term.sigil else {
        return leaf(MatcherKind::Glob, &term.pattern, delimiter, offset);
    };
    if sigil == 'N' {
        return Err(ParseError::UnexpandedNodegroup {
            name: term.pattern.clone(),
            offset,
        });
    }
    let kind = MatcherKind::from_sigil(sigil).ok_or(ParseError::UnknownMatcher { sigil, offset })?;
    leaf(kind, &term.pattern, delimiter, offset)
}
