//! Tokenizer for compound target expressions.
//!
//! Words are split on whitespace. `and`, `or` and `not` are operators only
//! as whole words. Parentheses are tokens of their own; they may also be glued
//! to the start or end of a word, in which case closing parentheses that
//! balance an opening one inside the word stay part of the term, so
//! `E@web(1|2))` lexes as the term `E@web(1|2)` followed by `)`.

use std::fmt;

use crate::domain::error::ParseError;

/// Default separator between path segments in metadata targets.
pub const DEFAULT_DELIMITER: char = ':';

/// Engines that accept a custom path delimiter, e.g. `G;@os;Debian`.
const DELIMITED_ENGINES: &[char] = &['G', 'P', 'I', 'J'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Term(Term),
}

/// A matcher term: optional engine sigil, optional delimiter, pattern.
///
/// `sigil` is `None` for bare globs. The sigil is not checked against the
/// matcher registry here; the parser rejects unknown engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub sigil: Option<char>,
    pub delimiter: Option<char>,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source expression.
    pub offset: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    #[must_use]
    pub fn is_operator(&self) -> bool {
        matches!(self.kind, TokenKind::And | TokenKind::Or | TokenKind::Not)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::Term(term) => write!(f, "{term}"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sigil) = self.sigil {
            write!(f, "{sigil}")?;
            if let Some(delim) = self.delimiter {
                write!(f, "{delim}")?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.pattern)
    }
}

/// Split a compound expression into tokens.
///
/// An empty or all-whitespace expression yields no tokens; rejecting it is
/// the parser's job.
///
/// # Errors
///
/// Returns `ParseError::EmptyPattern` for an engine prefix with nothing after
/// it, e.g. `G@`.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    for (start, word) in words(expr) {
        lex_word(word, start, &mut tokens)?;
    }
    Ok(tokens)
}

/// Whitespace-separated words with their byte offsets.
fn words(expr: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in expr.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &expr[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &expr[s..]));
    }
    out
}

fn lex_word(word: &str, start: usize, out: &mut Vec<Token>) -> Result<(), ParseError> {
    let body = word.trim_start_matches('(');
    let leading = word.len() - body.len();
    for i in 0..leading {
        out.push(Token::new(TokenKind::LParen, start + i));
    }

    let trimmed = body.trim_end_matches(')');
    let trailing = body.len() - trimmed.len();
    let depth = paren_depth(trimmed);
    let kept = trailing.min(depth);
    let term_len = trimmed.len() + kept;
    let term = &body[..term_len];
    let term_start = start + leading;

    if !term.is_empty() {
        let kind = match term {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => TokenKind::Term(lex_term(term, term_start)?),
        };
        out.push(Token::new(kind, term_start));
    }

    for i in 0..trailing - kept {
        out.push(Token::new(TokenKind::RParen, term_start + term_len + i));
    }
    Ok(())
}

/// Number of `(` in `s` not closed by a later `)`.
fn paren_depth(s: &str) -> usize {
    let mut depth: usize = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn lex_term(word: &str, offset: usize) -> Result<Term, ParseError> {
    let mut chars = word.chars();
    let first = chars.next();
    let second = chars.next();
    let third = chars.next();

    let (sigil, delimiter, skip) = match (first, second, third) {
        (Some(s), Some('@'), _) if s.is_ascii_uppercase() => (Some(s), None, 2),
        (Some(s), Some(d), Some('@')) if DELIMITED_ENGINES.contains(&s) && d != '@' => {
            (Some(s), Some(d), 2 + d.len_utf8())
        }
        _ => (None, None, 0),
    };

    let pattern = &word[skip..];
    if let Some(sigil) = sigil
        && pattern.is_empty()
    {
        return Err(ParseError::EmptyPattern { sigil, offset });
    }

    Ok(Term {
        sigil,
        delimiter,
        pattern: pattern.to_string(),
    })
}
