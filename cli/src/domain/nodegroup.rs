//! Nodegroup expansion.
//!
//! `N@name` terms are replaced by the named definition, wrapped in
//! parentheses, before the token stream reaches the parser. Definitions may
//! reference other nodegroups.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::domain::error::ParseError;
use crate::domain::token::{Term, Token, TokenKind, tokenize};

/// Nodegroup table from the configuration, by name.
pub type Nodegroups = BTreeMap<String, NodegroupDef>;

/// A nodegroup definition: a compound expression or a list of words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodegroupDef {
    Expr(#[serde(deserialize_with = "scalar_text")] String),
    Words(#[serde(deserialize_with = "scalar_words")] Vec<String>),
}

/// A scalar word in a definition. Bare numbers are minion IDs too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Uint(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Scalar::deserialize(de).map(Scalar::into_text)
}

fn scalar_words<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let words = Vec::<Scalar>::deserialize(de)?;
    Ok(words.into_iter().map(Scalar::into_text).collect())
}

impl NodegroupDef {
    fn words(&self) -> Vec<String> {
        match self {
            NodegroupDef::Expr(expr) => expr.split_whitespace().map(str::to_string).collect(),
            NodegroupDef::Words(words) => words.clone(),
        }
    }
}

const OPERATOR_WORDS: &[&str] = &["and", "or", "not", "(", ")"];
const REGEX_CHARS: &[char] = &['(', '[', '{', '\\', '?', '}', ']', ')'];

/// Replace every `N@name` token with the tokens of its definition.
///
/// Expanded tokens carry the offset of the `N@` term they replace.
///
/// # Errors
///
/// Returns `ParseError::UnknownNodegroup`, `NodegroupCycle` or
/// `EmptyNodegroup`, or any tokenizer error from a definition.
pub fn expand(tokens: Vec<Token>, groups: &Nodegroups) -> Result<Vec<Token>, ParseError> {
    let mut stack = Vec::new();
    expand_tokens(tokens, groups, &mut stack)
}

fn expand_tokens(
    tokens: Vec<Token>,
    groups: &Nodegroups,
    stack: &mut Vec<String>,
) -> Result<Vec<Token>, ParseError> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let group = match &token.kind {
            TokenKind::Term(term) if term.sigil == Some('N') => Some(term.pattern.clone()),
            _ => None,
        };
        match group {
            Some(name) => out.extend(expand_group(&name, token.offset, groups, stack)?),
            None => out.push(token),
        }
    }
    Ok(out)
}

fn expand_group(
    name: &str,
    offset: usize,
    groups: &Nodegroups,
    stack: &mut Vec<String>,
) -> Result<Vec<Token>, ParseError> {
    if stack.iter().any(|seen| seen == name) {
        return Err(ParseError::NodegroupCycle(name.to_string()));
    }
    let def = groups
        .get(name)
        .ok_or_else(|| ParseError::UnknownNodegroup(name.to_string()))?;

    stack.push(name.to_string());
    let inner = definition_tokens(name, def, offset)?;
    let inner = expand_tokens(inner, groups, stack)?;
    stack.pop();

    debug!(nodegroup = name, tokens = inner.len(), "expanded nodegroup");
    let mut out = Vec::with_capacity(inner.len() + 2);
    out.push(Token::new(TokenKind::LParen, offset));
    out.extend(inner);
    out.push(Token::new(TokenKind::RParen, offset));
    Ok(out)
}

fn definition_tokens(name: &str, def: &NodegroupDef, offset: usize) -> Result<Vec<Token>, ParseError> {
    let words = def.words();
    if words.iter().all(|w| w.trim().is_empty()) {
        return Err(ParseError::EmptyNodegroup(name.to_string()));
    }
    if let Some(term) = bare_id_term(&words) {
        debug!(nodegroup = name, term = %term, "nodegroup is a plain ID list");
        return Ok(vec![Token::new(TokenKind::Term(term), offset)]);
    }
    let tokens = tokenize(&words.join(" "))?;
    Ok(tokens
        .into_iter()
        .map(|t| Token::new(t.kind, offset))
        .collect())
}

/// A definition with no operators, wildcards or engine prefixes names
/// minions directly: `L@a,b`, or a regex alternation when any word looks
/// like a regex.
fn bare_id_term(words: &[String]) -> Option<Term> {
    let structured = words.iter().any(|w| {
        OPERATOR_WORDS.contains(&w.as_str()) || w.contains('*') || has_engine_prefix(w)
    });
    if structured {
        return None;
    }
    let regex_like = words.iter().any(|w| w.contains(REGEX_CHARS));
    let (sigil, pattern) = if regex_like {
        ('E', words.join("|"))
    } else {
        ('L', words.join(","))
    };
    Some(Term {
        sigil: Some(sigil),
        delimiter: None,
        pattern,
    })
}

fn has_engine_prefix(word: &str) -> bool {
    let chars: Vec<char> = word.chars().take(3).collect();
    match chars.as_slice() {
        [s, '@', ..] => s.is_ascii_uppercase(),
        [s, d, '@'] => matches!(*s, 'G' | 'P' | 'I' | 'J') && *d != '@',
        _ => false,
    }
}
