//! Delimited path matching against nested metadata documents.
//!
//! An expression `a:b:c` is tried at every split point, deepest key first:
//! `{a: {b: "c"}}` is checked before `{a: "b:c"}`. Numeric path segments
//! index lists, and lists of dicts are searched dict by dict.

use std::cell::RefCell;
use std::collections::HashMap;

use fancy_regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::matcher::{compile_pcre, glob, pcre_match};

/// How the value at the end of a path is compared with the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Case-insensitive glob. `*` alone means "key exists".
    Glob,
    /// Case-insensitive regex, anchored at the start.
    Regex,
    /// Case-sensitive string equality, no wildcards.
    Exact,
}

/// Matches `path<delim>value` expressions against one document at a time.
///
/// Compiled patterns are cached for the lifetime of the matcher, so one
/// instance should serve a whole leaf evaluation.
pub struct SubdictMatcher {
    comparison: Comparison,
    delimiter: char,
    compiled: RefCell<HashMap<String, Option<Regex>>>,
}

impl SubdictMatcher {
    #[must_use]
    pub fn new(comparison: Comparison, delimiter: char) -> Self {
        Self {
            comparison,
            delimiter,
            compiled: RefCell::new(HashMap::new()),
        }
    }

    /// True when some split of `expr` resolves in `data` to a matching value.
    #[must_use]
    pub fn matches(&self, data: &Map<String, Value>, expr: &str) -> bool {
        let splits: Vec<&str> = expr.split(self.delimiter).collect();
        if splits.len() < 2 {
            return false;
        }
        let delim = self.delimiter.to_string();

        for idx in (1..splits.len()).rev() {
            let key = splits[..idx].join(&delim);
            if key == "*" && self.comparison != Comparison::Exact {
                if self.dict_match(data, expr) {
                    return true;
                }
                continue;
            }
            let matchstr = splits[idx..].join(&delim);
            let Some(found) = traverse(data, &key, self.delimiter) else {
                continue;
            };
            let hit = match found {
                Value::Object(map) if map.is_empty() => false,
                Value::Object(map) => self.dict_match(map, &matchstr),
                Value::Array(items) => items.iter().any(|member| match member {
                    Value::Object(map) => self.dict_match(map, &matchstr),
                    other => self.compare(other, &matchstr),
                }),
                other => self.compare(other, &matchstr),
            };
            if hit {
                return true;
            }
        }
        false
    }

    fn dict_match(&self, target: &Map<String, Value>, pattern: &str) -> bool {
        if self.comparison == Comparison::Exact {
            return self.matches(target, pattern);
        }

        let (wildcard, pattern) = match pattern.strip_prefix("*:") {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        if pattern == "*" || target.contains_key(pattern) || self.matches(target, pattern) {
            return true;
        }
        if !wildcard {
            return false;
        }
        target.values().any(|value| match value {
            Value::Object(inner) => self.dict_match(inner, pattern),
            Value::Array(items) => items.iter().any(|item| self.compare(item, pattern)),
            other => self.compare(other, pattern),
        })
    }

    fn compare(&self, target: &Value, pattern: &str) -> bool {
        let Some(target) = scalar_string(target) else {
            return false;
        };
        match self.comparison {
            Comparison::Exact => target == pattern,
            Comparison::Glob | Comparison::Regex => {
                let pattern = pattern.to_lowercase();
                self.compiled(&pattern)
                    .is_some_and(|re| pcre_match(&re, &target.to_lowercase()))
            }
        }
    }

    fn compiled(&self, pattern: &str) -> Option<Regex> {
        if let Some(hit) = self.compiled.borrow().get(pattern) {
            return hit.clone();
        }
        let result = match self.comparison {
            Comparison::Glob => Regex::new(&glob::translate(pattern)),
            _ => compile_pcre(pattern),
        };
        let compiled = match result {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(pattern, error = %err, "invalid pattern in metadata target, matching nothing");
                None
            }
        };
        self.compiled
            .borrow_mut()
            .insert(pattern.to_string(), compiled.clone());
        compiled
    }
}

/// True when some split of `expr` leaves a value usable as a regex.
///
/// A bare `*` value is a key-exists check and never compiled.
#[must_use]
pub fn regex_splits_compile(expr: &str, delimiter: char) -> bool {
    let splits: Vec<&str> = expr.split(delimiter).collect();
    let delim = delimiter.to_string();
    (1..splits.len()).any(|idx| {
        let value = splits[idx..].join(&delim);
        value == "*" || compile_pcre(&value.to_lowercase()).is_ok()
    })
}

/// Follow a delimited key through nested dicts and lists.
#[must_use]
pub fn traverse<'a>(data: &'a Map<String, Value>, key: &str, delimiter: char) -> Option<&'a Value> {
    let mut parts = key.split(delimiter);
    let mut ptr = data.get(parts.next()?)?;
    for part in parts {
        ptr = match ptr {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => list_step(items, part)?,
            _ => return None,
        };
    }
    Some(ptr)
}

fn list_step<'a>(items: &'a [Value], part: &str) -> Option<&'a Value> {
    let embedded = items
        .iter()
        .filter_map(Value::as_object)
        .find_map(|map| map.get(part));
    if embedded.is_some() {
        return embedded;
    }
    part.parse::<usize>().ok().and_then(|idx| items.get(idx))
}

/// String form of a scalar. Dicts and lists have none.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
