//! Application service: target resolution.
//!
//! Every call takes a fresh snapshot: the key store is listed once and each
//! minion's metadata is fetched at most once, before evaluation starts. The
//! ports are only ever read.

use std::collections::HashMap;

use anyhow::{Context, Result};
use fleet_common::{MinionData, MinionId, TargetType};
use tracing::{debug, warn};

use crate::application::ports::{KeyStore, MinionCache, RangeExpander};
use crate::domain::ast::Node;
use crate::domain::error::ResolveError;
use crate::domain::evaluator::{Evaluation, evaluate};
use crate::domain::matcher::{MatchContext, MatchSet, MatcherKind, RangeTable};
use crate::domain::nodegroup::Nodegroups;
use crate::domain::parser::parse_target;
use crate::domain::token::DEFAULT_DELIMITER;

/// Explicit resolver configuration: the data sources and the settings that
/// change how they are read.
pub struct ResolverConfig {
    pub key_store: Box<dyn KeyStore>,
    pub cache: Box<dyn MinionCache>,
    pub range: Option<Box<dyn RangeExpander>>,
    pub nodegroups: Nodegroups,
    pub cache_bank: String,
    /// When false, metadata targets match nothing and greedy mode does not
    /// widen the universe.
    pub minion_data_cache: bool,
}

impl ResolverConfig {
    #[must_use]
    pub fn new(key_store: Box<dyn KeyStore>, cache: Box<dyn MinionCache>) -> Self {
        Self {
            key_store,
            cache,
            range: None,
            nodegroups: Nodegroups::new(),
            cache_bank: "minions".to_string(),
            minion_data_cache: true,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: Box<dyn RangeExpander>) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn with_nodegroups(mut self, nodegroups: Nodegroups) -> Self {
        self.nodegroups = nodegroups;
        self
    }

    #[must_use]
    pub fn with_cache_bank(mut self, bank: impl Into<String>) -> Self {
        self.cache_bank = bank.into();
        self
    }

    #[must_use]
    pub fn with_minion_data_cache(mut self, enabled: bool) -> Self {
        self.minion_data_cache = enabled;
        self
    }
}

/// Resolve a compound expression to the set of matching minion IDs.
///
/// # Errors
///
/// Returns a `ParseError` (reachable through `downcast_ref`) for a malformed
/// expression, before any data source is read. Also fails when the key store
/// cannot be listed or a range term cannot be expanded.
pub fn resolve(cfg: &ResolverConfig, expr: &str, greedy: bool) -> Result<MatchSet> {
    Ok(check_minions(cfg, expr, TargetType::Compound, None, greedy)?.minions)
}

/// Resolve a target of any type, reporting listed-but-unknown IDs too.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn check_minions(
    cfg: &ResolverConfig,
    expr: &str,
    tgt_type: TargetType,
    delimiter: Option<char>,
    greedy: bool,
) -> Result<Evaluation> {
    let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
    let node = parse_target(expr, tgt_type, delimiter, &cfg.nodegroups)?;
    debug!(expr, %tgt_type, tree = %node, "parsed target");
    evaluate_node(cfg, &node, greedy)
}

/// True when every minion targeted by `(expr, tgt_type)` is also matched by
/// the compound expression `valid`.
///
/// # Errors
///
/// Fails if either target fails to resolve.
pub fn validate_target(
    cfg: &ResolverConfig,
    valid: &str,
    expr: &str,
    tgt_type: TargetType,
    greedy: bool,
) -> Result<bool> {
    Ok(out_of_scope(cfg, valid, expr, tgt_type, greedy)?.is_empty())
}

/// Minions targeted by `(expr, tgt_type)` that `valid` does not match.
///
/// # Errors
///
/// Fails if either target fails to resolve.
pub fn out_of_scope(
    cfg: &ResolverConfig,
    valid: &str,
    expr: &str,
    tgt_type: TargetType,
    greedy: bool,
) -> Result<MatchSet> {
    let allowed = check_minions(cfg, valid, TargetType::Compound, None, greedy)
        .context("cannot resolve the allowed scope")?
        .minions;
    let targeted = check_minions(cfg, expr, tgt_type, None, greedy)?.minions;
    Ok(&targeted - &allowed)
}

/// Evaluate an already parsed tree against a fresh snapshot.
///
/// # Errors
///
/// Fails when the key store cannot be listed or a range term cannot be
/// expanded.
pub fn evaluate_node(cfg: &ResolverConfig, node: &Node, greedy: bool) -> Result<Evaluation> {
    let universe = build_universe(cfg, greedy)?;
    let data = if cfg.minion_data_cache && node.uses_metadata() {
        snapshot(cfg, &universe)
    } else {
        HashMap::new()
    };
    let ranges = expand_ranges(cfg, node)?;

    let ctx = MatchContext {
        universe: &universe,
        data: &data,
        ranges: &ranges,
        metadata_enabled: cfg.minion_data_cache,
    };
    let result = evaluate(node, &ctx)?;
    debug!(
        universe = universe.len(),
        matched = result.minions.len(),
        missing = result.missing.len(),
        "resolved target"
    );
    Ok(result)
}

fn build_universe(cfg: &ResolverConfig, greedy: bool) -> Result<MatchSet> {
    let mut universe: MatchSet = cfg
        .key_store
        .list()
        .context("cannot list accepted minion keys")?
        .into_iter()
        .collect();
    let accepted = universe.len();

    if greedy && cfg.minion_data_cache {
        match cfg.cache.list(&cfg.cache_bank) {
            Ok(ids) => universe.extend(ids),
            Err(err) => warn!(
                bank = %cfg.cache_bank,
                error = %format!("{err:#}"),
                "cannot list cache bank, using accepted keys only"
            ),
        }
    }
    debug!(accepted, universe = universe.len(), greedy, "built universe");
    Ok(universe)
}

fn snapshot(cfg: &ResolverConfig, universe: &MatchSet) -> HashMap<MinionId, MinionData> {
    let mut data = HashMap::with_capacity(universe.len());
    for id in universe {
        match cfg.cache.fetch(&cfg.cache_bank, id) {
            Ok(Some(doc)) => {
                data.insert(id.clone(), doc);
            }
            Ok(None) => {}
            Err(err) => warn!(
                minion = %id,
                error = %format!("{err:#}"),
                "unreadable cache entry, treating as absent"
            ),
        }
    }
    data
}

fn expand_ranges(cfg: &ResolverConfig, node: &Node) -> Result<RangeTable, ResolveError> {
    let mut table = RangeTable::new();
    for leaf in node.leaves() {
        if leaf.kind != MatcherKind::Range || table.contains_key(&leaf.pattern) {
            continue;
        }
        let Some(range) = cfg.range.as_deref() else {
            return Err(ResolveError::RangeUnavailable {
                expr: leaf.pattern.clone(),
            });
        };
        let hosts = range.expand(&leaf.pattern).map_err(|err| ResolveError::Range {
            expr: leaf.pattern.clone(),
            reason: format!("{err:#}"),
        })?;
        table.insert(leaf.pattern.clone(), hosts.into_iter().collect());
    }
    Ok(table)
}
