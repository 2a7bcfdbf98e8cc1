//! Matcher registry: the closed set of leaf evaluators.
//!
//! Each kind maps `(leaf, context)` to the subset of the universe it selects.
//! Kinds are an enum so an unknown engine is caught when the expression is
//! parsed, not when it is evaluated.

pub mod glob;
pub mod ipcidr;
pub mod subdict;

use std::collections::{BTreeSet, HashMap};

use fancy_regex::Regex as PcreRegex;
use fleet_common::{MinionData, MinionId, TargetType};
use tracing::warn;

use crate::domain::ast::Leaf;
use crate::domain::error::ResolveError;
use subdict::{Comparison, SubdictMatcher};

/// Deduplicated set of minion IDs. Ordered so output is stable.
pub type MatchSet = BTreeSet<MinionId>;

/// Range expressions already expanded by the range service, keyed by pattern.
pub type RangeTable = HashMap<String, BTreeSet<MinionId>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    /// The whole universe. Produced for a leading `not`.
    All,
    Glob,
    Pcre,
    List,
    Grain,
    GrainPcre,
    Pillar,
    PillarPcre,
    PillarExact,
    Ipcidr,
    Range,
}

impl MatcherKind {
    /// Engine selected by an `X@` prefix in a compound expression.
    ///
    /// `N@` is absent on purpose: nodegroups are expanded before parsing.
    #[must_use]
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            'G' => Some(Self::Grain),
            'P' => Some(Self::GrainPcre),
            'I' => Some(Self::PillarExact),
            'J' => Some(Self::PillarPcre),
            'L' => Some(Self::List),
            'E' => Some(Self::Pcre),
            'S' => Some(Self::Ipcidr),
            'R' => Some(Self::Range),
            _ => None,
        }
    }

    /// Leaf kind for a single-type target. `None` for types that are
    /// expressions rather than leaves.
    #[must_use]
    pub fn from_target_type(tgt_type: TargetType) -> Option<Self> {
        match tgt_type {
            TargetType::Glob => Some(Self::Glob),
            TargetType::Pcre => Some(Self::Pcre),
            TargetType::List => Some(Self::List),
            TargetType::Grain => Some(Self::Grain),
            TargetType::GrainPcre => Some(Self::GrainPcre),
            TargetType::Pillar => Some(Self::Pillar),
            TargetType::PillarPcre => Some(Self::PillarPcre),
            TargetType::PillarExact => Some(Self::PillarExact),
            TargetType::Ipcidr => Some(Self::Ipcidr),
            TargetType::Range => Some(Self::Range),
            TargetType::Nodegroup | TargetType::Compound => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Glob => "glob",
            Self::Pcre => "pcre",
            Self::List => "list",
            Self::Grain => "grain",
            Self::GrainPcre => "grain_pcre",
            Self::Pillar => "pillar",
            Self::PillarPcre => "pillar_pcre",
            Self::PillarExact => "pillar_exact",
            Self::Ipcidr => "ipcidr",
            Self::Range => "range",
        }
    }

    /// True for kinds that read the cached facts or pillar.
    #[must_use]
    pub fn uses_metadata(self) -> bool {
        matches!(
            self,
            Self::Grain
                | Self::GrainPcre
                | Self::Pillar
                | Self::PillarPcre
                | Self::PillarExact
                | Self::Ipcidr
        )
    }

    fn subdict(self) -> Option<(Document, Comparison)> {
        match self {
            Self::Grain => Some((Document::Facts, Comparison::Glob)),
            Self::GrainPcre => Some((Document::Facts, Comparison::Regex)),
            Self::Pillar => Some((Document::Pillar, Comparison::Glob)),
            Self::PillarPcre => Some((Document::Pillar, Comparison::Regex)),
            Self::PillarExact => Some((Document::Pillar, Comparison::Exact)),
            _ => None,
        }
    }

    /// Reject patterns this kind can never evaluate.
    ///
    /// # Errors
    ///
    /// Returns the reason the pattern is unusable.
    pub fn check_pattern(self, pattern: &str, delimiter: char) -> Result<(), String> {
        match self {
            Self::Pcre => compile_pcre(pattern).map(drop).map_err(|e| e.to_string()),
            Self::Glob => glob::compile(pattern).map(drop).map_err(|e| e.to_string()),
            Self::List if list_items(pattern).is_empty() => {
                Err("no minion IDs listed".to_string())
            }
            Self::Ipcidr => ipcidr::parse_target(pattern).map(drop),
            kind if kind.subdict().is_some() && !pattern.contains(delimiter) => {
                Err(format!("expected <path>{delimiter}<value>"))
            }
            Self::GrainPcre | Self::PillarPcre if !subdict::regex_splits_compile(pattern, delimiter) => {
                Err(format!("no <value> after a '{delimiter}' compiles as a regex"))
            }
            _ => Ok(()),
        }
    }

    /// Minions in `ctx.universe` selected by `leaf`.
    ///
    /// Never fails on missing or unreadable metadata; those minions are
    /// simply not selected.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::RangeUnavailable` when a range leaf has no
    /// expansion in `ctx.ranges`.
    pub fn select(self, leaf: &Leaf, ctx: &MatchContext<'_>) -> Result<MatchSet, ResolveError> {
        let pattern = leaf.pattern.as_str();
        let selected = match self {
            Self::All => ctx.universe.clone(),
            Self::Glob => match glob::compile(pattern) {
                Ok(re) => filter_ids(ctx.universe, |id| re.is_match(id)),
                Err(err) => {
                    warn!(pattern, error = %err, "invalid glob, matching nothing");
                    MatchSet::new()
                }
            },
            Self::Pcre => match compile_pcre(pattern) {
                Ok(re) => filter_ids(ctx.universe, |id| pcre_match(&re, id)),
                Err(err) => {
                    warn!(pattern, error = %err, "invalid regex, matching nothing");
                    MatchSet::new()
                }
            },
            Self::List => list_items(pattern)
                .into_iter()
                .filter(|id| ctx.universe.contains(*id))
                .map(str::to_string)
                .collect(),
            Self::Ipcidr => select_ipcidr(pattern, ctx),
            Self::Range => match ctx.ranges.get(pattern) {
                Some(hosts) => hosts.intersection(ctx.universe).cloned().collect(),
                None => {
                    return Err(ResolveError::RangeUnavailable {
                        expr: pattern.to_string(),
                    });
                }
            },
            Self::Grain | Self::GrainPcre | Self::Pillar | Self::PillarPcre | Self::PillarExact => {
                select_subdict(self, leaf, ctx)
            }
        };
        Ok(selected)
    }

    /// IDs named by the leaf that are not in the universe. Only lists name
    /// IDs explicitly.
    #[must_use]
    pub fn missing(self, leaf: &Leaf, ctx: &MatchContext<'_>) -> Vec<MinionId> {
        match self {
            Self::List => list_items(&leaf.pattern)
                .into_iter()
                .filter(|id| !ctx.universe.contains(*id))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum Document {
    Facts,
    Pillar,
}

/// Read access to the cached metadata of one minion.
pub trait MinionLookup {
    fn lookup(&self, id: &str) -> Option<&MinionData>;
}

impl MinionLookup for HashMap<MinionId, MinionData> {
    fn lookup(&self, id: &str) -> Option<&MinionData> {
        self.get(id)
    }
}

/// Everything a leaf needs to evaluate, snapshotted by the caller.
pub struct MatchContext<'a> {
    pub universe: &'a MatchSet,
    pub data: &'a dyn MinionLookup,
    pub ranges: &'a RangeTable,
    /// When false, metadata leaves select nothing.
    pub metadata_enabled: bool,
}

/// Compile a Perl-style regex anchored at the start of the subject.
///
/// Look-around and backreferences are supported.
pub(crate) fn compile_pcre(pattern: &str) -> Result<PcreRegex, fancy_regex::Error> {
    PcreRegex::new(&format!("^(?:{pattern})"))
}

/// A match that exceeds the backtracking limit counts as no match.
pub(crate) fn pcre_match(re: &PcreRegex, subject: &str) -> bool {
    re.is_match(subject).unwrap_or_else(|err| {
        warn!(subject, error = %err, "regex evaluation aborted, treating as no match");
        false
    })
}

fn filter_ids(universe: &MatchSet, keep: impl Fn(&str) -> bool) -> MatchSet {
    universe.iter().filter(|id| keep(id)).cloned().collect()
}

/// Comma-separated IDs, blanks dropped.
fn list_items(pattern: &str) -> Vec<&str> {
    pattern
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

fn select_subdict(kind: MatcherKind, leaf: &Leaf, ctx: &MatchContext<'_>) -> MatchSet {
    let Some((document, comparison)) = kind.subdict() else {
        return MatchSet::new();
    };
    if !ctx.metadata_enabled {
        return MatchSet::new();
    }
    let matcher = SubdictMatcher::new(comparison, leaf.delimiter);
    ctx.universe
        .iter()
        .filter(|id| {
            ctx.data.lookup(id).is_some_and(|doc| {
                let map = match document {
                    Document::Facts => &doc.facts,
                    Document::Pillar => &doc.pillar,
                };
                matcher.matches(map, &leaf.pattern)
            })
        })
        .cloned()
        .collect()
}

fn select_ipcidr(pattern: &str, ctx: &MatchContext<'_>) -> MatchSet {
    if !ctx.metadata_enabled {
        return MatchSet::new();
    }
    let net = match ipcidr::parse_target(pattern) {
        Ok(net) => net,
        Err(reason) => {
            warn!(pattern, %reason, "invalid IP/CIDR target, matching nothing");
            return MatchSet::new();
        }
    };
    ctx.universe
        .iter()
        .filter(|id| {
            ctx.data
                .lookup(id)
                .is_some_and(|doc| ipcidr::matches(&net, &doc.facts))
        })
        .cloned()
        .collect()
}
