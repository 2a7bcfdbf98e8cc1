use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::minion::MinionId;

/// How a target string is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Shell glob against the minion ID.
    #[default]
    Glob,
    /// Regular expression against the minion ID.
    Pcre,
    /// Comma-separated list of minion IDs.
    List,
    /// Glob against a fact path, e.g. `os:Debian`.
    Grain,
    /// Regular expression against a fact path.
    GrainPcre,
    /// Glob against a pillar path.
    Pillar,
    /// Regular expression against a pillar path.
    PillarPcre,
    /// Exact string comparison against a pillar path.
    PillarExact,
    /// IP address or CIDR network against the `ipv4`/`ipv6` facts.
    Ipcidr,
    /// Range cluster expression, expanded by an external range service.
    Range,
    /// Named group from the master configuration.
    Nodegroup,
    /// Boolean expression over sigil-prefixed terms.
    Compound,
}

impl TargetType {
    pub const ALL: [TargetType; 12] = [
        TargetType::Glob,
        TargetType::Pcre,
        TargetType::List,
        TargetType::Grain,
        TargetType::GrainPcre,
        TargetType::Pillar,
        TargetType::PillarPcre,
        TargetType::PillarExact,
        TargetType::Ipcidr,
        TargetType::Range,
        TargetType::Nodegroup,
        TargetType::Compound,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Glob => "glob",
            TargetType::Pcre => "pcre",
            TargetType::List => "list",
            TargetType::Grain => "grain",
            TargetType::GrainPcre => "grain_pcre",
            TargetType::Pillar => "pillar",
            TargetType::PillarPcre => "pillar_pcre",
            TargetType::PillarExact => "pillar_exact",
            TargetType::Ipcidr => "ipcidr",
            TargetType::Range => "range",
            TargetType::Nodegroup => "nodegroup",
            TargetType::Compound => "compound",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `TargetType::from_str` for names outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target type '{0}'")]
pub struct UnknownTargetType(pub String);

impl FromStr for TargetType {
    type Err = UnknownTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTargetType(s.to_string()))
    }
}

/// Outcome of resolving one target, as printed by `fleet match --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchReport {
    pub target: String,
    pub tgt_type: TargetType,
    pub greedy: bool,
    /// Matched minion IDs, sorted.
    pub minions: Vec<MinionId>,
    /// Explicitly listed IDs that are not known to the master.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MinionId>,
}

/// Outcome of a scope check, as printed by `fleet validate --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeReport {
    /// Compound expression describing the allowed scope.
    pub valid: String,
    pub target: String,
    pub tgt_type: TargetType,
    pub in_scope: bool,
    /// Targeted minions that the allowed scope does not cover, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outside: Vec<MinionId>,
}
