// lib/crates/fleet-common/src/minion.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Minion identifier. Opaque and case-sensitive.
pub type MinionId = String;

/// Metadata document cached for one minion.
///
/// Written by the metadata collector, read by the target resolver. Older
/// collectors write the host facts under `grains`; both names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinionData {
    /// Static host-reported facts (os, ipv4, ...).
    #[serde(default, alias = "grains")]
    pub facts: Map<String, Value>,
    /// Master-assigned configuration data.
    #[serde(default)]
    pub pillar: Map<String, Value>,
}

impl MinionData {
    /// Build a document from two JSON values. Non-object values become empty maps.
    #[must_use]
    pub fn from_values(facts: Value, pillar: Value) -> Self {
        Self {
            facts: into_map(facts),
            pillar: into_map(pillar),
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
