//! In-memory port implementations shared by the unit tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use anyhow::Result;
use fleet_cli::application::ports::{KeyStore, MinionCache};
use fleet_cli::application::services::resolver::ResolverConfig;
use fleet_common::{MinionData, MinionId};
use serde_json::Value;

/// Fixed list of accepted keys.
pub struct StaticKeys(pub Vec<MinionId>);

impl StaticKeys {
    pub fn of(ids: &[&str]) -> Self {
        Self(ids.iter().map(|s| (*s).to_string()).collect())
    }
}

impl KeyStore for StaticKeys {
    fn list(&self) -> Result<Vec<MinionId>> {
        Ok(self.0.clone())
    }
}

/// Metadata cache holding one bank of documents.
#[derive(Default)]
pub struct MemoryCache {
    pub bank: String,
    pub docs: BTreeMap<MinionId, MinionData>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            bank: "minions".to_string(),
            docs: BTreeMap::new(),
        }
    }

    /// Add a document built from `facts` and `pillar` JSON values.
    #[must_use]
    pub fn with(mut self, id: &str, facts: Value, pillar: Value) -> Self {
        self.docs
            .insert(id.to_string(), MinionData::from_values(facts, pillar));
        self
    }
}

impl MinionCache for MemoryCache {
    fn list(&self, bank: &str) -> Result<Vec<MinionId>> {
        if bank != self.bank {
            return Ok(Vec::new());
        }
        Ok(self.docs.keys().cloned().collect())
    }

    fn fetch(&self, bank: &str, id: &str) -> Result<Option<MinionData>> {
        if bank != self.bank {
            return Ok(None);
        }
        Ok(self.docs.get(id).cloned())
    }
}

/// Cache that fails every read, for error-path tests.
pub struct BrokenCache;

impl MinionCache for BrokenCache {
    fn list(&self, _: &str) -> Result<Vec<MinionId>> {
        anyhow::bail!("cache bank unreadable")
    }

    fn fetch(&self, _: &str, id: &str) -> Result<Option<MinionData>> {
        anyhow::bail!("cannot read cache entry for {id}")
    }
}

pub fn config(keys: &[&str], cache: MemoryCache) -> ResolverConfig {
    ResolverConfig::new(Box::new(StaticKeys::of(keys)), Box::new(cache))
}

/// Sorted IDs of a match set, for readable assertions.
pub fn sorted<'a>(set: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut ids: Vec<&str> = set.into_iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids
}
