//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `fleet_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.
//!
//! Every port is read-only from the resolver's point of view and must be
//! safe to call from several resolutions at once.

use std::path::PathBuf;

use anyhow::Result;
use fleet_common::{MinionData, MinionId};

use crate::domain::config::FleetConfig;

// ── Fleet state ───────────────────────────────────────────────────────────────

/// The set of minions with an accepted authentication key.
#[cfg_attr(test, mockall::automock)]
pub trait KeyStore: Send + Sync {
    /// All accepted minion IDs, in no particular order.
    fn list(&self) -> Result<Vec<MinionId>>;
}

/// Per-minion metadata documents, partitioned into named banks.
#[cfg_attr(test, mockall::automock)]
pub trait MinionCache: Send + Sync {
    /// IDs with a document in `bank`.
    fn list(&self, bank: &str) -> Result<Vec<MinionId>>;
    /// The document for `id`, or `None` if the minion has not reported yet.
    fn fetch(&self, bank: &str, id: &str) -> Result<Option<MinionData>>;
}

/// External range service for `R@` targets.
#[cfg_attr(test, mockall::automock)]
pub trait RangeExpander: Send + Sync {
    /// Host names selected by a range expression.
    fn expand(&self, expr: &str) -> Result<Vec<String>>;
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Abstracts configuration persistence (load/save).
#[cfg_attr(test, mockall::automock)]
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<FleetConfig>;
    /// Persist the configuration.
    fn save(&self, config: &FleetConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
