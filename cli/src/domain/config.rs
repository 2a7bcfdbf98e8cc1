//! Domain types and validators for fleet configuration.
//!
//! Pure functions only: no I/O, no filesystem access.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::nodegroup::Nodegroups;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "pki_dir",
    "cachedir",
    "accepted_dir",
    "cache_bank",
    "key_cache",
    "minion_data_cache",
];
pub const VALID_BOOLS: &[&str] = &["true", "false"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.fleet/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Root of the master's key directories.
    pub pki_dir: PathBuf,
    /// Root of the metadata cache.
    pub cachedir: PathBuf,
    /// Sub-directory of `pki_dir` holding accepted minion keys.
    pub accepted_dir: String,
    /// Cache bank holding per-minion metadata documents.
    pub cache_bank: String,
    /// Read accepted IDs from `.key_cache` instead of listing the directory.
    pub key_cache: bool,
    /// When false, facts and pillar are never consulted.
    pub minion_data_cache: bool,
    #[serde(skip_serializing_if = "Nodegroups::is_empty")]
    pub nodegroups: Nodegroups,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            pki_dir: PathBuf::from("/etc/fleet/pki/master"),
            cachedir: PathBuf::from("/var/cache/fleet/master"),
            accepted_dir: "minions".to_string(),
            cache_bank: "minions".to_string(),
            key_cache: false,
            minion_data_cache: true,
            nodegroups: Nodegroups::new(),
        }
    }
}

impl FleetConfig {
    /// Directory whose entries are the accepted minion IDs.
    #[must_use]
    pub fn accepted_keys_dir(&self) -> PathBuf {
        self.pki_dir.join(&self.accepted_dir)
    }

    /// Current value of a scalar key, as shown by `config show`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "pki_dir" => Some(self.pki_dir.display().to_string()),
            "cachedir" => Some(self.cachedir.display().to_string()),
            "accepted_dir" => Some(self.accepted_dir.clone()),
            "cache_bank" => Some(self.cache_bank.clone()),
            "key_cache" => Some(self.key_cache.to_string()),
            "minion_data_cache" => Some(self.minion_data_cache.to_string()),
            _ => None,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    };
    match key {
        "key_cache" | "minion_data_cache" if !VALID_BOOLS.contains(&value) => {
            Err(invalid(&VALID_BOOLS.join(", ")).into())
        }
        "pki_dir" | "cachedir" if value.trim().is_empty() => Err(invalid("a directory path").into()),
        "accepted_dir" | "cache_bank" if value.is_empty() || value.contains('/') || value == ".." => {
            Err(invalid("a single path component").into())
        }
        _ => Ok(()),
    }
}

/// Validate and store `value` under `key`.
///
/// # Errors
///
/// Returns an error if the key or value fails validation.
pub fn apply_config_value(config: &mut FleetConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    match key {
        "pki_dir" => config.pki_dir = PathBuf::from(value),
        "cachedir" => config.cachedir = PathBuf::from(value),
        "accepted_dir" => config.accepted_dir = value.to_string(),
        "cache_bank" => config.cache_bank = value.to_string(),
        "key_cache" => config.key_cache = value == "true",
        "minion_data_cache" => config.minion_data_cache = value == "true",
        _ => {}
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
