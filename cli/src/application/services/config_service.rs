//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{FleetConfig, apply_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the store cannot read or parse the file.
pub fn load_config(store: &impl ConfigStore) -> Result<FleetConfig> {
    store.load()
}

/// Validate, apply and persist a single setting. Returns the saved config.
///
/// Nothing is written when validation fails.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the store fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<FleetConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}
