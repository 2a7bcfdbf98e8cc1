//! Infrastructure implementation of the `KeyStore` port.
//!
//! Accepted keys live one file per minion in `<pki_dir>/<accepted_dir>`;
//! the file name is the minion ID. When the key cache is enabled, the
//! directory may carry a `.key_cache` JSON array of IDs that is read instead.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fleet_common::MinionId;
use tracing::{debug, warn};

use crate::application::ports::KeyStore;

pub const KEY_CACHE_FILE: &str = ".key_cache";

/// Reads accepted minion IDs from the master's key directory.
pub struct PkiKeyStore {
    dir: PathBuf,
    key_cache: bool,
}

impl PkiKeyStore {
    #[must_use]
    pub fn new(dir: PathBuf, key_cache: bool) -> Self {
        Self { dir, key_cache }
    }

    fn read_key_cache(&self) -> Option<Vec<MinionId>> {
        let path = self.dir.join(KEY_CACHE_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read key cache, listing keys instead");
                return None;
            }
        };
        match serde_json::from_str::<Vec<MinionId>>(&content) {
            Ok(ids) => Some(ids),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed key cache, listing keys instead");
                None
            }
        }
    }
}

impl KeyStore for PkiKeyStore {
    fn list(&self) -> Result<Vec<MinionId>> {
        if self.key_cache
            && let Some(ids) = self.read_key_cache()
        {
            debug!(count = ids.len(), "accepted keys from key cache");
            return Ok(ids);
        }
        list_key_dir(&self.dir)
    }
}

/// File names in `dir`, skipping dotfiles and anything that is not a file.
/// A missing directory means no accepted keys.
fn list_key_dir(dir: &Path) -> Result<Vec<MinionId>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "accepted key directory does not exist");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot read {}", dir.display()));
        }
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(dir = %dir.display(), name = ?name, "skipping non UTF-8 key file name");
            continue;
        };
        if name.starts_with('.') || !entry.path().is_file() {
            continue;
        }
        ids.push(name.to_string());
    }
    Ok(ids)
}
