//! Infrastructure implementation of the `MinionCache` port.
//!
//! Layout: `<cachedir>/<bank>/<minion id>/data.json`, one JSON document
//! with `facts` (or legacy `grains`) and `pillar` objects per minion.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fleet_common::{MinionData, MinionId};
use tracing::debug;

use crate::application::ports::MinionCache;

pub const DATA_FILE: &str = "data.json";

/// Metadata cache stored as plain JSON files.
pub struct FsMinionCache {
    root: PathBuf,
}

impl FsMinionCache {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn entry_path(&self, bank: &str, id: &str) -> Option<PathBuf> {
        (is_path_component(bank) && is_path_component(id))
            .then(|| self.root.join(bank).join(id).join(DATA_FILE))
    }
}

/// Rejects IDs that would escape the bank directory.
fn is_path_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\', '\0'])
}

impl MinionCache for FsMinionCache {
    fn list(&self, bank: &str) -> Result<Vec<MinionId>> {
        if !is_path_component(bank) {
            anyhow::bail!("invalid cache bank name '{bank}'");
        }
        let dir = self.root.join(bank);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).with_context(|| format!("cannot read {}", dir.display())),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("cannot read {}", dir.display()))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
            {
                ids.push(name.to_string());
            }
        }
        Ok(ids)
    }

    fn fetch(&self, bank: &str, id: &str) -> Result<Option<MinionData>> {
        let Some(path) = self.entry_path(bank, id) else {
            debug!(bank, id, "refusing cache lookup outside the bank");
            return Ok(None);
        };
        read_document(&path)
    }
}

fn read_document(path: &Path) -> Result<Option<MinionData>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("cannot read {}", path.display())),
    };
    let doc = serde_json::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    Ok(Some(doc))
}
