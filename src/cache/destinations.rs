use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    name: String,
}

/// Set of destinations whose triples are already in the graph
///
/// Mirrored to a JSON file of `[{"name": ...}]` records so ingestion is not
/// repeated across restarts. Order of first insertion is preserved.
pub struct DestinationCache {
    path: PathBuf,
    names: Mutex<Vec<String>>,
}

impl DestinationCache {
    /// Load the registry from `path`. A missing file is an empty registry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let names = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let entries: Vec<Entry> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            };
            let mut names: Vec<String> = Vec::with_capacity(entries.len());
            for entry in entries {
                if !names.contains(&entry.name) {
                    names.push(entry.name);
                }
            }
            names
        } else {
            Vec::new()
        };

        log::debug!("Loaded {} known destinations from {}", names.len(), path.display());

        Ok(Self {
            path,
            names: Mutex::new(names),
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn names_set(&self) -> HashSet<String> {
        self.names().into_iter().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|n| n == name)
    }

    /// Record a destination and rewrite the file. Returns `false` if it was
    /// already known (the file is left untouched).
    pub fn insert(&self, name: &str) -> Result<bool> {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if names.iter().any(|n| n == name) {
            return Ok(false);
        }
        names.push(name.to_string());

        let entries: Vec<Entry> = names.iter().map(|n| Entry { name: n.clone() }).collect();
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(true)
    }
}
