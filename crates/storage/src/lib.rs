use anyhow::{Context, Result};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;
use tracing::warn;

use shared::domain::NameEntry;

/// Insertion-ordered mapping from suggested name to its entry. Key order is
/// the pagination order and survives the JSON round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    order: Vec<String>,
    entries: HashMap<String, NameEntry>,
}

impl Registry {
    /// Inserts a fresh entry at the back of the ordering. Returns `false`
    /// without mutating for empty or already-known names.
    pub fn insert(&mut self, name: &str) -> bool {
        if name.is_empty() || self.entries.contains_key(name) {
            return false;
        }
        self.order.push(name.to_string());
        self.entries.insert(name.to_string(), NameEntry::default());
        true
    }

    pub fn vote(&mut self, name: &str) -> Option<u64> {
        let entry = self.entries.get_mut(name)?;
        entry.votes += 1;
        Some(entry.votes)
    }

    pub fn votes_for(&self, name: &str) -> Option<u64> {
        self.entries.get(name).map(|entry| entry.votes)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameEntry)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), &self.entries[name]))
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (name, entry) in self.iter() {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = Registry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from name to entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Registry, A::Error> {
                let mut registry = Registry::default();
                while let Some((name, entry)) = access.next_entry::<String, NameEntry>()? {
                    if registry.entries.insert(name.clone(), entry).is_none() {
                        registry.order.push(name);
                    }
                }
                Ok(registry)
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyExists,
}

/// Durable handle over the suggestion registry. The registry lives in memory
/// and the backing file is rewritten whole after every mutation; mutations
/// run under the internal mutex, so concurrent handlers cannot interleave a
/// load-modify-persist and lose an update.
#[derive(Debug)]
pub struct SuggestionStore {
    path: Option<PathBuf>,
    registry: Mutex<Registry>,
}

impl SuggestionStore {
    /// Opens the store at `path`, creating the parent directory if needed.
    /// A missing file starts an empty registry; malformed content is
    /// discarded with a warning instead of being surfaced.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir_exists(&path)?;
        let registry = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Registry>(&bytes) {
                Ok(registry) => registry,
                Err(error) => {
                    warn!(path = %path.display(), %error, "discarding malformed suggestion file");
                    Registry::default()
                }
            },
            Err(_) => Registry::default(),
        };
        Ok(Self {
            path: Some(path),
            registry: Mutex::new(registry),
        })
    }

    /// Store without a backing file; persistence is a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub async fn add_name(&self, name: &str) -> Result<AddOutcome> {
        let mut registry = self.registry.lock().await;
        if !registry.insert(name) {
            return Ok(AddOutcome::AlreadyExists);
        }
        self.persist(&registry).await?;
        Ok(AddOutcome::Created)
    }

    /// Increments the vote counter for `name` and returns the new count, or
    /// `None` for names the registry does not know. Only a successful vote
    /// touches the backing file.
    pub async fn record_vote(&self, name: &str) -> Result<Option<u64>> {
        let mut registry = self.registry.lock().await;
        let Some(votes) = registry.vote(name) else {
            return Ok(None);
        };
        self.persist(&registry).await?;
        Ok(Some(votes))
    }

    pub async fn votes_for(&self, name: &str) -> Option<u64> {
        self.registry.lock().await.votes_for(name)
    }

    pub async fn entry_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn names(&self) -> Vec<String> {
        self.registry.lock().await.names()
    }

    /// Entries within `[page * size, page * size + size)` in insertion order.
    pub async fn page_of(&self, page: usize, size: usize) -> Vec<(String, u64)> {
        let registry = self.registry.lock().await;
        registry
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .map(|(name, entry)| (name.to_string(), entry.votes))
            .collect()
    }

    /// Rewrites the backing file from the current in-memory state.
    pub async fn flush(&self) -> Result<()> {
        let registry = self.registry.lock().await;
        self.persist(&registry).await
    }

    async fn persist(&self, registry: &Registry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes =
            serde_json::to_vec_pretty(registry).context("serializing suggestion registry")?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("writing suggestion file '{}'", path.display()))?;
        Ok(())
    }
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create parent directory '{}'", parent.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
