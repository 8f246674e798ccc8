//! Autosaved form drafts over a pluggable key/value store.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_logging::{studio_debug, studio_warn};
use thiserror::Error;

const DRAFT_KEY_PREFIX: &str = "draft:";

/// Identity of an editable form, e.g. `video-create-form`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormKey(pub String);

impl FormKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn storage_key(&self) -> String {
        format!("{DRAFT_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural copy of a form's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftSnapshot(pub Value);

impl DraftSnapshot {
    /// Overlays recovered fields onto a form's initial state. Objects merge key by
    /// key (recursively); anything else is replaced by the recovered value.
    pub fn merge_into(&self, initial: Value) -> Value {
        merge_values(initial, &self.0)
    }
}

fn merge_values(base: Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(key) {
                    Some(existing) => merge_values(existing, value),
                    None => value.clone(),
                };
                base.insert(key.clone(), merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay.clone(),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("draft encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key/value storage for serialized snapshots.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Process-lifetime store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Draft save/load/clear over any store. Drafts never expire on their own.
#[derive(Debug, Clone, Default)]
pub struct DraftBook<S> {
    store: S,
}

impl<S: PersistentStore> DraftBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrites any previous draft for `key`.
    pub fn save_draft(&mut self, key: &FormKey, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        let encoded = serde_json::to_string(snapshot)?;
        self.store.set(&key.storage_key(), &encoded)?;
        studio_debug!("Saved draft {} ({} bytes)", key, encoded.len());
        Ok(())
    }

    /// Absent, unreadable and corrupt drafts all come back as `None`.
    pub fn load_draft(&self, key: &FormKey) -> Option<DraftSnapshot> {
        let raw = match self.store.get(&key.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                studio_warn!("Failed to read draft {}: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                studio_warn!("Discarding unreadable draft {}: {}", key, err);
                None
            }
        }
    }

    pub fn clear_draft(&mut self, key: &FormKey) -> Result<(), DraftError> {
        self.store.remove(&key.storage_key())?;
        studio_debug!("Cleared draft {}", key);
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
