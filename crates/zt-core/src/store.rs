//! Preference store abstraction
//!
//! The real backend is the browser's synced storage area. Everything in this
//! crate talks to it through [`PreferenceStore`] so the protocol can run
//! against an in-memory store in tests and tooling.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{Flag, PreferenceSet, StoredEntries};

/// Error type for store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Malformed storage reply: {0}")]
    MalformedReply(String),
}

/// Async key-value store of boolean flags.
///
/// Implementations run on a single-threaded executor, so the futures are not
/// required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait PreferenceStore {
    /// Read the given keys. Keys with no stored value are omitted from the reply.
    async fn get(&self, keys: &[&str]) -> Result<StoredEntries, StoreError>;

    /// Write the given entries, leaving every other key untouched.
    async fn set(&self, entries: StoredEntries) -> Result<(), StoreError>;
}

impl<S: PreferenceStore> PreferenceStore for Rc<S> {
    async fn get(&self, keys: &[&str]) -> Result<StoredEntries, StoreError> {
        (**self).get(keys).await
    }

    async fn set(&self, entries: StoredEntries) -> Result<(), StoreError> {
        (**self).set(entries).await
    }
}

/// Read every flag and fold the reply into a [`PreferenceSet`].
pub async fn load_preferences<S: PreferenceStore>(store: &S) -> Result<PreferenceSet, StoreError> {
    let entries = store.get(&Flag::all_keys()).await?;
    Ok(PreferenceSet::from_entries(&entries))
}

/// Write a single flag.
pub async fn save_flag<S: PreferenceStore>(store: &S, flag: Flag, on: bool) -> Result<(), StoreError> {
    let mut entries = StoredEntries::new();
    entries.insert(flag.storage_key().to_string(), on);
    store.set(entries).await
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<StoredEntries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: StoredEntries) -> Self {
        Self { entries: RefCell::new(entries) }
    }

    /// Parse a JSON object of the kind the browser's storage export produces.
    /// Non-boolean values are dropped.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StoreError::MalformedReply(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| StoreError::MalformedReply("expected a JSON object".to_string()))?;

        let entries = object
            .iter()
            .filter_map(|(key, value)| value.as_bool().map(|b| (key.clone(), b)))
            .collect();
        Ok(Self::with_entries(entries))
    }

    /// Write a value synchronously.
    pub fn insert(&self, key: impl Into<String>, value: bool) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    pub fn snapshot(&self) -> StoredEntries {
        self.entries.borrow().clone()
    }
}

impl PreferenceStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoredEntries, StoreError> {
        let entries = self.entries.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), *value)))
            .collect())
    }

    async fn set(&self, entries: StoredEntries) -> Result<(), StoreError> {
        self.entries.borrow_mut().extend(entries);
        Ok(())
    }
}
