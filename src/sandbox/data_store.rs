//! Per-scope key/value store.

use std::collections::HashMap;

use serde_json::Value;

/// Private data store owned by one execution scope.
///
/// Starts empty when the scope is pushed and is dropped with it; the
/// cross-scope visibility policy lives in [`Sandbox::lookup`](super::Sandbox).
#[derive(Debug, Default)]
pub struct DataStore {
    entries: HashMap<String, Value>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
