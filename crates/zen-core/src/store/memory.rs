//! In-memory store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::Store;
use crate::error::{Error, Result};

/// In-memory key-value store
///
/// Clones share the same map, so a test can hand one clone to an engine and
/// inspect (or reopen) the data through another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (simulates a full or broken disk)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Store raw JSON under a key, bypassing failure injection
    pub fn insert_raw(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        }
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::Persistence("Memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Persistence(format!(
                "Write to '{}' rejected: storage unavailable",
                key
            )));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Persistence("Memory store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_missing_key() {
        let store = MemoryStore::new();
        assert!(store.read("transactions").unwrap().is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.write("incomes", &json!([{"id": "a"}])).unwrap();
        assert_eq!(other.read("incomes").unwrap(), Some(json!([{"id": "a"}])));
        assert_eq!(other.write_count(), 1);
    }

    #[test]
    fn test_failing_writes() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let err = store.write("budgets", &json!([])).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(store.read("budgets").unwrap().is_none());
    }
}
