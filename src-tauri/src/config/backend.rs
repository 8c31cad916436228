//! Key/value storage behind the preference and shortcut stores.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tauri::Runtime;
use tauri_plugin_store::Store;

use crate::error::ShellResult;

/// Minimal persisted key/value interface.
///
/// `set` only stages a value; `save` makes it durable. Callers that need a
/// value persisted before they notify anyone call both.
pub trait PreferenceBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn save(&self) -> ShellResult<()>;
}

/// Backend over a `tauri-plugin-store` file.
pub struct StoreBackend<R: Runtime> {
    store: Arc<Store<R>>,
}

impl<R: Runtime> StoreBackend<R> {
    pub fn new(store: Arc<Store<R>>) -> Self {
        Self { store }
    }
}

impl<R: Runtime> PreferenceBackend for StoreBackend<R> {
    fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.store.set(key, value);
    }

    fn save(&self) -> ShellResult<()> {
        self.store.save()?;
        Ok(())
    }
}

/// In-process backend.
///
/// Used when the store file cannot be opened (the app then runs on defaults
/// for the session) and by tests.
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `entries`, as if written by an earlier run.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let values = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }

    fn save(&self) -> ShellResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.get("k").is_none());

        backend.set("k", json!(true));
        assert_eq!(backend.get("k"), Some(json!(true)));
        assert!(backend.save().is_ok());
    }

    #[test]
    fn test_memory_backend_with_entries() {
        let backend = MemoryBackend::with_entries([("a", json!(1)), ("b", json!("two"))]);
        assert_eq!(backend.get("a"), Some(json!(1)));
        assert_eq!(backend.get("b"), Some(json!("two")));
    }
}
