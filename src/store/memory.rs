//! In-process key-value store
//!
//! Keeps values in a map guarded by a mutex. Reads and writes can be made to
//! fail on demand, which lets callers exercise their persistence error paths.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{validate_key, KeyValueStore, StoreError};

/// Non-durable store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail until switched off
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set` and `remove` fail until switched off
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Reads a value without going through the async interface
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still structurally valid
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>> {
        Box::pin(async move {
            validate_key(key)?;
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("reads disabled".to_string()));
            }
            Ok(self.lock().get(key).cloned())
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            validate_key(key)?;
            self.check_writes()?;
            self.lock().insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            validate_key(key)?;
            self.check_writes()?;
            self.lock().remove(key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_writes_leave_value_untouched() {
        let store = MemoryStore::new();
        store.set("jwtToken", "abc123").await.expect("Write should succeed");

        store.set_fail_writes(true);
        assert!(store.set("jwtToken", "other").await.is_err());
        assert!(store.remove("jwtToken").await.is_err());

        assert_eq!(store.peek("jwtToken").as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_failing_reads_report_error() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);

        let result = store.get("mealPlan").await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
