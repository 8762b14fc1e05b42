//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use chromaquiz_core::error::StoreError;
use chromaquiz_core::traits::KeyValueStore;

/// A key-value store held in memory.
///
/// Counts calls and can be told to fail reads or writes, which makes it the
/// usual backend for tests of the stats adapter and the engine.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    get_count: AtomicU32,
    set_count: AtomicU32,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Make every following `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every following `set` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of `get` calls made.
    pub fn get_count(&self) -> u32 {
        self.get_count.load(Ordering::Relaxed)
    }

    /// Number of `set` calls made, including failed ones.
    pub fn set_count(&self) -> u32 {
        self.set_count.load(Ordering::Relaxed)
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Io(format!("injected read failure for '{key}'")));
        }
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Io(format!("injected write failure for '{key}'")));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
