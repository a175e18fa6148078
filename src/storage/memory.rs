//! In-memory key-value store.
//!
//! Clones share the same entries, so a test can keep a handle to inspect or
//! sabotage a store that has been moved into a manager.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use super::KeyValueStore;
use crate::error::{GalleryError, Result};

#[derive(Debug, Default)]
struct Shared {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

/// Volatile store with optional quota and write-failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of all keys and values, in bytes.
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        debug!(fail, "Memory store write failure injection");
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.shared
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(GalleryError::StorageFailure(
                "injected write failure".to_string(),
            ));
        }

        let mut entries = self.entries();
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = (others + key.len() + value.len()) as u64;
            if needed > quota {
                return Err(GalleryError::StorageFailure(format!(
                    "quota exceeded: {needed} of {quota} bytes"
                )));
            }
        }

        trace!(key, bytes = value.len(), "Memory store write");
        entries.insert(key.to_string(), value.to_string());
        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
