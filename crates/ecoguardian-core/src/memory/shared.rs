//! Cloneable, mutex-guarded handle to one [`MemoryBank`].
//!
//! Every method holds the lock for its whole read-modify-write sequence, so
//! value, metadata and index stay consistent across concurrent callers.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;

use super::bank::MemoryBank;
use super::entry::{Context, EntrySnapshot, SearchHit};
use super::error::MemoryResult;
use super::retention::CompactionEvent;
use super::stats::MemoryStatistics;

#[derive(Debug, Clone)]
pub struct SharedMemoryBank {
    inner: Arc<Mutex<MemoryBank>>,
}

impl SharedMemoryBank {
    pub fn new(bank: MemoryBank) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bank)),
        }
    }

    /// Lock the bank for a compound operation.
    ///
    /// A poisoned lock is recovered: every bank method completes its
    /// bookkeeping before anything that could panic.
    pub fn lock(&self) -> MutexGuard<'_, MemoryBank> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn store<T>(&self, key: &str, value: &T, context: Context) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.lock().store(key, value, context)
    }

    pub fn store_in<T>(&self, category: &str, key: &str, value: &T, context: Context) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.lock().store_in(category, key, value, context)
    }

    /// Fetch a copy of a value, counting the access.
    pub fn retrieve(&self, key: &str) -> Option<Value> {
        self.lock().retrieve(key).cloned()
    }

    pub fn retrieve_in(&self, category: &str, key: &str) -> Option<Value> {
        self.lock().retrieve_in(category, key).cloned()
    }

    pub fn retrieve_by_context(&self, query: &Context, limit: usize) -> Vec<EntrySnapshot> {
        self.lock().retrieve_by_context(query, limit)
    }

    pub fn retrieve_recent(&self, window_hours: u64, limit: usize) -> Vec<EntrySnapshot> {
        self.lock().retrieve_recent(window_hours, limit)
    }

    pub fn update<T>(&self, key: &str, value: &T, merge: bool) -> bool
    where
        T: Serialize + ?Sized,
    {
        self.lock().update(key, value, merge)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.lock().delete(key)
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.lock().search(query, limit)
    }

    pub fn compact(&self, target_reduction: f64) -> Option<CompactionEvent> {
        self.lock().compact(target_reduction)
    }

    pub fn get_statistics(&self) -> MemoryStatistics {
        self.lock().get_statistics()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Export while holding the lock; blocks other callers for the file write.
    pub fn export(&self, path: impl AsRef<Path>) -> MemoryResult<()> {
        self.lock().export(path)
    }

    pub fn import(&self, path: impl AsRef<Path>, merge: bool) -> MemoryResult<()> {
        self.lock().import(path, merge)
    }
}

impl Default for SharedMemoryBank {
    fn default() -> Self {
        Self::new(MemoryBank::default())
    }
}

impl From<MemoryBank> for SharedMemoryBank {
    fn from(bank: MemoryBank) -> Self {
        Self::new(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryBankConfig;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let bank = SharedMemoryBank::default();
        let other = bank.clone();
        bank.store("k", &json!(1), Context::new());
        assert_eq!(other.retrieve("k"), Some(json!(1)));
        assert_eq!(bank.lock().metadata("k").unwrap().access_count, 1);
    }

    #[test]
    fn test_concurrent_stores_respect_capacity() {
        let bank = SharedMemoryBank::new(
            MemoryBank::new(MemoryBankConfig::new(50, 0.8)).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let bank = bank.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        assert!(bank.store(&format!("t{t}-{i}"), &json!(i), Context::new()));
                        assert!(bank.len() <= 50);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let guard = bank.lock();
        assert!(guard.len() <= 50);
        assert_eq!(guard.memory_store().len(), guard.memory_metadata().len());
    }
}
