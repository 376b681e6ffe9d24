// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory durable store
//!
//! Keeps the snapshot bytes in process memory. Used for tests and for
//! deployments that rebuild the inventory on every start. Write failures can
//! be injected to exercise the query store's rollback path.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{DurableStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    bound: bool,
    snapshot: Option<Vec<u8>>,
}

/// Process-local snapshot store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Create an unbound store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `write_all` fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Whether the store is bound
    pub fn is_bound(&self) -> bool {
        self.state.lock().bound
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("memory store is not initialized".to_string())
    }
}

impl DurableStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn initialize(&self) -> StoreResult<()> {
        self.state.lock().bound = true;
        Ok(())
    }

    fn destroy(&self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.bound = false;
        state.snapshot = None;
        Ok(())
    }

    fn truncate(&self) -> StoreResult<()> {
        let mut state = self.state.lock();
        if !state.bound {
            return Err(Self::unavailable());
        }
        state.snapshot = None;
        Ok(())
    }

    fn read_all(&self) -> StoreResult<Option<Vec<u8>>> {
        let state = self.state.lock();
        if !state.bound {
            return Err(Self::unavailable());
        }
        Ok(state.snapshot.clone())
    }

    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()> {
        let mut state = self.state.lock();
        if !state.bound {
            return Err(Self::unavailable());
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        state.snapshot = Some(snapshot.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_store_is_unavailable() {
        let store = MemoryStore::new();
        assert!(!store.is_bound());
        assert!(matches!(store.read_all(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.write_all(b"x"), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.truncate(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_write_read_truncate() {
        let store = MemoryStore::new();
        store.initialize().unwrap();
        assert_eq!(store.read_all().unwrap(), None);

        store.write_all(b"one").unwrap();
        store.write_all(b"two").unwrap();
        assert_eq!(store.read_all().unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.write_count(), 2);

        store.truncate().unwrap();
        assert_eq!(store.read_all().unwrap(), None);
    }

    #[test]
    fn test_destroy_requires_reinitialize() {
        let store = MemoryStore::new();
        store.initialize().unwrap();
        store.write_all(b"data").unwrap();

        store.destroy().unwrap();
        assert!(store.read_all().is_err());

        store.initialize().unwrap();
        assert_eq!(store.read_all().unwrap(), None);
    }

    #[test]
    fn test_injected_failure_keeps_previous_snapshot() {
        let store = MemoryStore::new();
        store.initialize().unwrap();
        store.write_all(b"good").unwrap();

        store.fail_writes(true);
        assert!(matches!(store.write_all(b"bad"), Err(StoreError::Backend(_))));
        assert_eq!(store.read_all().unwrap(), Some(b"good".to_vec()));

        store.fail_writes(false);
        store.write_all(b"better").unwrap();
        assert_eq!(store.read_all().unwrap(), Some(b"better".to_vec()));
    }
}
