// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream Key-Value Store
//!
//! Persists the snapshot under a single key of a JetStream KV bucket. The
//! query store is synchronous, so this backend drives `async-nats` from a
//! private current-thread Tokio runtime.
//!
//! # Layout
//!
//! ```text
//! bucket: <config.bucket>      (default "cim-inventory")
//!   key: resources             SnapshotEnvelope JSON
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_inventory::store::{DurableStore, NatsKvConfig, NatsKvStore};
//!
//! let store = NatsKvStore::connect(NatsKvConfig::default())?;
//! store.initialize()?;
//! # Ok::<(), cim_inventory::store::StoreError>(())
//! ```
//!
//! Calls block the current thread; do not call them from inside another
//! Tokio runtime.

use async_nats::jetstream::{self, kv, stream::StorageType};
use parking_lot::Mutex;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use super::{DurableStore, StoreError, StoreResult};

/// Key holding the snapshot inside the bucket
pub const SNAPSHOT_KEY: &str = "resources";

/// Bucket storage medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KvStorage {
    /// Persist to disk
    #[default]
    File,
    /// Keep in server memory
    Memory,
}

impl From<KvStorage> for StorageType {
    fn from(storage: KvStorage) -> Self {
        match storage {
            KvStorage::File => StorageType::File,
            KvStorage::Memory => StorageType::Memory,
        }
    }
}

/// KV backend configuration
#[derive(Debug, Clone)]
pub struct NatsKvConfig {
    /// Server URL
    pub url: String,
    /// Bucket name
    pub bucket: String,
    /// Revisions kept per key
    pub history: i64,
    /// Storage medium
    pub storage: KvStorage,
    /// Replica count
    pub replicas: usize,
}

impl Default for NatsKvConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            bucket: "cim-inventory".to_string(),
            history: 5,
            storage: KvStorage::File,
            replicas: 1,
        }
    }
}

/// Snapshot store backed by a JetStream KV bucket
pub struct NatsKvStore {
    config: NatsKvConfig,
    runtime: Runtime,
    jetstream: jetstream::Context,
    bucket: Mutex<Option<kv::Store>>,
}

impl NatsKvStore {
    /// Connect to the server; the bucket is bound by `initialize`
    pub fn connect(config: NatsKvConfig) -> StoreResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Backend(format!("failed to start runtime: {}", e)))?;

        let client = runtime
            .block_on(async_nats::connect(config.url.as_str()))
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", config.url, e)))?;

        info!("Connected to NATS at {}", config.url);

        Ok(Self {
            jetstream: jetstream::new(client),
            config,
            runtime,
            bucket: Mutex::new(None),
        })
    }

    /// Backend configuration
    pub fn config(&self) -> &NatsKvConfig {
        &self.config
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn bound(&self) -> StoreResult<kv::Store> {
        self.bucket.lock().clone().ok_or_else(|| {
            StoreError::Unavailable(format!("KV bucket {} is not initialized", self.config.bucket))
        })
    }
}

impl DurableStore for NatsKvStore {
    fn name(&self) -> &str {
        "nats-kv"
    }

    fn initialize(&self) -> StoreResult<()> {
        let name = self.config.bucket.clone();

        let store = self.block_on(async {
            match self.jetstream.get_key_value(name.as_str()).await {
                Ok(store) => Ok(store),
                Err(_) => {
                    self.jetstream
                        .create_key_value(kv::Config {
                            bucket: name.clone(),
                            history: self.config.history,
                            storage: self.config.storage.into(),
                            num_replicas: self.config.replicas,
                            ..Default::default()
                        })
                        .await
                }
            }
        });
        let store = store.map_err(|e| StoreError::Backend(format!("bucket {}: {}", name, e)))?;

        *self.bucket.lock() = Some(store);
        info!("KV bucket {} bound", name);
        Ok(())
    }

    fn destroy(&self) -> StoreResult<()> {
        let name = self.config.bucket.as_str();
        match self.block_on(self.jetstream.delete_key_value(name)) {
            Ok(_) => {
                self.bucket.lock().take();
                warn!("KV bucket {} deleted", name);
                Ok(())
            }
            Err(e) => {
                debug!("Deleting KV bucket {} failed: {}", name, e);
                Err(StoreError::Backend(format!("bucket {}: {}", name, e)))
            }
        }
    }

    fn truncate(&self) -> StoreResult<()> {
        let store = self.bound()?;
        self.block_on(store.purge(SNAPSHOT_KEY))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn read_all(&self) -> StoreResult<Option<Vec<u8>>> {
        let store = self.bound()?;
        let entry = self
            .block_on(store.get(SNAPSHOT_KEY))
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(entry.map(|bytes| bytes.to_vec()))
    }

    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()> {
        let store = self.bound()?;
        let revision = self
            .block_on(store.put(SNAPSHOT_KEY, snapshot.to_vec().into()))
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!("Wrote snapshot revision {} to {}", revision, self.config.bucket);
        Ok(())
    }
}
