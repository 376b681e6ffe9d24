// Copyright (c) 2025 - Cowboy AI, Inc.
//! Store Configuration
//!
//! Selects and builds the durable backend from the environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `INVENTORY_STORE` | `memory` | `memory`, `file` or `nats` |
//! | `INVENTORY_STORE_DIR` | `./inventory-data` | root directory for `file` |
//! | `NATS_URL` | `nats://localhost:4222` | server for `nats` |
//! | `INVENTORY_KV_BUCKET` | `cim-inventory` | KV bucket for `nats` |
//!
//! The `nats` backend needs the `nats` feature.

use std::path::PathBuf;
use tracing::info;

use crate::errors::{InventoryError, InventoryResult};
use crate::store::{DurableStore, FileStore, MemoryStore};
#[cfg(feature = "nats")]
use crate::store::{NatsKvConfig, NatsKvStore};

/// Backend selector variable
pub const STORE_VAR: &str = "INVENTORY_STORE";
/// File backend root variable
pub const STORE_DIR_VAR: &str = "INVENTORY_STORE_DIR";
/// NATS server variable
pub const NATS_URL_VAR: &str = "NATS_URL";
/// KV bucket variable
pub const KV_BUCKET_VAR: &str = "INVENTORY_KV_BUCKET";

const DEFAULT_STORE_DIR: &str = "./inventory-data";
const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
const DEFAULT_KV_BUCKET: &str = "cim-inventory";

/// Which durable backend to use
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process memory; nothing survives a restart
    #[default]
    Memory,
    /// Snapshot file under `root`
    File { root: PathBuf },
    /// JetStream KV bucket
    Nats { url: String, bucket: String },
}

/// Durable store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InventoryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` (an environment stand-in)
    pub fn from_lookup<F>(lookup: F) -> InventoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = match var(STORE_VAR, "memory").trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "file" => StoreBackend::File {
                root: PathBuf::from(var(STORE_DIR_VAR, DEFAULT_STORE_DIR)),
            },
            "nats" => StoreBackend::Nats {
                url: var(NATS_URL_VAR, DEFAULT_NATS_URL),
                bucket: var(KV_BUCKET_VAR, DEFAULT_KV_BUCKET),
            },
            other => {
                return Err(InventoryError::Configuration(format!(
                    "{} must be memory, file or nats, got `{}`",
                    STORE_VAR, other
                )))
            }
        };

        Ok(Self { backend })
    }

    /// Build the configured backend (not yet initialized)
    pub fn open_backend(&self) -> InventoryResult<Box<dyn DurableStore>> {
        let store: Box<dyn DurableStore> = match &self.backend {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::File { root } => Box::new(FileStore::new(root.clone())),
            StoreBackend::Nats { url, bucket } => Self::open_nats(url, bucket)?,
        };

        info!("Using {} durable store", store.name());
        Ok(store)
    }

    #[cfg(feature = "nats")]
    fn open_nats(url: &str, bucket: &str) -> InventoryResult<Box<dyn DurableStore>> {
        let config = NatsKvConfig {
            url: url.to_string(),
            bucket: bucket.to_string(),
            ..Default::default()
        };
        Ok(Box::new(NatsKvStore::connect(config)?))
    }

    #[cfg(not(feature = "nats"))]
    fn open_nats(_url: &str, _bucket: &str) -> InventoryResult<Box<dyn DurableStore>> {
        Err(InventoryError::Configuration(
            "the nats backend requires the `nats` feature".to_string(),
        ))
    }
}
