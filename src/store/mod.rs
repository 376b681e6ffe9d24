// Copyright (c) 2025 - Cowboy AI, Inc.
//! Durable Store Abstraction
//!
//! The query store persists whole snapshots through the [`DurableStore`]
//! contract and never assumes anything about the medium behind it.
//!
//! # Architecture
//!
//! ```text
//! QueryStore ── SnapshotEnvelope (JSON) ──> DurableStore
//!                                              ├── MemoryStore
//!                                              ├── FileStore
//!                                              └── NatsKvStore (feature "nats")
//! ```
//!
//! # Contract
//!
//! 1. **Bind**: `initialize` prepares the medium; it is idempotent
//! 2. **Round-trip**: `read_all` after `write_all` returns the same bytes
//! 3. **Atomic writes**: a failed `write_all` leaves the previous snapshot
//! 4. **Truncate**: `truncate` drops the snapshot, the store stays usable
//! 5. **Destroy**: `destroy` removes the medium; every later call except
//!    `initialize` and `destroy` fails with [`StoreError::Unavailable`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod file;
pub mod memory;
#[cfg(feature = "nats")]
pub mod nats;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "nats")]
pub use nats::{KvStorage, NatsKvConfig, NatsKvStore};

/// Errors surfaced by durable store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store not bound, or destroyed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem failure
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend-specific failure (network, remote service)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Persisted bytes are not a valid snapshot
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Result type for durable store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract consumed by the query store
pub trait DurableStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Bind or create the backing medium
    fn initialize(&self) -> StoreResult<()>;

    /// Remove the backing medium and everything in it
    fn destroy(&self) -> StoreResult<()>;

    /// Drop the persisted snapshot, keeping the medium usable
    fn truncate(&self) -> StoreResult<()>;

    /// Read the persisted snapshot, `None` if nothing was written
    fn read_all(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the persisted snapshot
    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()>;
}

impl<T: DurableStore + ?Sized> DurableStore for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&self) -> StoreResult<()> {
        (**self).initialize()
    }

    fn destroy(&self) -> StoreResult<()> {
        (**self).destroy()
    }

    fn truncate(&self) -> StoreResult<()> {
        (**self).truncate()
    }

    fn read_all(&self) -> StoreResult<Option<Vec<u8>>> {
        (**self).read_all()
    }

    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()> {
        (**self).write_all(snapshot)
    }
}

impl<T: DurableStore + ?Sized> DurableStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(&self) -> StoreResult<()> {
        (**self).initialize()
    }

    fn destroy(&self) -> StoreResult<()> {
        (**self).destroy()
    }

    fn truncate(&self) -> StoreResult<()> {
        (**self).truncate()
    }

    fn read_all(&self) -> StoreResult<Option<Vec<u8>>> {
        (**self).read_all()
    }

    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()> {
        (**self).write_all(snapshot)
    }
}

/// Snapshot framing version written by this crate
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Persisted snapshot envelope
///
/// Wraps the serialized resource map with identification and a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Framing version
    pub format_version: u32,

    /// Unique snapshot ID (UUID v7 for time-ordering)
    pub snapshot_id: Uuid,

    /// When the snapshot was taken
    pub written_at: DateTime<Utc>,

    /// Kind → record array
    pub resources: Value,
}

impl SnapshotEnvelope {
    /// Wrap a serialized resource map
    pub fn new(resources: Value) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            snapshot_id: Uuid::now_v7(),
            written_at: Utc::now(),
            resources,
        }
    }

    /// Encode to JSON bytes
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Decode and check the framing version
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let envelope: Self =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if envelope.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot format version {}",
                envelope.format_version
            )));
        }
        Ok(envelope)
    }
}
