// Copyright (c) 2025 - Cowboy AI, Inc.
//! Filesystem durable store
//!
//! Keeps the snapshot as a single JSON file inside a root directory:
//!
//! ```text
//! <root>/
//!   resources.json                  current snapshot
//!   .resources.json.<uuid>.tmp      in-flight write (renamed into place)
//! ```
//!
//! Writes go to a uniquely named temp file which is synced and then renamed
//! over the snapshot, so a crash mid-write leaves the previous snapshot.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DurableStore, StoreError, StoreResult};

/// Snapshot file name inside the root directory
pub const SNAPSHOT_FILE: &str = "resources.json";

/// Directory-backed snapshot store
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    bound: AtomicBool,
}

impl FileStore {
    /// Create a store rooted at `root`; nothing touches disk until `initialize`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bound: AtomicBool::new(false),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    /// Whether the store is bound
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    fn ensure_bound(&self) -> StoreResult<()> {
        if self.bound.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "file store at {} is not initialized",
                self.root.display()
            )))
        }
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write_temp(&self, temp: &Path, snapshot: &[u8]) -> io::Result<()> {
        let mut file = File::create(temp)?;
        file.write_all(snapshot)?;
        file.sync_all()
    }
}

impl DurableStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn initialize(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| Self::io_error(&self.root, e))?;
        self.bound.store(true, Ordering::SeqCst);

        info!("File store bound at {}", self.root.display());
        Ok(())
    }

    fn destroy(&self) -> StoreResult<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => warn!("File store at {} destroyed", self.root.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Self::io_error(&self.root, e)),
        }

        self.bound.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn truncate(&self) -> StoreResult<()> {
        self.ensure_bound()?;

        let path = self.snapshot_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn read_all(&self) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_bound()?;

        let path = self.snapshot_path();
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn write_all(&self, snapshot: &[u8]) -> StoreResult<()> {
        self.ensure_bound()?;

        let path = self.snapshot_path();
        let temp = self
            .root
            .join(format!(".{}.{}.tmp", SNAPSHOT_FILE, Uuid::now_v7()));

        if let Err(e) = self.write_temp(&temp, snapshot) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&temp, e));
        }

        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&path, e));
        }

        debug!("Wrote {} byte snapshot to {}", snapshot.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let store = FileStore::new("/var/lib/inventory");
        assert_eq!(store.root(), Path::new("/var/lib/inventory"));
        assert_eq!(
            store.snapshot_path(),
            PathBuf::from("/var/lib/inventory/resources.json")
        );
    }

    #[test]
    fn test_unbound_calls_fail_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("never-created");
        let store = FileStore::new(&root);

        assert!(matches!(store.read_all(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.write_all(b"x"), Err(StoreError::Unavailable(_))));
        assert!(!root.exists());
    }

    #[test]
    fn test_failed_destroy_stays_bound() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("inventory");
        let store = FileStore::new(&root);
        store.initialize().unwrap();

        fs::remove_dir_all(&root).unwrap();
        fs::write(&root, b"not a directory").unwrap();

        assert!(matches!(store.destroy(), Err(StoreError::Io { .. })));
        assert!(store.is_bound());
        assert!(root.is_file());
    }
}
