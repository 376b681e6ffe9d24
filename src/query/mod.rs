// Copyright (c) 2025 - Cowboy AI, Inc.
//! Query Store
//!
//! Owns the live [`ResourceMap`] of an inventory, enforces identity rules on
//! create/update/delete, persists every change through a [`DurableStore`] and
//! answers selector queries.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────── write gate (Mutex) ────────────┐
//! create ──> │ copy live ─> apply ─> persist ─> swap in   │ ──> DurableStore
//! update ──> │     (read lock)          (no lock) (write)  │
//! delete ──> └────────────────────────────────────────────┘
//!
//! query* ──> copy live (read lock) ─> filter privately
//! ```
//!
//! A mutation becomes visible only after the backend accepted the new
//! snapshot. If the backend fails, the live map is left exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cim_inventory::query::{Query, QueryStore};
//! use cim_inventory::resource::{BaseResource, ResourceMap, TypeRegistry};
//! use cim_inventory::store::MemoryStore;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<BaseResource>("Rack");
//! let registry = Arc::new(registry);
//!
//! let store = QueryStore::new(ResourceMap::new(Some(registry)), MemoryStore::new());
//! store.initialize()?;
//!
//! store.create(Arc::new(BaseResource::new("r1", "Rack").with_label("site", "ams")))?;
//!
//! let hits = store.query_label(&Query::equal("site", "ams"))?;
//! assert_eq!(hits.resource_count(), 1);
//! # Ok::<(), cim_inventory::InventoryError>(())
//! ```

use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{InventoryError, InventoryResult};
use crate::resource::{Resource, ResourceMap, SharedResource, TypeRegistry};
use crate::state_machine::StateMachine;
use crate::store::{DurableStore, SnapshotEnvelope};

pub mod lifecycle;
pub mod selector;

pub use lifecycle::{LifecycleCommand, StoreLifecycle};
pub use selector::{Operator, Query, SelectorError};

struct LiveState {
    resources: ResourceMap,
    lifecycle: StoreLifecycle,
}

/// Persistent, queryable inventory
pub struct QueryStore<B = Box<dyn DurableStore>> {
    registry: Arc<TypeRegistry>,
    backend: B,
    live: RwLock<LiveState>,
    write_gate: Mutex<()>,
}

impl<B: DurableStore> QueryStore<B> {
    /// Create an uninitialized store seeded with `resources`
    ///
    /// The store adopts the map's registry (an empty one if the map has
    /// none). Nothing is persisted until [`QueryStore::initialize`].
    pub fn new(resources: ResourceMap, backend: B) -> Self {
        let registry = resources.registry().cloned().unwrap_or_default();

        let mut seeded = ResourceMap::new(Some(registry.clone()));
        seeded.copy_from(&resources);

        Self {
            registry,
            backend,
            live: RwLock::new(LiveState {
                resources: seeded,
                lifecycle: StoreLifecycle::Uninitialized,
            }),
            write_gate: Mutex::new(()),
        }
    }

    /// Bind `backend` and recover its persisted snapshot as the live map
    ///
    /// The returned store is ready. An empty backend yields an empty map.
    pub fn open(registry: Arc<TypeRegistry>, backend: B) -> InventoryResult<Self> {
        backend.initialize()?;

        let resources = match backend.read_all()? {
            Some(bytes) => Self::decode_snapshot(&registry, &bytes)?,
            None => ResourceMap::new(Some(registry.clone())),
        };

        info!(
            "Opened {} store with {} resources in {} buckets",
            backend.name(),
            resources.resource_count(),
            resources.len()
        );

        Ok(Self {
            registry,
            backend,
            live: RwLock::new(LiveState {
                resources,
                lifecycle: StoreLifecycle::Ready,
            }),
            write_gate: Mutex::new(()),
        })
    }

    /// The registry used to decode persisted snapshots
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The durable backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> StoreLifecycle {
        self.live.read().lifecycle
    }

    /// Bind the backend and persist the live map as the baseline
    ///
    /// Valid in every state; calling it again re-persists the live map.
    /// Every seeded resource must be of a registered kind, carry an ID and
    /// sit in its own kind's bucket; otherwise nothing is written.
    pub fn initialize(&self) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        let next = self.advance(LifecycleCommand::Initialize)?;

        let baseline = self.snapshot();
        self.check_map(&baseline).map_err(|e| {
            warn!("Rejected baseline for {} store: {}", self.backend.name(), e);
            e
        })?;

        self.backend.initialize()?;
        self.persist(&baseline)?;

        self.live.write().lifecycle = next;
        info!(
            "Initialized {} store with {} resources",
            self.backend.name(),
            baseline.resource_count()
        );
        Ok(())
    }

    /// Destroy the backend and everything persisted in it
    ///
    /// The live map is emptied; only [`QueryStore::initialize`] makes the
    /// store usable again.
    pub fn wipe(&self) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        let next = self.advance(LifecycleCommand::Wipe)?;

        warn!("Wiping {} store", self.backend.name());
        self.backend.destroy()?;

        let mut live = self.live.write();
        live.resources = ResourceMap::new(Some(self.registry.clone()));
        live.lifecycle = next;
        Ok(())
    }

    /// Drop every persisted resource, keeping the backend usable
    pub fn clear(&self) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        self.advance(LifecycleCommand::Clear)?;

        warn!("Clearing {} store", self.backend.name());
        self.backend.truncate()?;

        self.live.write().resources = ResourceMap::new(Some(self.registry.clone()));
        Ok(())
    }

    /// Read the persisted snapshot into a fresh map
    pub fn load(&self) -> InventoryResult<ResourceMap> {
        self.advance(LifecycleCommand::Load)?;

        match self.backend.read_all()? {
            Some(bytes) => Self::decode_snapshot(&self.registry, &bytes),
            None => Ok(ResourceMap::new(Some(self.registry.clone()))),
        }
    }

    /// Add a resource whose `(kind, id)` is not yet stored
    pub fn create(&self, resource: SharedResource) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        self.advance(LifecycleCommand::Mutate)?;
        self.check_record(resource.as_ref())?;

        let kind = resource.kind().to_string();
        let id = resource.id().to_string();

        let mut next = self.snapshot();
        if next.contains(&kind, &id) {
            warn!("Rejected create of existing {} {}", kind, id);
            return Err(InventoryError::AlreadyExists { kind, id });
        }

        next.add(resource, kind.as_str())?;
        self.commit(next)?;

        debug!("Created {} {}", kind, id);
        Ok(())
    }

    /// Replace the stored resource with the same `(kind, id)`
    ///
    /// The new handle takes the old one's place in its bucket. Maps
    /// returned by earlier queries keep the previous instance.
    pub fn update(&self, resource: SharedResource) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        self.advance(LifecycleCommand::Mutate)?;
        self.check_record(resource.as_ref())?;

        let kind = resource.kind().to_string();
        let id = resource.id().to_string();

        let mut next = self.snapshot();
        let slot = next
            .bucket_mut(&kind)
            .and_then(|bucket| bucket.position(&id).map(|index| (bucket, index)));
        let Some((bucket, index)) = slot else {
            warn!("Rejected update of missing {} {}", kind, id);
            return Err(InventoryError::NotFound { kind, id });
        };

        bucket.replace(index, resource);
        self.commit(next)?;

        debug!("Updated {} {}", kind, id);
        Ok(())
    }

    /// Remove the stored resource with the same `(kind, id)`
    pub fn delete(&self, resource: &dyn Resource) -> InventoryResult<()> {
        let _gate = self.write_gate.lock();
        self.advance(LifecycleCommand::Mutate)?;
        self.check_record(resource)?;

        let mut next = self.snapshot();
        if !next.delete(resource, resource.kind()) {
            warn!("Rejected delete of missing {} {}", resource.kind(), resource.id());
            return Err(InventoryError::NotFound {
                kind: resource.kind().to_string(),
                id: resource.id().to_string(),
            });
        }

        self.commit(next)?;

        debug!("Deleted {} {}", resource.kind(), resource.id());
        Ok(())
    }

    /// Independent copy of the whole live map
    pub fn query(&self) -> ResourceMap {
        self.snapshot()
    }

    /// Resources whose ID is listed; unknown IDs are ignored
    pub fn query_uuid<I, S>(&self, ids: I) -> ResourceMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();

        let result = self.snapshot().filter(|r| wanted.contains(r.id()));
        debug!("ID query for {} ids matched {}", wanted.len(), result.resource_count());
        result
    }

    /// Whole buckets for the listed kinds
    pub fn query_type<I, S>(&self, types: I) -> ResourceMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.live.read().resources.select_types(types)
    }

    /// Resources whose label `query.key` satisfies the selector
    pub fn query_label(&self, query: &Query) -> InventoryResult<ResourceMap> {
        query.validate()?;

        let result = self
            .snapshot()
            .filter(|r| query.matches(r.label(&query.key)));
        debug!("Label query `{}` matched {}", query, result.resource_count());
        Ok(result)
    }

    /// Resources whose attribute `query.key` satisfies the selector
    ///
    /// See [`Resource::property`] for how attribute names resolve.
    pub fn query_property(&self, query: &Query) -> InventoryResult<ResourceMap> {
        query.validate()?;

        let result = self
            .snapshot()
            .filter(|r| query.matches(r.property(&query.key).as_deref()));
        debug!("Property query `{}` matched {}", query, result.resource_count());
        Ok(result)
    }

    fn snapshot(&self) -> ResourceMap {
        self.live.read().resources.clone()
    }

    fn advance(&self, command: LifecycleCommand) -> InventoryResult<StoreLifecycle> {
        let state = self.lifecycle();
        state.transition(&command).map(|(next, ())| next).map_err(|e| {
            debug!("{}", e);
            InventoryError::NotInitialized
        })
    }

    fn check_record(&self, resource: &dyn Resource) -> InventoryResult<()> {
        if !self.registry.contains(resource.kind()) {
            return Err(InventoryError::NotRegistered(resource.kind().to_string()));
        }
        if resource.id().is_empty() {
            return Err(InventoryError::MalformedRecord(format!(
                "{} resource has an empty id",
                resource.kind()
            )));
        }
        Ok(())
    }

    fn check_map(&self, resources: &ResourceMap) -> InventoryResult<()> {
        for (name, list) in resources.buckets() {
            for resource in list.iter() {
                self.check_record(resource.as_ref())?;
                if resource.kind() != name {
                    return Err(InventoryError::MalformedRecord(format!(
                        "{} {} stored under bucket {}",
                        resource.kind(),
                        resource.id(),
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    fn commit(&self, next: ResourceMap) -> InventoryResult<()> {
        self.persist(&next)?;
        self.live.write().resources = next;
        Ok(())
    }

    fn persist(&self, resources: &ResourceMap) -> InventoryResult<()> {
        let encoded = serde_json::to_value(resources)?;
        let bytes = SnapshotEnvelope::new(encoded).to_bytes()?;

        self.backend.write_all(&bytes).map_err(|e| {
            warn!("Persisting to {} store failed: {}", self.backend.name(), e);
            InventoryError::from(e)
        })
    }

    fn decode_snapshot(registry: &Arc<TypeRegistry>, bytes: &[u8]) -> InventoryResult<ResourceMap> {
        let envelope = SnapshotEnvelope::from_bytes(bytes)?;

        let mut resources = ResourceMap::new(Some(registry.clone()));
        resources.decode_value(envelope.resources)?;
        Ok(resources)
    }
}

impl<B: DurableStore> fmt::Debug for QueryStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.live.read();
        f.debug_struct("QueryStore")
            .field("backend", &self.backend.name())
            .field("lifecycle", &live.lifecycle)
            .field("resources", &live.resources.resource_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BaseResource;
    use crate::store::MemoryStore;

    fn registry() -> Arc<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        registry.register::<BaseResource>("Rack");
        Arc::new(registry)
    }

    fn rack(id: &str) -> SharedResource {
        Arc::new(BaseResource::new(id, "Rack"))
    }

    fn ready_store() -> QueryStore<MemoryStore> {
        let store = QueryStore::new(ResourceMap::new(Some(registry())), MemoryStore::new());
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_new_store_is_uninitialized() {
        let store = QueryStore::new(ResourceMap::new(Some(registry())), MemoryStore::new());
        assert_eq!(store.lifecycle(), StoreLifecycle::Uninitialized);
        assert!(matches!(store.create(rack("r1")), Err(InventoryError::NotInitialized)));
        assert!(matches!(store.load(), Err(InventoryError::NotInitialized)));
    }

    #[test]
    fn test_new_without_registry_rejects_every_kind() {
        let store = QueryStore::new(ResourceMap::default(), MemoryStore::new());
        store.initialize().unwrap();
        assert!(store.registry().is_empty());
        assert!(matches!(store.create(rack("r1")), Err(InventoryError::NotRegistered(_))));
    }

    #[test]
    fn test_initialize_persists_seed() {
        let mut seed = ResourceMap::new(Some(registry()));
        seed.add(rack("r1"), "Rack").unwrap();

        let store = QueryStore::new(seed, MemoryStore::new());
        store.initialize().unwrap();

        assert_eq!(store.backend().write_count(), 1);
        assert!(store.load().unwrap().contains("Rack", "r1"));
    }

    #[test]
    fn test_empty_id_is_malformed() {
        let store = ready_store();
        assert!(matches!(store.create(rack("")), Err(InventoryError::MalformedRecord(_))));
    }

    #[test]
    fn test_query_copy_is_detached() {
        let store = ready_store();
        store.create(rack("r1")).unwrap();

        let mut copy = store.query();
        copy.add(rack("r2"), "Rack").unwrap();

        assert_eq!(store.query().resource_count(), 1);
    }

    #[test]
    fn test_debug_shows_backend_and_state() {
        let store = ready_store();
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("memory"));
        assert!(rendered.contains("Ready"));
    }
}
