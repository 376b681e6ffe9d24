// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-inventory
//!
//! Provides deterministic resources and registries for the integration
//! tests. All IDs and labels are fixed constants so runs are reproducible.
//!
//! # Design Principles
//! - Fixtures are the only place that constructs network resources
//! - Every registry is scoped to one test; nothing is process-wide

#![allow(dead_code)]

use std::sync::Arc;

use cim_inventory::domain::{
    register_network_kinds, IpAddressPool, IpAddressWithCidr, Switch, VlanPool, IP_ADDRESS_POOL,
    VLAN_POOL,
};
use cim_inventory::query::QueryStore;
use cim_inventory::resource::{ResourceMap, SharedResource, TypeRegistry};
use cim_inventory::store::MemoryStore;

pub const VLAN_ID_1: &str = "0100000001";
pub const POOL_ID_2: &str = "0200000001";
pub const MISSING_ID: &str = "0300000001";

pub const OWNER_KEY: &str = "product-owner";
pub const TEAM_KEY: &str = "team";

/// Registry with only `VLANPool`
pub fn vlan_registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register::<VlanPool>(VLAN_POOL);
    Arc::new(registry)
}

/// Registry with `VLANPool` and `IPAddressPool` (no `Switch`)
pub fn pool_registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register::<VlanPool>(VLAN_POOL);
    registry.register::<IpAddressPool>(IP_ADDRESS_POOL);
    Arc::new(registry)
}

/// Registry with every network kind
pub fn network_registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    register_network_kinds(&mut registry);
    Arc::new(registry)
}

/// `0100000001`, VLANs 1-10, no labels
pub fn vlan_pool() -> VlanPool {
    VlanPool::new(VLAN_ID_1, 1, 10)
}

/// `0200000001`, VLANs 1-5, with `labels`
pub fn second_vlan_pool(labels: &[(&str, &str)]) -> VlanPool {
    labels
        .iter()
        .fold(VlanPool::new(POOL_ID_2, 1, 5), |pool, (k, v)| pool.with_label(*k, *v))
}

/// `10.0.0.1/8`
pub fn subnet() -> IpAddressWithCidr {
    IpAddressWithCidr::new("10.0.0.1/8").expect("valid fixture subnet")
}

/// `0100000001` VLAN pool owned by shravya
pub fn owned_vlan_pool() -> VlanPool {
    vlan_pool().with_label(OWNER_KEY, "shravya")
}

/// `0200000001` address pool owned by nandyala
pub fn owned_address_pool() -> IpAddressPool {
    IpAddressPool::new(POOL_ID_2, vec![subnet()])
        .with_label(OWNER_KEY, "nandyala")
        .with_label(TEAM_KEY, "cloud networking")
}

/// A switch whose kind the pool registry does not know
pub fn unregistered_switch() -> Switch {
    Switch::new("0400000001", "SN-0001", "EX4300", 48)
}

/// Map with the labelled VLAN pool and address pool
pub fn labelled_map(registry: Arc<TypeRegistry>) -> ResourceMap {
    let mut map = ResourceMap::new(Some(registry));
    map.add(Arc::new(owned_vlan_pool()), VLAN_POOL).expect("kind matches bucket");
    map.add(Arc::new(owned_address_pool()), IP_ADDRESS_POOL).expect("kind matches bucket");
    map
}

/// Route crate logs to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Initialized memory-backed store over `seed`
pub fn ready_store(seed: ResourceMap) -> QueryStore<MemoryStore> {
    init_tracing();
    let store = QueryStore::new(seed, MemoryStore::new());
    store.initialize().expect("memory store initializes");
    store
}

/// Initialized store sharing its backend with the caller
pub fn shared_store(seed: ResourceMap) -> (QueryStore<Arc<MemoryStore>>, Arc<MemoryStore>) {
    init_tracing();
    let backend = Arc::new(MemoryStore::new());
    let store = QueryStore::new(seed, backend.clone());
    store.initialize().expect("memory store initializes");
    (store, backend)
}

/// Wrap a resource for the containers
pub fn shared<R: cim_inventory::Resource>(resource: R) -> SharedResource {
    Arc::new(resource)
}
