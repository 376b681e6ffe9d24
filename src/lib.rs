// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource inventory for the Composable Information Machine
//!
//! This crate provides a polymorphic resource registry and a persistent,
//! queryable store on top of it:
//!
//! - [`resource`] - the `Resource` capability, `TypeRegistry`, `ResourceList`
//!   and `ResourceMap` containers
//! - [`query`] - the `QueryStore` with identity-checked CRUD and selector
//!   queries
//! - [`store`] - the durable-store contract with memory, file and NATS KV
//!   backends
//! - [`domain`] - reference network kinds (`VLANPool`, `IPAddressPool`,
//!   `Switch`)
//! - [`config`] - backend selection from the environment

pub mod config;
pub mod domain;
pub mod errors;
pub mod query;
pub mod resource;
pub mod state_machine;
pub mod store;

// Re-export commonly used types
pub use config::{StoreBackend, StoreConfig};
pub use errors::{InventoryError, InventoryResult};
pub use query::{Operator, Query, QueryStore, SelectorError, StoreLifecycle};
pub use resource::{
    BaseResource, Labels, Resource, ResourceList, ResourceMap, SharedResource, TypeRegistry,
};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError};
