// Copyright (c) 2025 - Cowboy AI, Inc.
//! Type Registry
//!
//! Maps a kind name to a constructor producing an empty instance of that
//! kind. Decoding uses it to turn a `type` discriminator into a concrete
//! value. A registry is built once, then shared read-only as
//! `Arc<TypeRegistry>` by every container bound to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::Resource;

/// Zero-argument constructor for an empty resource
pub type Constructor = Arc<dyn Fn() -> Box<dyn Resource> + Send + Sync>;

/// Kind name → constructor table
#[derive(Clone, Default)]
pub struct TypeRegistry {
    constructors: HashMap<String, Constructor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `type_name`
    ///
    /// Registering a name twice replaces the earlier constructor.
    pub fn add<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .constructors
            .insert(type_name.clone(), Arc::new(constructor))
            .is_some()
        {
            debug!("Replaced constructor for resource type {}", type_name);
        }
    }

    /// Register a kind whose empty value is its `Default`
    pub fn register<R>(&mut self, type_name: impl Into<String>)
    where
        R: Resource + Default,
    {
        self.add(type_name, || Box::new(R::default()) as Box<dyn Resource>);
    }

    /// Construct an empty instance, or `None` for an unknown name
    pub fn new_resource(&self, type_name: &str) -> Option<Box<dyn Resource>> {
        self.constructors.get(type_name).map(|constructor| constructor())
    }

    /// Whether `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
