// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Map
//!
//! The full typed snapshot of an inventory: one [`ResourceList`] bucket per
//! kind name. Serializes as a JSON object keyed by kind.
//!
//! The map never keeps an empty bucket around: buckets are created by the
//! first `add` and dropped when their last resource is deleted, so bucket
//! counts and serialized snapshots agree.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{json_kind, Resource, ResourceList, SharedResource, TypeRegistry};
use crate::errors::{InventoryError, InventoryResult};

/// Kind name → bucket of resources
///
/// `Clone` is shallow: buckets are new, resource instances are shared.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    registry: Option<Arc<TypeRegistry>>,
    buckets: BTreeMap<String, ResourceList>,
}

impl ResourceMap {
    /// Create an empty map bound to `registry`
    pub fn new(registry: Option<Arc<TypeRegistry>>) -> Self {
        Self {
            registry,
            buckets: BTreeMap::new(),
        }
    }

    /// The registry shared by every bucket
    pub fn registry(&self) -> Option<&Arc<TypeRegistry>> {
        self.registry.as_ref()
    }

    /// Append `resource` to the `type_name` bucket
    ///
    /// No uniqueness check is made at this layer. The resource's kind must
    /// equal `type_name`, otherwise the record is malformed and the map is
    /// left unchanged.
    pub fn add(
        &mut self,
        resource: SharedResource,
        type_name: impl Into<String>,
    ) -> InventoryResult<()> {
        let type_name = type_name.into();
        if resource.kind() != type_name {
            return Err(InventoryError::MalformedRecord(format!(
                "{} {} cannot be stored under bucket {}",
                resource.kind(),
                resource.id(),
                type_name
            )));
        }

        let registry = &self.registry;
        self.buckets
            .entry(type_name)
            .or_insert_with(|| ResourceList::new(registry.clone()))
            .push(resource);
        Ok(())
    }

    /// Remove the first resource in `type_name` whose ID matches `resource`
    ///
    /// Returns whether anything was removed; a miss is not an error here.
    pub fn delete(&mut self, resource: &dyn Resource, type_name: &str) -> bool {
        let Some(bucket) = self.buckets.get_mut(type_name) else {
            return false;
        };

        let removed = bucket.remove_by_id(resource.id()).is_some();
        if bucket.is_empty() {
            self.buckets.remove(type_name);
        }
        removed
    }

    /// The bucket for `type_name`
    pub fn bucket(&self, type_name: &str) -> Option<&ResourceList> {
        self.buckets.get(type_name)
    }

    pub(crate) fn bucket_mut(&mut self, type_name: &str) -> Option<&mut ResourceList> {
        self.buckets.get_mut(type_name)
    }

    /// Buckets in kind-name order
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &ResourceList)> {
        self.buckets.iter().map(|(name, list)| (name.as_str(), list))
    }

    /// Kind names that currently have resources
    pub fn type_names(&self) -> Vec<&str> {
        self.buckets.keys().map(String::as_str).collect()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when there are no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of resources across all buckets
    pub fn resource_count(&self) -> usize {
        self.buckets.values().map(ResourceList::len).sum()
    }

    /// Every resource, bucket by bucket
    pub fn resources(&self) -> impl Iterator<Item = &SharedResource> {
        self.buckets.values().flat_map(ResourceList::iter)
    }

    /// The resource `(type_name, id)`
    pub fn find(&self, type_name: &str, id: &str) -> Option<&SharedResource> {
        self.buckets.get(type_name)?.find(id)
    }

    /// Whether `(type_name, id)` is present
    pub fn contains(&self, type_name: &str, id: &str) -> bool {
        self.find(type_name, id).is_some()
    }

    /// Replace this map's buckets with shallow copies of `src`'s
    ///
    /// The registry of `self` is kept.
    pub fn copy_from(&mut self, src: &ResourceMap) {
        self.buckets = src
            .buckets
            .iter()
            .map(|(name, list)| {
                let mut copy = ResourceList::new(self.registry.clone());
                copy.copy_from(list);
                (name.clone(), copy)
            })
            .collect();
    }

    /// A new map with only the resources matching `keep`
    pub fn filter(&self, mut keep: impl FnMut(&dyn Resource) -> bool) -> ResourceMap {
        let mut filtered = ResourceMap::new(self.registry.clone());
        for (name, list) in &self.buckets {
            let mut copy = list.clone();
            copy.retain(&mut keep);
            if !copy.is_empty() {
                filtered.buckets.insert(name.clone(), copy);
            }
        }
        filtered
    }

    /// A new map with only the named buckets
    pub fn select_types<I, S>(&self, type_names: I) -> ResourceMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = type_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let mut selected = ResourceMap::new(self.registry.clone());
        for (name, list) in &self.buckets {
            if wanted.contains(name) {
                selected.buckets.insert(name.clone(), list.clone());
            }
        }
        selected
    }

    /// Decode a JSON object of kind → record array and merge it in
    pub fn decode_json(&mut self, bytes: &[u8]) -> InventoryResult<()> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| InventoryError::MalformedRecord(e.to_string()))?;
        self.decode_value(value)
    }

    /// Decode an object of kind → record array and merge it in
    ///
    /// All-or-nothing: if any bucket fails, the map is left unchanged. A
    /// record whose `type` disagrees with its bucket key is malformed.
    pub fn decode_value(&mut self, value: Value) -> InventoryResult<()> {
        let buckets = match value {
            Value::Object(buckets) => buckets,
            other => {
                return Err(InventoryError::MalformedRecord(format!(
                    "expected an object of resource buckets, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut decoded = Vec::with_capacity(buckets.len());
        for (name, records) in buckets {
            let mut list = ResourceList::new(self.registry.clone());
            list.decode_value(records)?;

            if let Some(stray) = list.iter().find(|r| r.kind() != name) {
                return Err(InventoryError::MalformedRecord(format!(
                    "{} {} stored under bucket {}",
                    stray.kind(),
                    stray.id(),
                    name
                )));
            }
            decoded.push((name, list));
        }

        for (name, mut list) in decoded {
            if list.is_empty() {
                continue;
            }
            let registry = &self.registry;
            self.buckets
                .entry(name)
                .or_insert_with(|| ResourceList::new(registry.clone()))
                .append(&mut list);
        }
        Ok(())
    }
}

impl Serialize for ResourceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let non_empty = self.buckets.iter().filter(|(_, list)| !list.is_empty());
        let mut map = serializer.serialize_map(None)?;
        for (name, list) in non_empty {
            map.serialize_entry(name, list)?;
        }
        map.end()
    }
}
