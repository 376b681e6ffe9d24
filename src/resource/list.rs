// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource List
//!
//! An ordered sequence of resources of possibly different concrete kinds.
//! Serializes as a JSON array of tagged records and decodes through the
//! bound [`TypeRegistry`].

use serde::ser::{Error as _, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

use super::{encode_record, json_kind, Resource, SharedResource, TypeRegistry, TYPE_FIELD};
use crate::errors::{InventoryError, InventoryResult};

/// Ordered, polymorphic list of resources
#[derive(Debug, Clone, Default)]
pub struct ResourceList {
    registry: Option<Arc<TypeRegistry>>,
    resources: Vec<SharedResource>,
}

impl ResourceList {
    /// Create an empty list
    ///
    /// Without a registry the list still holds and serializes resources, but
    /// cannot decode any record.
    pub fn new(registry: Option<Arc<TypeRegistry>>) -> Self {
        Self {
            registry,
            resources: Vec::new(),
        }
    }

    /// The registry used for decoding
    pub fn registry(&self) -> Option<&Arc<TypeRegistry>> {
        self.registry.as_ref()
    }

    /// Append a resource
    pub fn push(&mut self, resource: SharedResource) {
        self.resources.push(resource);
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when the list holds nothing
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SharedResource> {
        self.resources.iter()
    }

    /// Resources as a slice
    pub fn as_slice(&self) -> &[SharedResource] {
        &self.resources
    }

    /// Resource at `index`
    pub fn get(&self, index: usize) -> Option<&SharedResource> {
        self.resources.get(index)
    }

    /// Index of the first resource with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.id() == id)
    }

    /// First resource with `id`
    pub fn find(&self, id: &str) -> Option<&SharedResource> {
        self.resources.iter().find(|r| r.id() == id)
    }

    /// Remove the first resource with `id`
    pub fn remove_by_id(&mut self, id: &str) -> Option<SharedResource> {
        let index = self.position(id)?;
        Some(self.resources.remove(index))
    }

    /// Swap the resource at `index` for `resource`, returning the old one
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, resource: SharedResource) -> SharedResource {
        std::mem::replace(&mut self.resources[index], resource)
    }

    /// Keep only the resources matching `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&dyn Resource) -> bool) {
        self.resources.retain(|r| keep(r.as_ref()));
    }

    /// Move all resources of `other` to the end of this list
    pub fn append(&mut self, other: &mut ResourceList) {
        self.resources.append(&mut other.resources);
    }

    /// Replace this list's contents with `src`'s resource handles
    ///
    /// The instances are shared; the lists are independent afterwards.
    pub fn copy_from(&mut self, src: &ResourceList) {
        self.resources = src.resources.clone();
    }

    /// Decode a JSON array of tagged records and append them
    pub fn decode_json(&mut self, bytes: &[u8]) -> InventoryResult<()> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| InventoryError::MalformedRecord(e.to_string()))?;
        self.decode_value(value)
    }

    /// Decode an array of tagged records and append them
    ///
    /// All-or-nothing: if any record fails, the list is left unchanged.
    pub fn decode_value(&mut self, value: Value) -> InventoryResult<()> {
        let records = match value {
            Value::Array(records) => records,
            other => {
                return Err(InventoryError::MalformedRecord(format!(
                    "expected an array of resource records, found {}",
                    json_kind(&other)
                )))
            }
        };

        let decoded = records
            .into_iter()
            .map(|record| self.decode_record(record))
            .collect::<InventoryResult<Vec<_>>>()?;

        self.resources.extend(decoded);
        Ok(())
    }

    fn decode_record(&self, record: Value) -> InventoryResult<SharedResource> {
        let fields = record.as_object().ok_or_else(|| {
            InventoryError::MalformedRecord(format!(
                "expected a resource record, found {}",
                json_kind(&record)
            ))
        })?;

        let kind = match fields.get(TYPE_FIELD) {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(InventoryError::MalformedRecord(format!(
                    "`{}` must be a string, found {}",
                    TYPE_FIELD,
                    json_kind(other)
                )))
            }
            None => {
                return Err(InventoryError::MalformedRecord(format!(
                    "record has no `{}` discriminator",
                    TYPE_FIELD
                )))
            }
        };

        let mut resource = self
            .registry
            .as_ref()
            .and_then(|registry| registry.new_resource(&kind))
            .ok_or_else(|| InventoryError::NotRegistered(kind.clone()))?;

        resource
            .decode(record)
            .map_err(|source| InventoryError::AttributeDecode {
                kind: kind.clone(),
                source,
            })?;

        if resource.kind() != kind {
            return Err(InventoryError::MalformedRecord(format!(
                "record tagged {} decoded as {}",
                kind,
                resource.kind()
            )));
        }

        Ok(Arc::from(resource))
    }
}

impl Serialize for ResourceList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.resources.len()))?;
        for resource in &self.resources {
            let record = encode_record(resource.as_ref()).map_err(S::Error::custom)?;
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BaseResource;
    use serde_json::json;

    fn registry() -> Arc<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        registry.register::<BaseResource>("VLANPool");
        Arc::new(registry)
    }

    #[test]
    fn test_new_list_without_registry() {
        let mut list = ResourceList::new(None);
        assert!(list.is_empty());

        list.push(Arc::new(BaseResource::new("a", "VLANPool")));
        assert_eq!(list.len(), 1);
        assert!(serde_json::to_vec(&list).is_ok());

        let err = list
            .decode_value(json!([{"id": "b", "type": "VLANPool"}]))
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotRegistered(kind) if kind == "VLANPool"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_copy_from_is_shallow() {
        let mut source = ResourceList::new(None);
        source.push(Arc::new(BaseResource::new("a", "VLANPool")));

        let mut copy = ResourceList::new(None);
        copy.copy_from(&source);
        assert_eq!(copy.len(), 1);
        assert!(Arc::ptr_eq(&copy.as_slice()[0], &source.as_slice()[0]));

        copy.remove_by_id("a");
        assert!(copy.is_empty());
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_decode_preserves_order() {
        let mut list = ResourceList::new(Some(registry()));
        list.decode_value(json!([
            {"id": "3", "type": "VLANPool"},
            {"id": "1", "type": "VLANPool"},
            {"id": "2", "type": "VLANPool"},
        ]))
        .unwrap();

        let ids: Vec<&str> = list.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_decode_failures() {
        let mut list = ResourceList::new(Some(registry()));

        assert!(list.decode_json(b"").is_err());
        assert!(matches!(
            list.decode_value(json!([{"id": "0100000001"}])),
            Err(InventoryError::MalformedRecord(_))
        ));
        assert!(matches!(
            list.decode_value(json!([{"id": "0100000001", "type": 123}])),
            Err(InventoryError::MalformedRecord(_))
        ));
        assert!(matches!(
            list.decode_value(json!([{"id": "0100000001", "type": "invalid"}])),
            Err(InventoryError::NotRegistered(_))
        ));
        assert!(matches!(
            list.decode_value(json!([{"id": 5, "type": "VLANPool"}])),
            Err(InventoryError::AttributeDecode { .. })
        ));
        assert!(matches!(
            list.decode_value(json!({"id": "x"})),
            Err(InventoryError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_failed_decode_leaves_list_unchanged() {
        let mut list = ResourceList::new(Some(registry()));
        list.decode_value(json!([{"id": "keep", "type": "VLANPool"}]))
            .unwrap();

        let result = list.decode_value(json!([
            {"id": "good", "type": "VLANPool"},
            {"id": "bad", "type": "Unknown"},
        ]));
        assert!(result.is_err());
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].id(), "keep");
    }

    #[test]
    fn test_serialize_then_decode() {
        let mut list = ResourceList::new(Some(registry()));
        list.push(Arc::new(
            BaseResource::new("0100001", "VLANPool").with_label("stage", "dev"),
        ));

        let bytes = serde_json::to_vec(&list).unwrap();
        let mut decoded = ResourceList::new(Some(registry()));
        decoded.decode_json(&bytes).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.as_slice()[0].label("stage"), Some("dev"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = ResourceList::new(None);
        list.push(Arc::new(BaseResource::new("a", "VLANPool")));
        list.push(Arc::new(BaseResource::new("b", "VLANPool")));

        let old = list.replace(0, Arc::new(BaseResource::new("a", "VLANPool").with_label("x", "y")));
        assert!(old.labels().is_empty());
        assert_eq!(list.position("a"), Some(0));
        assert_eq!(list.find("a").unwrap().label("x"), Some("y"));
    }
}
