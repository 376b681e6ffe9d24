// Copyright (c) 2025 - Cowboy AI, Inc.
//! Polymorphic Resource Model
//!
//! Every inventory entity (address pools, VLAN pools, switches, ...) is a
//! [`Resource`]: an ID, a `type` discriminator, optional labels, and a
//! kind-specific payload the containers never look at directly.
//!
//! # Wire Format
//!
//! A resource serializes to a tagged record:
//!
//! ```text
//! {"id": "0100000001", "type": "VLANPool", "labels": {"stage": "prod"}, "range_start": 0, ...}
//! ```
//!
//! The `type` field selects the constructor in a [`TypeRegistry`] when the
//! record is read back, so containers can hold kinds they were never compiled
//! against.
//!
//! # Adding a Kind
//!
//! ```rust
//! use cim_inventory::resource::{BaseResource, Labels, Resource, TypeRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Rack {
//!     #[serde(flatten)]
//!     base: BaseResource,
//!     units: u32,
//! }
//!
//! impl Resource for Rack {
//!     fn id(&self) -> &str { &self.base.id }
//!     fn kind(&self) -> &str { &self.base.kind }
//!     fn labels(&self) -> &Labels { &self.base.labels }
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Rack>("Rack");
//! assert!(registry.new_resource("Rack").is_some());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{InventoryError, InventoryResult};

pub mod list;
pub mod map;
pub mod registry;

pub use list::ResourceList;
pub use map::ResourceMap;
pub use registry::{Constructor, TypeRegistry};

/// Free-form selector labels
pub type Labels = BTreeMap<String, String>;

/// Shared handle to a resource instance
///
/// Containers store handles, so copying a container aliases the instances.
pub type SharedResource = Arc<dyn Resource>;

/// Record field carrying the identifier
pub const ID_FIELD: &str = "id";

/// Record field carrying the kind discriminator
pub const TYPE_FIELD: &str = "type";

/// Record-level encode/decode of a resource
///
/// Blanket-implemented for every serde type, so kinds only derive
/// `Serialize` and `Deserialize`.
pub trait ResourceCodec {
    /// Encode the full attribute set as a JSON record
    fn encode(&self) -> serde_json::Result<Value>;

    /// Replace this instance's attributes with the decoded record
    fn decode(&mut self, record: Value) -> serde_json::Result<()>;
}

impl<T> ResourceCodec for T
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn decode(&mut self, record: Value) -> serde_json::Result<()> {
        *self = serde_json::from_value(record)?;
        Ok(())
    }
}

/// The capability set every inventory kind implements
pub trait Resource: ResourceCodec + Debug + Send + Sync + 'static {
    /// Caller-assigned identifier
    fn id(&self) -> &str;

    /// Kind discriminator; must equal the registry key of the kind
    fn kind(&self) -> &str;

    /// Selector labels (may be empty)
    fn labels(&self) -> &Labels;

    /// Look up a single label
    fn label(&self, key: &str) -> Option<&str> {
        self.labels().get(key).map(String::as_str)
    }

    /// Look up a structural attribute by name
    ///
    /// `id` and `type` resolve to the header fields in any ASCII case.
    /// Other names are looked up in the encoded record, exact key first and
    /// then ignoring ASCII case and underscores, so `RangeEnd` finds
    /// `range_end`. Strings, numbers and booleans yield a value; arrays,
    /// objects and null do not.
    fn property(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(ID_FIELD) {
            return Some(self.id().to_string());
        }
        if name.eq_ignore_ascii_case(TYPE_FIELD) {
            return Some(self.kind().to_string());
        }

        let record = self.encode().ok()?;
        record_property(&record, name)
    }
}

fn record_property(record: &Value, name: &str) -> Option<String> {
    let fields = record.as_object()?;
    let value = fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(field, _)| folded(field).eq(folded(name)))
            .map(|(_, value)| value)
    })?;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn folded(name: &str) -> impl Iterator<Item = u8> + '_ {
    name.bytes()
        .filter(|b| *b != b'_')
        .map(|b| b.to_ascii_lowercase())
}

/// Encode a resource into a tagged record
///
/// The `type` field is always written from [`Resource::kind`], even when a
/// kind's own serialization omits it.
pub(crate) fn encode_record(resource: &dyn Resource) -> InventoryResult<Value> {
    let mut record = resource.encode()?;
    match &mut record {
        Value::Object(fields) => {
            fields.insert(
                TYPE_FIELD.to_string(),
                Value::String(resource.kind().to_string()),
            );
            Ok(record)
        }
        other => Err(InventoryError::Serialization(format!(
            "{} {} encoded as {}, expected an object",
            resource.kind(),
            resource.id(),
            json_kind(other)
        ))),
    }
}

/// Human-readable JSON type name for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Common resource header
///
/// Kinds embed it with `#[serde(flatten)]`. It is also a complete kind on
/// its own for entities without payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResource {
    /// Identifier
    pub id: String,

    /// Kind discriminator
    #[serde(rename = "type")]
    pub kind: String,

    /// Selector labels
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

impl BaseResource {
    /// Create a header with no labels
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            labels: Labels::new(),
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

impl Resource for BaseResource {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }
}
