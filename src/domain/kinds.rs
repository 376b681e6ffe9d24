// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Resource Kinds
//!
//! Concrete [`Resource`] kinds for network inventory. Each embeds the common
//! [`BaseResource`] header and adds its own payload:
//!
//! | Kind | Type name | Payload |
//! |---|---|---|
//! | [`VlanPool`] | `VLANPool` | `range_start`, `range_end` |
//! | [`IpAddressPool`] | `IPAddressPool` | `subnets` |
//! | [`Switch`] | `Switch` | `management_ip`, `serial_number`, `model`, `ports` |
//!
//! Containers never call `validate`; callers run it before handing a
//! resource to the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::network::{IpAddressWithCidr, NetworkError, VlanId};
use crate::resource::{BaseResource, Labels, Resource, TypeRegistry};

/// Type name of [`VlanPool`]
pub const VLAN_POOL: &str = "VLANPool";

/// Type name of [`IpAddressPool`]
pub const IP_ADDRESS_POOL: &str = "IPAddressPool";

/// Type name of [`Switch`]
pub const SWITCH: &str = "Switch";

/// Resource validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("resource id is empty")]
    EmptyId,

    #[error("expected type {expected}, found `{found}`")]
    WrongKind { expected: &'static str, found: String },

    #[error("VLAN range {start}-{end} is reversed")]
    ReversedRange { start: u16, end: u16 },

    #[error("address pool has no subnets")]
    NoSubnets,

    #[error("subnet {0} has no prefix length")]
    MissingPrefix(String),

    #[error("subnets {0} and {1} overlap")]
    OverlappingSubnets(String, String),

    #[error("{0} is empty")]
    MissingField(&'static str),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

fn validate_header(base: &BaseResource, expected: &'static str) -> Result<(), ValidationError> {
    if base.id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if base.kind != expected {
        return Err(ValidationError::WrongKind {
            expected,
            found: base.kind.clone(),
        });
    }
    Ok(())
}

macro_rules! impl_resource {
    ($kind:ty) => {
        impl Resource for $kind {
            fn id(&self) -> &str {
                &self.base.id
            }

            fn kind(&self) -> &str {
                &self.base.kind
            }

            fn labels(&self) -> &Labels {
                &self.base.labels
            }
        }
    };
}

/// A contiguous range of VLAN IDs available for allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanPool {
    #[serde(flatten)]
    pub base: BaseResource,
    pub range_start: u16,
    pub range_end: u16,
}

impl VlanPool {
    /// Pool covering `range_start..=range_end`
    pub fn new(id: impl Into<String>, range_start: u16, range_end: u16) -> Self {
        Self {
            base: BaseResource::new(id, VLAN_POOL),
            range_start,
            range_end,
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_label(key, value);
        self
    }

    /// Both ends must be usable VLAN IDs, in order
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_header(&self.base, VLAN_POOL)?;
        let start = VlanId::new(self.range_start)?;
        let end = VlanId::new(self.range_end)?;

        if start > end {
            return Err(ValidationError::ReversedRange {
                start: self.range_start,
                end: self.range_end,
            });
        }
        Ok(())
    }

    /// Number of VLAN IDs in the range
    pub fn size(&self) -> usize {
        if self.range_end < self.range_start {
            0
        } else {
            usize::from(self.range_end - self.range_start) + 1
        }
    }
}

impl_resource!(VlanPool);

/// A set of subnets available for address allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressPool {
    #[serde(flatten)]
    pub base: BaseResource,
    #[serde(default)]
    pub subnets: Vec<IpAddressWithCidr>,
}

impl IpAddressPool {
    /// Pool over `subnets`
    pub fn new(id: impl Into<String>, subnets: Vec<IpAddressWithCidr>) -> Self {
        Self {
            base: BaseResource::new(id, IP_ADDRESS_POOL),
            subnets,
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_label(key, value);
        self
    }

    /// At least one subnet, each in CIDR form, none overlapping
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_header(&self.base, IP_ADDRESS_POOL)?;
        if self.subnets.is_empty() {
            return Err(ValidationError::NoSubnets);
        }

        for (i, subnet) in self.subnets.iter().enumerate() {
            if subnet.prefix_length().is_none() {
                return Err(ValidationError::MissingPrefix(subnet.to_string()));
            }
            if let Some(other) = self.subnets[i + 1..].iter().find(|o| subnet.overlaps(o)) {
                return Err(ValidationError::OverlappingSubnets(
                    subnet.to_string(),
                    other.to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl_resource!(IpAddressPool);

/// A managed network switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    #[serde(flatten)]
    pub base: BaseResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_ip: Option<IpAddressWithCidr>,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub ports: u32,
}

impl Switch {
    pub fn new(
        id: impl Into<String>,
        serial_number: impl Into<String>,
        model: impl Into<String>,
        ports: u32,
    ) -> Self {
        Self {
            base: BaseResource::new(id, SWITCH),
            management_ip: None,
            serial_number: serial_number.into(),
            model: model.into(),
            ports,
        }
    }

    /// Set the management address
    pub fn with_management_ip(mut self, ip: IpAddressWithCidr) -> Self {
        self.management_ip = Some(ip);
        self
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_label(key, value);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_header(&self.base, SWITCH)?;
        if self.serial_number.is_empty() {
            return Err(ValidationError::MissingField("serial_number"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::MissingField("model"));
        }
        if self.ports == 0 {
            return Err(ValidationError::MissingField("ports"));
        }
        Ok(())
    }
}

impl_resource!(Switch);

/// Register `VLANPool`, `IPAddressPool` and `Switch`
pub fn register_network_kinds(registry: &mut TypeRegistry) {
    registry.register::<VlanPool>(VLAN_POOL);
    registry.register::<IpAddressPool>(IP_ADDRESS_POOL);
    registry.register::<Switch>(SWITCH);
}
