// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Inventory Domain
//!
//! Reference resource kinds for a network inventory and the validated
//! values they carry.
//!
//! # Value Objects with Invariants
//!
//! - [`IpAddressWithCidr`] - IPv4/IPv6 address with optional prefix
//! - [`VlanId`] - IEEE 802.1Q VLAN ID (1-4094)
//!
//! # Resource Kinds
//!
//! - [`VlanPool`] - `VLANPool`
//! - [`IpAddressPool`] - `IPAddressPool`
//! - [`Switch`] - `Switch`
//!
//! [`register_network_kinds`] adds all three to a
//! [`TypeRegistry`](crate::resource::TypeRegistry).

pub mod kinds;
pub mod network;

pub use kinds::{
    register_network_kinds, IpAddressPool, Switch, ValidationError, VlanPool, IP_ADDRESS_POOL,
    SWITCH, VLAN_POOL,
};
pub use network::{IpAddressWithCidr, NetworkError, VlanId};
