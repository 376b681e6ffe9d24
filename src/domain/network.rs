// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants
//!
//! Small validated values carried by the network resource kinds. Both
//! serialize as their plain text form so inventory records stay readable:
//!
//! ```text
//! {"subnets": ["10.0.0.0/8", "2001:db8::/64"]}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),

    #[error("Invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),
}

/// IP address with an optional prefix length
///
/// Invariants:
/// - Valid IPv4 or IPv6 address
/// - Prefix length 0-32 for IPv4, 0-128 for IPv6
///
/// # Examples
///
/// ```rust
/// use cim_inventory::domain::IpAddressWithCidr;
///
/// let subnet: IpAddressWithCidr = "10.0.0.1/8".parse().unwrap();
/// assert_eq!(subnet.network().to_string(), "10.0.0.0");
/// assert!(subnet.contains("10.200.3.4".parse().unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpAddressWithCidr {
    address: IpAddr,
    prefix_length: Option<u8>,
}

impl IpAddressWithCidr {
    /// Parse `address` or `address/prefix`
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref().trim();

        let (addr_str, prefix) = match cidr.split_once('/') {
            Some((addr_str, prefix_str)) => {
                let prefix = prefix_str
                    .parse::<u8>()
                    .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;
                (addr_str, Some(prefix))
            }
            None => (cidr, None),
        };

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        Self::from_parts(address, prefix)
    }

    /// Build from an address and prefix
    pub fn from_parts(address: IpAddr, prefix_length: Option<u8>) -> Result<Self, NetworkError> {
        if let Some(prefix) = prefix_length {
            if prefix > max_prefix(&address) {
                return Err(NetworkError::InvalidPrefixLength(prefix));
            }
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// The address as written
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Prefix length, if one was given
    pub fn prefix_length(&self) -> Option<u8> {
        self.prefix_length
    }

    /// Check if this is an IPv4 address
    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Address with the host bits cleared (the address itself without a prefix)
    pub fn network(&self) -> IpAddr {
        let prefix = self.effective_prefix();
        match self.address {
            IpAddr::V4(v4) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
                IpAddr::from((u32::from(v4) & mask).to_be_bytes())
            }
            IpAddr::V6(v6) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
                IpAddr::from((u128::from(v6) & mask).to_be_bytes())
            }
        }
    }

    /// Whether `ip` falls inside this network
    ///
    /// Without a prefix only the exact address matches.
    pub fn contains(&self, ip: IpAddr) -> bool {
        if ip.is_ipv4() != self.is_ipv4() {
            return false;
        }
        let Ok(host) = Self::from_parts(ip, Some(self.effective_prefix())) else {
            return false;
        };
        host.network() == self.network()
    }

    /// Whether two networks share at least one address
    pub fn overlaps(&self, other: &IpAddressWithCidr) -> bool {
        let (wide, narrow) = if self.effective_prefix() <= other.effective_prefix() {
            (self, other)
        } else {
            (other, self)
        };
        wide.contains(narrow.address)
    }

    /// `address/prefix`, or the bare address
    pub fn as_cidr(&self) -> String {
        match self.prefix_length {
            Some(prefix) => format!("{}/{}", self.address, prefix),
            None => self.address.to_string(),
        }
    }

    fn effective_prefix(&self) -> u8 {
        self.prefix_length
            .unwrap_or_else(|| max_prefix(&self.address))
    }
}

fn max_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl fmt::Display for IpAddressWithCidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for IpAddressWithCidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IpAddressWithCidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IpAddressWithCidr> for String {
    fn from(ip: IpAddressWithCidr) -> Self {
        ip.as_cidr()
    }
}

/// VLAN ID value object (IEEE 802.1Q)
///
/// Invariants:
/// - Valid VLAN ID range (1-4094)
/// - VLAN 0 and 4095 are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Minimum valid VLAN ID
    pub const MIN: u16 = 1;

    /// Maximum valid VLAN ID
    pub const MAX: u16 = 4094;

    /// Validate a VLAN ID
    pub fn new(id: u16) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(NetworkError::InvalidVlanId(id));
        }

        Ok(Self(id))
    }

    /// Get the VLAN ID value
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = NetworkError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}
