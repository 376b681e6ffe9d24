// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Snapshot Round Trips
//!
//! Any inventory built from registered kinds must survive encoding and
//! decoding, and a store restart, with the same `(type, id)` pairs and the
//! same attribute payloads.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use cim_inventory::domain::{IpAddressPool, IpAddressWithCidr, VlanPool, IP_ADDRESS_POOL, VLAN_POOL};
use cim_inventory::query::QueryStore;
use cim_inventory::resource::{Labels, Resource, ResourceCodec, ResourceMap, SharedResource};
use cim_inventory::store::MemoryStore;

use crate::fixtures::{pool_registry, shared};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum KindPlan {
    Vlan { start: u16, end: u16 },
    Addresses { subnets: Vec<IpAddressWithCidr> },
}

fn labels() -> impl Strategy<Value = Labels> {
    prop::collection::btree_map("[a-z][a-z-]{0,7}", "[a-z0-9 ]{0,8}", 0..3)
}

fn subnet() -> impl Strategy<Value = IpAddressWithCidr> {
    (any::<[u8; 4]>(), 0u8..=32).prop_map(|(octets, prefix)| {
        IpAddressWithCidr::from_parts(IpAddr::V4(Ipv4Addr::from(octets)), Some(prefix))
            .expect("prefix within IPv4 range")
    })
}

fn kind_plan() -> impl Strategy<Value = KindPlan> {
    prop_oneof![
        (any::<u16>(), any::<u16>()).prop_map(|(start, end)| KindPlan::Vlan { start, end }),
        prop::collection::vec(subnet(), 0..4).prop_map(|subnets| KindPlan::Addresses { subnets }),
    ]
}

fn inventory() -> impl Strategy<Value = Vec<(KindPlan, Labels)>> {
    prop::collection::vec((kind_plan(), labels()), 0..20)
}

fn build(plans: &[(KindPlan, Labels)]) -> Vec<SharedResource> {
    plans
        .iter()
        .enumerate()
        .map(|(i, (plan, labels))| {
            let id = format!("{:010}", i);
            match plan {
                KindPlan::Vlan { start, end } => {
                    let mut pool = VlanPool::new(id, *start, *end);
                    pool.base.labels = labels.clone();
                    shared(pool)
                }
                KindPlan::Addresses { subnets } => {
                    let mut pool = IpAddressPool::new(id, subnets.clone());
                    pool.base.labels = labels.clone();
                    shared(pool)
                }
            }
        })
        .collect()
}

fn to_map(resources: &[SharedResource]) -> ResourceMap {
    let mut map = ResourceMap::new(Some(pool_registry()));
    for resource in resources {
        map.add(Arc::clone(resource), resource.kind().to_string()).expect("kind matches bucket");
    }
    map
}

fn pairs(map: &ResourceMap) -> BTreeSet<(String, String)> {
    map.resources()
        .map(|r| (r.kind().to_string(), r.id().to_string()))
        .collect()
}

fn assert_same_payloads(left: &ResourceMap, right: &ResourceMap) {
    for resource in left.resources() {
        let other = right
            .find(resource.kind(), resource.id())
            .expect("pair present on both sides");
        assert_eq!(resource.encode().unwrap(), other.encode().unwrap());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: decode(encode(m)) keeps every (type, id) pair and payload
    #[test]
    fn prop_map_round_trip(plans in inventory()) {
        let original = to_map(&build(&plans));
        let encoded = serde_json::to_vec(&original).unwrap();

        let mut decoded = ResourceMap::new(Some(pool_registry()));
        decoded.decode_json(&encoded).unwrap();

        prop_assert_eq!(pairs(&decoded), pairs(&original));
        prop_assert_eq!(decoded.len(), original.len());
        assert_same_payloads(&original, &decoded);
    }

    /// Property: buckets keep insertion order through a round trip
    #[test]
    fn prop_bucket_order_preserved(plans in inventory()) {
        let original = to_map(&build(&plans));
        let mut decoded = ResourceMap::new(Some(pool_registry()));
        decoded.decode_value(serde_json::to_value(&original).unwrap()).unwrap();

        for kind in [VLAN_POOL, IP_ADDRESS_POOL] {
            let ids = |map: &ResourceMap| -> Vec<String> {
                map.bucket(kind)
                    .map(|list| list.iter().map(|r| r.id().to_string()).collect())
                    .unwrap_or_default()
            };
            prop_assert_eq!(ids(&decoded), ids(&original));
        }
    }

    /// Property: a reopened store holds exactly what was created
    #[test]
    fn prop_store_restart(plans in inventory()) {
        let resources = build(&plans);
        let backend = Arc::new(MemoryStore::new());

        let store = QueryStore::new(ResourceMap::new(Some(pool_registry())), backend.clone());
        store.initialize().unwrap();
        for resource in &resources {
            store.create(Arc::clone(resource)).unwrap();
        }

        let reopened = QueryStore::open(pool_registry(), backend).unwrap();
        let expected = to_map(&resources);
        prop_assert_eq!(pairs(&reopened.query()), pairs(&expected));
        assert_same_payloads(&expected, &reopened.query());
    }

    /// Property: create of an existing pair fails and leaves the count alone
    #[test]
    fn prop_duplicate_create_rejected(plans in inventory(), pick in any::<prop::sample::Index>()) {
        let resources = build(&plans);
        prop_assume!(!resources.is_empty());

        let store = QueryStore::new(to_map(&resources), MemoryStore::new());
        store.initialize().unwrap();

        let existing = Arc::clone(pick.get(&resources));
        let err = store.create(existing).unwrap_err();
        prop_assert!(err.is_already_exists());
        prop_assert_eq!(store.query().resource_count(), resources.len());
    }
}
