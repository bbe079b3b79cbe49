//! GETNEXT over tables keyed by multi-arc indexes.

mod common;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::ops::Bound;

use common::*;
use mib_expose::error::{MgmtError, MgmtResult};
use mib_expose::handler::{Expose, Handler, LeafOptions};
use mib_expose::index::{IndexKey, IndexString};
use mib_expose::tree::{Table, TableAccess};
use mib_expose::{ErrorStatus, MibRegistry, OidElement, OidSequence, Value, oid};

#[derive(Debug, Clone, Default)]
struct Counter {
    hits: u32,
}

impl Expose for Counter {
    fn expose<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(&mut self.hits, LeafOptions::new(OidElement::new(0, "hits")));
    }
}

/// Read-only rows over any ordered key. Key columns start at 1, the hits
/// column is 3.
struct Rows<K>(BTreeMap<K, u32>);

impl<K> TableAccess for Rows<K>
where
    K: IndexKey + KeyColumns + Ord + Send + Sync + 'static,
{
    type Key = K;
    type Row = Counter;

    const ROW_OFFSET: u32 = 3;

    fn get(&self, key: &K) -> MgmtResult<Counter> {
        self.0
            .get(key)
            .map(|&hits| Counter { hits })
            .ok_or(MgmtError::new(1, 1))
    }

    fn next(&self, key: Option<&K>) -> Option<K> {
        match key {
            None => self.0.keys().next().cloned(),
            Some(k) => self
                .0
                .range((Bound::Excluded(k), Bound::Unbounded))
                .next()
                .map(|(k, _)| k.clone()),
        }
    }

    fn expose_key<H: Handler>(key: &mut K, h: &mut H) {
        key.expose_columns(h);
    }
}

/// Key columns shown by the test tables.
trait KeyColumns {
    fn expose_columns<H: Handler>(&mut self, h: &mut H);
}

impl KeyColumns for Ipv4Addr {
    fn expose_columns<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(self, LeafOptions::new(OidElement::new(0, "addr")));
    }
}

impl KeyColumns for (u8, u32) {
    fn expose_columns<H: Handler>(&mut self, h: &mut H) {
        h.add_leaf(&mut self.0, LeafOptions::new(OidElement::new(0, "slot")));
        h.add_leaf(&mut self.1, LeafOptions::new(OidElement::new(1, "port")));
    }
}

impl KeyColumns for IndexString {
    fn expose_columns<H: Handler>(&mut self, _h: &mut H) {}
}

impl KeyColumns for i32 {
    fn expose_columns<H: Handler>(&mut self, _h: &mut H) {}
}

fn registry<K>(rows: impl IntoIterator<Item = (K, u32)>) -> MibRegistry
where
    K: IndexKey + KeyColumns + Ord + Send + Sync + 'static,
{
    init_tracing();
    let mut r = MibRegistry::bare();
    r.attach_module(Table::new(
        OidElement::new(5, "keyed"),
        Rows(rows.into_iter().collect()),
    ))
    .unwrap();
    r
}

fn next_oid(r: &MibRegistry, oid: OidSequence) -> Option<OidSequence> {
    r.get_next(&oid).ok().map(|vb| vb.oid)
}

fn walk_oids(r: &MibRegistry) -> Vec<OidSequence> {
    r.walk_from(oid!())
        .take(64)
        .map(|vb| vb.unwrap().oid)
        .collect()
}

// ============================================================================
// Ipv4Addr keys: addr at 5.1.1, hits at 5.1.3
// ============================================================================

fn ipv4_table() -> MibRegistry {
    registry([
        (Ipv4Addr::new(10, 0, 0, 1), 1),
        (Ipv4Addr::new(10, 0, 1, 5), 2),
        (Ipv4Addr::new(10, 1, 0, 1), 3),
        (Ipv4Addr::new(192, 168, 1, 1), 4),
    ])
}

#[test]
fn test_ipv4_truncated_index() {
    let r = ipv4_table();
    assert_eq!(next_oid(&r, oid!(5, 1, 1, 10, 0)), Some(oid!(5, 1, 1, 10, 0, 0, 1)));
    assert_eq!(next_oid(&r, oid!(5, 1, 1, 10, 0, 1)), Some(oid!(5, 1, 1, 10, 0, 1, 5)));
    assert_eq!(next_oid(&r, oid!(5, 1, 1, 11)), Some(oid!(5, 1, 1, 192, 168, 1, 1)));
}

#[test]
fn test_ipv4_overflowing_arc() {
    let r = ipv4_table();
    // 10.0.300.1 sorts after every 10.0.x.y
    assert_eq!(
        next_oid(&r, oid!(5, 1, 1, 10, 0, 300, 1)),
        Some(oid!(5, 1, 1, 10, 1, 0, 1))
    );
    assert_eq!(
        next_oid(&r, oid!(5, 1, 1, 10, 300)),
        Some(oid!(5, 1, 1, 192, 168, 1, 1))
    );
    // past the last row of the key column: first row of the hits column
    assert_eq!(next_oid(&r, oid!(5, 1, 1, 300)), Some(oid!(5, 1, 3, 10, 0, 0, 1)));
}

#[test]
fn test_ipv4_trailing_arcs() {
    let r = ipv4_table();
    let vb = r.get_next(&oid!(5, 1, 3, 10, 0, 0, 1, 7)).unwrap();
    assert_eq!(vb.oid, oid!(5, 1, 3, 10, 0, 1, 5));
    assert_eq!(vb.value, Value::Unsigned32(2));
    assert_eq!(r.get(&oid!(5, 1, 3, 10, 0, 0, 1, 7)), Err(ErrorStatus::NoSuchName));
}

#[test]
fn test_ipv4_walk_is_complete() {
    let r = ipv4_table();
    let oids = walk_oids(&r);
    assert_eq!(oids.len(), 8);
    assert!(oids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(r.get(&oid!(5, 1, 3, 192, 168, 1, 1)), Ok(Value::Unsigned32(4)));
}

// ============================================================================
// (u8, u32) keys: slot at 5.1.1, port at 5.1.2, hits at 5.1.3
// ============================================================================

fn slot_port_table() -> MibRegistry {
    registry([((1u8, 10u32), 1), ((1, 20), 2), ((2, 5), 3), ((10, 7), 4)])
}

#[test]
fn test_tuple_truncated_index() {
    let r = slot_port_table();
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 1)), Some(oid!(5, 1, 3, 1, 10)));
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 2)), Some(oid!(5, 1, 3, 2, 5)));
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 3)), Some(oid!(5, 1, 3, 10, 7)));
}

#[test]
fn test_tuple_overflowing_arc() {
    let r = slot_port_table();
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 1, 300)), Some(oid!(5, 1, 3, 2, 5)));
    // slot 300 saturates to the largest key: column exhausted
    assert_eq!(next_oid(&r, oid!(5, 1, 1, 300, 0)), Some(oid!(5, 1, 2, 1, 10)));
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 256)), None);
}

#[test]
fn test_tuple_trailing_arcs() {
    let r = slot_port_table();
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 1, 10, 99)), Some(oid!(5, 1, 3, 1, 20)));
    assert_eq!(r.get(&oid!(5, 1, 2, 1, 20)), Ok(Value::Unsigned32(20)));
}

#[test]
fn test_tuple_walk_is_complete() {
    let oids = walk_oids(&slot_port_table());
    assert_eq!(oids.len(), 12);
    assert!(oids.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================================
// String keys: hits at 5.1.3
// ============================================================================

fn string_table() -> MibRegistry {
    let key = |s: &str| IndexString::new(s).unwrap();
    registry([(key("ab"), 1), (key("\u{e9}"), 2), (key("xyz"), 3)])
}

#[test]
fn test_string_key_with_high_bytes_walk_ends() {
    let r = string_table();
    let oids = walk_oids(&r);
    assert_eq!(
        oids,
        vec![
            oid!(5, 1, 3, 2, 97, 98),
            oid!(5, 1, 3, 2, 195, 169),
            oid!(5, 1, 3, 3, 120, 121, 122),
        ]
    );
    assert_eq!(r.get(&oid!(5, 1, 3, 2, 195, 169)), Ok(Value::Unsigned32(2)));
}

#[test]
fn test_string_key_get_next_advances() {
    let r = string_table();
    assert_eq!(
        next_oid(&r, oid!(5, 1, 3, 2, 195, 169)),
        Some(oid!(5, 1, 3, 3, 120, 121, 122))
    );
    assert_eq!(
        next_oid(&r, oid!(5, 1, 3, 2, 97, 300)),
        Some(oid!(5, 1, 3, 2, 195, 169))
    );
    assert_eq!(next_oid(&r, oid!(5, 1, 3, 2)), Some(oid!(5, 1, 3, 2, 97, 98)));
}

// ============================================================================
// Keys without an index encoding
// ============================================================================

#[test]
fn test_negative_keys_are_skipped() {
    let r = registry([(-2i32, 1), (-1, 2), (0, 3), (4, 4)]);
    assert_eq!(walk_oids(&r), vec![oid!(5, 1, 3, 0), oid!(5, 1, 3, 4)]);
    assert_eq!(r.get(&oid!(5, 1, 3, 0)), Ok(Value::Unsigned32(3)));
}
