//! Table index encoding.
//!
//! A table row is addressed by appending its key to the column OID. The
//! [`IndexKey`] trait converts keys to and from those arcs using two cursors:
//! [`OidImporter`] reads arcs, [`OidExporter`] writes them.
//!
//! Importing has two modes. An exact import (GET, SET) fails on any arc
//! that does not fit the key type. A next import (GETNEXT) instead clamps
//! an oversized arc to the type's maximum and raises the overflow flag.
//! From then on every arc reads as `u32::MAX`, so the decoded key is the
//! largest key that still sorts at or before the requested OID. The caller
//! then asks the table for the row strictly after that key.

use std::net::Ipv4Addr;

use crate::oid::OidSequence;
use crate::value::MacAddress;

/// Cursor reading index arcs into key fields.
#[derive(Debug)]
pub struct OidImporter<'a> {
    arcs: &'a [u32],
    pos: usize,
    next_request: bool,
    ok: bool,
    overflow: bool,
}

impl<'a> OidImporter<'a> {
    pub fn new(index: &'a OidSequence, next_request: bool) -> Self {
        Self {
            arcs: index.arcs(),
            pos: 0,
            next_request,
            ok: true,
            overflow: false,
        }
    }

    /// Take the next arc. After an overflow every arc reads as `u32::MAX`.
    pub fn consume(&mut self) -> Option<u32> {
        if !self.ok {
            return None;
        }
        if self.overflow {
            self.pos = self.arcs.len();
            return Some(u32::MAX);
        }
        match self.arcs.get(self.pos) {
            Some(&arc) => {
                self.pos += 1;
                Some(arc)
            }
            None => {
                self.flag_error();
                None
            }
        }
    }

    /// Take an arc bounded by `max`.
    ///
    /// Exact imports fail when the arc is larger; next imports clamp it and
    /// flag the overflow.
    pub fn consume_max(&mut self, max: u32) -> Option<u32> {
        let x = self.consume()?;
        if x <= max {
            return Some(x);
        }
        if self.next_request {
            self.flag_overflow();
            Some(max)
        } else {
            self.flag_error();
            None
        }
    }

    pub fn flag_error(&mut self) {
        self.ok = false;
    }

    pub fn flag_overflow(&mut self) {
        self.overflow = true;
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn next_request(&self) -> bool {
        self.next_request
    }

    /// True when every arc was consumed.
    pub fn all_consumed(&self) -> bool {
        self.pos >= self.arcs.len()
    }
}

/// Cursor writing key fields as index arcs.
#[derive(Debug, Default)]
pub struct OidExporter {
    oids: OidSequence,
}

impl OidExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arc: u32) {
        self.oids.push(arc);
    }

    pub fn finish(self) -> OidSequence {
        self.oids
    }
}

/// A type usable as a table row key.
pub trait IndexKey: Sized + Clone {
    /// Read the key. `None` leaves the importer flagged as failed.
    fn import(imp: &mut OidImporter<'_>) -> Option<Self>;

    fn export(&self, exp: &mut OidExporter);

    /// The smallest key, used to describe columns without reading a row.
    fn min_key() -> Self;

    /// Whether the key has an index encoding. Tables skip rows whose key
    /// does not, since two such keys could export the same arcs.
    fn indexable(&self) -> bool {
        true
    }

    /// Encode the key as a standalone index.
    fn to_index(&self) -> OidSequence {
        let mut exp = OidExporter::new();
        self.export(&mut exp);
        exp.finish()
    }

    /// Decode an index that must match a key exactly, with no arcs left over.
    fn from_index_exact(index: &OidSequence) -> Option<Self> {
        let mut imp = OidImporter::new(index, false);
        let key = Self::import(&mut imp)?;
        (imp.is_ok() && imp.all_consumed()).then_some(key)
    }
}

impl IndexKey for u32 {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        imp.consume()
    }

    fn export(&self, exp: &mut OidExporter) {
        exp.push(*self);
    }

    fn min_key() -> Self {
        0
    }
}

impl IndexKey for u16 {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        imp.consume_max(u32::from(u16::MAX)).map(|x| x as u16)
    }

    fn export(&self, exp: &mut OidExporter) {
        exp.push(u32::from(*self));
    }

    fn min_key() -> Self {
        0
    }
}

impl IndexKey for u8 {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        imp.consume_max(u32::from(u8::MAX)).map(|x| x as u8)
    }

    fn export(&self, exp: &mut OidExporter) {
        exp.push(u32::from(*self));
    }

    fn min_key() -> Self {
        0
    }
}

/// Only non-negative values are valid index arcs.
impl IndexKey for i32 {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        imp.consume_max(i32::MAX as u32).map(|x| x as i32)
    }

    fn export(&self, exp: &mut OidExporter) {
        exp.push((*self).max(0) as u32);
    }

    fn min_key() -> Self {
        0
    }

    fn indexable(&self) -> bool {
        *self >= 0
    }
}

impl IndexKey for Ipv4Addr {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        let mut b = [0u8; 4];
        for octet in &mut b {
            *octet = imp.consume_max(255)? as u8;
        }
        Some(Ipv4Addr::from(b))
    }

    fn export(&self, exp: &mut OidExporter) {
        for b in self.octets() {
            exp.push(u32::from(b));
        }
    }

    fn min_key() -> Self {
        Ipv4Addr::UNSPECIFIED
    }
}

impl IndexKey for MacAddress {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        let mut b = [0u8; 6];
        for octet in &mut b {
            *octet = imp.consume_max(255)? as u8;
        }
        Some(MacAddress(b))
    }

    fn export(&self, exp: &mut OidExporter) {
        for b in self.0 {
            exp.push(u32::from(b));
        }
    }

    fn min_key() -> Self {
        MacAddress::default()
    }
}

/// Variable length string key: a length arc followed by one arc per byte.
///
/// Ordering follows the encoded index (shorter strings first), which is the
/// order a table must iterate in for GETNEXT to be monotonic. The key holds
/// raw bytes so that every index a table exports can be imported again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IndexString(Vec<u8>);

/// Longest string accepted as an index.
pub const INDEX_STRING_MAX: u32 = 64;

impl IndexString {
    /// `None` when `bytes` is longer than [`INDEX_STRING_MAX`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        (bytes.len() <= INDEX_STRING_MAX as usize).then_some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key as text, when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl Ord for IndexString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for IndexString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl IndexKey for IndexString {
    fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
        let len = imp.consume_max(INDEX_STRING_MAX)?;
        let mut bytes = Vec::with_capacity(len as usize);
        for _ in 0..len {
            bytes.push(imp.consume_max(u32::from(u8::MAX))? as u8);
        }
        Some(IndexString(bytes))
    }

    fn export(&self, exp: &mut OidExporter) {
        exp.push(self.0.len() as u32);
        for &b in &self.0 {
            exp.push(u32::from(b));
        }
    }

    fn min_key() -> Self {
        Self::default()
    }
}

macro_rules! tuple_key {
    ($($name:ident),+) => {
        impl<$($name: IndexKey),+> IndexKey for ($($name,)+) {
            fn import(imp: &mut OidImporter<'_>) -> Option<Self> {
                Some(($($name::import(imp)?,)+))
            }

            #[allow(non_snake_case)]
            fn export(&self, exp: &mut OidExporter) {
                let ($($name,)+) = self;
                $($name.export(exp);)+
            }

            fn min_key() -> Self {
                ($($name::min_key(),)+)
            }

            #[allow(non_snake_case)]
            fn indexable(&self) -> bool {
                let ($($name,)+) = self;
                true $(&& $name.indexable())+
            }
        }
    };
}

tuple_key!(A);
tuple_key!(A, B);
tuple_key!(A, B, C);
tuple_key!(A, B, C, D);
