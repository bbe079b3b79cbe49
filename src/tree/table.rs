//! Tables: rows addressed by an [`IndexKey`].
//!
//! Columns live below `table.1` (the entry). Key columns are numbered from
//! 1, value columns from [`TableAccess::ROW_OFFSET`], so a table whose key
//! is not accessible still starts its value columns at 2.

use std::any::Any;

use super::{Node, StructBase, StructKind};
use crate::error::{MgmtError, MgmtResult};
use crate::handler::{
    ArgumentProperties, Expose, GetHandler, Handler, HandlerState, InventoryWalker, MaxAccess,
    SetHandler,
};
use crate::index::{IndexKey, OidImporter};
use crate::oid::{OidElement, OidSequence};

/// Entry arc below the table element.
const ENTRY: u32 = 1;

/// Access to the rows behind a [`Table`].
pub trait TableAccess: Send + Sync + 'static {
    type Key: IndexKey + Send + 'static;
    type Row: Expose + Default + Clone + Send + 'static;

    /// Offset of the first value column.
    const ROW_OFFSET: u32 = 2;

    fn get(&self, key: &Self::Key) -> MgmtResult<Self::Row>;

    /// The smallest existing key strictly after `key` in index order, or
    /// the first key when `key` is `None`.
    fn next(&self, key: Option<&Self::Key>) -> Option<Self::Key>;

    fn set(&self, _key: &Self::Key, _row: &Self::Row) -> MgmtResult<()> {
        Err(MgmtError::UNSPECIFIED)
    }

    fn writable(&self) -> bool {
        false
    }

    /// Expose key fields as read-only columns. Hidden by default.
    fn expose_key<H: Handler>(_key: &mut Self::Key, _h: &mut H) {}
}

/// A table structure.
pub struct Table<A> {
    element: OidElement,
    access: A,
}

impl<A: TableAccess> Table<A> {
    pub fn new(element: OidElement, access: A) -> Self {
        Self { element, access }
    }

    pub fn access_ref(&self) -> &A {
        &self.access
    }

    fn exact_row(&self, index: &OidSequence) -> Option<(A::Key, A::Row)> {
        let key = A::Key::from_index_exact(index)?;
        match self.access.get(&key) {
            Ok(row) => Some((key, row)),
            Err(e) => {
                tracing::trace!(target: "mib_expose::tree", table = %self.element, index = %index, error = %e, "no row");
                None
            }
        }
    }

    /// First readable row whose index sorts after `index`.
    fn next_row(&self, index: Option<&OidSequence>) -> Option<(A::Key, A::Row)> {
        let mut cursor = match index {
            None => None,
            Some(index) if index.is_empty() => None,
            Some(index) => {
                let mut imp = OidImporter::new(index, true);
                match A::Key::import(&mut imp) {
                    Some(key) if imp.is_ok() => Some(key),
                    _ => return self.scan_after(index),
                }
            }
        };
        loop {
            let key = self.access.next(cursor.as_ref())?;
            if !key.indexable() {
                tracing::warn!(target: "mib_expose::tree", table = %self.element, "row key has no index encoding");
                cursor = Some(key);
                continue;
            }
            match self.access.get(&key) {
                Ok(row) => return Some((key, row)),
                Err(e) => {
                    tracing::trace!(target: "mib_expose::tree", table = %self.element, error = %e, "skipping row");
                    cursor = Some(key);
                }
            }
        }
    }

    /// Fallback for indexes too short to decode: compare encoded keys.
    fn scan_after(&self, index: &OidSequence) -> Option<(A::Key, A::Row)> {
        let mut cursor = None;
        loop {
            let key = self.access.next(cursor.as_ref())?;
            if key.indexable()
                && key.to_index() > *index
                && let Ok(row) = self.access.get(&key)
            {
                return Some((key, row));
            }
            cursor = Some(key);
        }
    }

    fn expose_row<H: Handler>(key: &mut A::Key, row: &mut A::Row, h: &mut H) {
        h.argument_properties(ArgumentProperties::key(1));
        A::expose_key(key, h);
        if h.state() != HandlerState::Searching {
            return;
        }
        h.argument_properties(ArgumentProperties::offset(A::ROW_OFFSET));
        row.expose(h);
    }
}

impl<A: TableAccess> StructBase for Table<A> {
    fn element(&self) -> OidElement {
        self.element
    }

    fn access(&self) -> MaxAccess {
        if self.access.writable() {
            MaxAccess::ReadWrite
        } else {
            MaxAccess::ReadOnly
        }
    }

    fn get(&self, h: &mut GetHandler<'_>) {
        if !h.common_mut().consume_oid(ENTRY) {
            return;
        }

        let found = if h.common().is_getnext() {
            self.next_row(h.common().index())
        } else {
            h.common().index().and_then(|index| self.exact_row(index))
        };
        if let Some((mut key, mut row)) = found {
            h.common_mut().set_next_index(key.to_index());
            h.set_struct_writable(self.access.writable());
            Self::expose_row(&mut key, &mut row, h);
        }

        h.common_mut().consume_oid_rollback();
    }

    fn set(&self, h: &mut SetHandler<'_, '_>) {
        if !h.common_mut().consume_oid(ENTRY) {
            return;
        }
        let Some(index) = h.common().index() else {
            h.common_mut().consume_oid_rollback();
            return;
        };

        let row_oid = h.row_oid(index);
        let cached = h.cached_row::<(A::Key, A::Row)>(&row_oid);
        let (data, original) = match cached {
            Some(data) => (Some(data), None),
            None => match self.exact_row(index) {
                Some(data) => (Some(data.clone()), Some(data)),
                None => (None, None),
            },
        };

        if let Some((mut key, mut row)) = data {
            h.set_struct_writable(self.access.writable());
            Self::expose_row(&mut key, &mut row, h);
            h.store_row(row_oid, (key, row), original);
        }

        h.common_mut().consume_oid_rollback();
    }

    fn kind(&self) -> StructKind {
        StructKind::Table
    }

    fn inventory(&self, w: &mut InventoryWalker) {
        w.push(ENTRY);
        w.begin_struct(self.access.writable());
        let mut key = A::Key::min_key();
        let mut row = A::Row::default();
        Self::expose_row(&mut key, &mut row, w);
        w.pop();
    }

    fn commit(&self, row: &(dyn Any + Send)) -> MgmtResult<()> {
        let (key, row) = row
            .downcast_ref::<(A::Key, A::Row)>()
            .ok_or(MgmtError::UNSPECIFIED)?;
        self.access.set(key, row)
    }
}

impl<A: TableAccess> From<Table<A>> for Node {
    fn from(leaf: Table<A>) -> Self {
        Node::leaf(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{LeafOptions, SetCache};
    use crate::oid;
    use crate::value::Value;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Port {
        speed: u32,
        up: bool,
    }

    impl Expose for Port {
        fn expose<H: Handler>(&mut self, h: &mut H) {
            h.add_leaf(&mut self.speed, LeafOptions::new(OidElement::new(0, "speed")));
            let up = self.up;
            h.add_leaf(
                &mut self.up,
                LeafOptions::new(OidElement::new(1, "up")).pre_get(&|| up),
            );
        }
    }

    struct Ports(Mutex<BTreeMap<u32, Port>>);

    impl TableAccess for Ports {
        type Key = u32;
        type Row = Port;

        fn get(&self, key: &u32) -> MgmtResult<Port> {
            let rows = self.0.lock().map_err(|_| MgmtError::UNSPECIFIED)?;
            rows.get(key).cloned().ok_or(MgmtError::new(1, 1))
        }

        fn next(&self, key: Option<&u32>) -> Option<u32> {
            let rows = self.0.lock().ok()?;
            match key {
                None => rows.keys().next().copied(),
                Some(k) => rows.range(k.saturating_add(1)..).next().map(|(k, _)| *k),
            }
        }

        fn set(&self, key: &u32, row: &Port) -> MgmtResult<()> {
            let mut rows = self.0.lock().map_err(|_| MgmtError::UNSPECIFIED)?;
            rows.insert(*key, row.clone());
            Ok(())
        }

        fn writable(&self) -> bool {
            true
        }

        fn expose_key<H: Handler>(key: &mut u32, h: &mut H) {
            h.add_leaf(key, LeafOptions::new(OidElement::new(0, "portIndex")));
        }
    }

    fn table() -> Table<Ports> {
        let mut rows = BTreeMap::new();
        rows.insert(1, Port { speed: 100, up: true });
        rows.insert(3, Port { speed: 1000, up: false });
        Table::new(OidElement::new(4, "portTable"), Ports(Mutex::new(rows)))
    }

    // ========================================================================
    // GET / GETNEXT
    // ========================================================================

    #[test]
    fn test_table_exact_get() {
        let t = table();
        let seq = oid!(1, 2);
        let index = oid!(3);
        let mut h = GetHandler::new(&seq, &index);
        t.get(&mut h);
        assert_eq!(h.value(), Some(&Value::Unsigned32(1000)));
        assert_eq!(h.common().oid_seq_out(), oid!(1, 2, 3));

        let index = oid!(2);
        let mut h = GetHandler::new(&seq, &index);
        t.get(&mut h);
        assert_eq!(h.state(), HandlerState::Searching);
    }

    #[test]
    fn test_table_key_column() {
        let t = table();
        let seq = oid!(1, 1);
        let index = oid!(3);
        let mut h = GetHandler::new(&seq, &index);
        t.get(&mut h);
        assert_eq!(h.value(), Some(&Value::Unsigned32(3)));
        assert!(!h.is_read_write());
    }

    #[test]
    fn test_table_getnext_skips_missing_row() {
        let t = table();
        let seq = oid!(1, 2);
        let index = oid!(1);
        let mut h = GetHandler::next(&seq, Some(&index));
        t.get(&mut h);
        assert_eq!(h.common().oid_seq_out(), oid!(1, 2, 3));
        assert_eq!(h.value(), Some(&Value::Unsigned32(1000)));
    }

    #[test]
    fn test_table_getnext_from_start() {
        let t = table();
        let seq = oid!(1, 2);
        let mut h = GetHandler::next(&seq, None);
        t.get(&mut h);
        assert_eq!(h.common().oid_seq_out(), oid!(1, 2, 1));
    }

    #[test]
    fn test_table_getnext_pre_get_is_again() {
        let t = table();
        let seq = oid!(1, 3);
        let index = oid!(1);
        let mut h = GetHandler::next(&seq, Some(&index));
        t.get(&mut h);
        assert_eq!(h.state(), HandlerState::Again);
        assert_eq!(h.common().next_index(), &oid!(3));
    }

    #[test]
    fn test_table_getnext_past_end() {
        let t = table();
        let seq = oid!(1, 2);
        let index = oid!(3);
        let mut h = GetHandler::next(&seq, Some(&index));
        t.get(&mut h);
        assert_eq!(h.state(), HandlerState::Searching);
    }

    #[test]
    fn test_table_wrong_entry_arc() {
        let t = table();
        let seq = oid!(2, 2);
        let index = oid!(1);
        let mut h = GetHandler::new(&seq, &index);
        t.get(&mut h);
        assert_eq!(h.state(), HandlerState::Searching);
        assert_eq!(h.common().consumed_oid(), oid!());
    }

    // ========================================================================
    // SET
    // ========================================================================

    #[test]
    fn test_table_set_row() {
        let t = table();
        let seq = oid!(1, 2);
        let index = oid!(1);
        let value = Value::Unsigned32(10);
        let mut cache = SetCache::new(4);
        {
            let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
            h.begin_struct(&t);
            t.set(&mut h);
            assert_eq!(h.state(), HandlerState::Done);
        }
        assert_eq!(cache.oids().cloned().collect::<Vec<_>>(), vec![oid!(1, 1)]);
        let entry = &cache.entries()[0];
        entry.leaf.commit(entry.pending.as_ref()).unwrap();
        assert_eq!(t.access_ref().get(&1).unwrap().speed, 10);
    }

    #[test]
    fn test_table_set_key_not_writable() {
        let t = table();
        let seq = oid!(1, 1);
        let index = oid!(1);
        let value = Value::Unsigned32(9);
        let mut cache = SetCache::new(4);
        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.begin_struct(&t);
        t.set(&mut h);
        assert_eq!(
            h.common().error_code(),
            crate::error::ErrorStatus::NotWritable
        );
    }

    #[test]
    fn test_table_set_missing_row() {
        let t = table();
        let seq = oid!(1, 2);
        let index = oid!(2);
        let value = Value::Unsigned32(9);
        let mut cache = SetCache::new(4);
        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.begin_struct(&t);
        t.set(&mut h);
        assert_eq!(h.state(), HandlerState::Searching);
    }

    #[test]
    fn test_table_inventory() {
        let t = table();
        let mut w = InventoryWalker::at(oid!(9));
        t.inventory(&mut w);
        let oids: Vec<_> = w.leaves().iter().map(|l| l.oid.clone()).collect();
        assert_eq!(oids, vec![oid!(9, 1, 1), oid!(9, 1, 2), oid!(9, 1, 3)]);
        assert_eq!(w.leaves()[0].access, MaxAccess::ReadOnly);
        assert_eq!(w.leaves()[1].access, MaxAccess::ReadWrite);
    }
}
