//! SET leaf dispatch and the row cache behind the commit phase.
//!
//! A SET walk never touches feature state directly. The matched structure
//! copies its row (from the cache when an earlier varbind of the same
//! request already did so, otherwise from its access trait), lets the
//! handler write one leaf into the copy, and hands the copy back to the
//! cache. Committing the request then applies every cached row once.

use std::any::Any;

use super::{
    ArgumentProperties, GetSetHandlerCommon, Handler, HandlerState, LeafOptions, MaxAccess,
};
use crate::error::ErrorStatus;
use crate::oid::OidSequence;
use crate::tree::StructBase;
use crate::value::{LeafValue, Value};

/// A row modified by the current request.
pub struct SetCacheEntry<'r> {
    /// Structure OID plus row index.
    pub(crate) oid: OidSequence,
    pub(crate) leaf: &'r dyn StructBase,
    pub(crate) pending: Box<dyn Any + Send>,
    pub(crate) original: Box<dyn Any + Send>,
}

impl std::fmt::Debug for SetCacheEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetCacheEntry")
            .field("oid", &self.oid)
            .field("leaf", &self.leaf.element())
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity list of rows touched by one SET request.
#[derive(Debug)]
pub struct SetCache<'r> {
    entries: Vec<SetCacheEntry<'r>>,
    capacity: usize,
}

impl<'r> SetCache<'r> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Row OIDs in the order they were first touched.
    pub fn oids(&self) -> impl Iterator<Item = &OidSequence> {
        self.entries.iter().map(|e| &e.oid)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[SetCacheEntry<'r>] {
        &self.entries
    }

    fn find(&self, oid: &OidSequence) -> Option<&SetCacheEntry<'r>> {
        self.entries.iter().find(|e| &e.oid == oid)
    }

    fn find_mut(&mut self, oid: &OidSequence) -> Option<&mut SetCacheEntry<'r>> {
        self.entries.iter_mut().find(|e| &e.oid == oid)
    }
}

/// Writes one value into the row copy of the leaf matching the target OID.
pub struct SetHandler<'a, 'r> {
    common: GetSetHandlerCommon<'a>,
    value: &'a Value,
    cache: &'a mut SetCache<'r>,
    current: Option<&'r dyn StructBase>,
    struct_writable: bool,
    wrote: bool,
}

impl<'a, 'r> SetHandler<'a, 'r> {
    pub fn new(
        seq: &'a OidSequence,
        index: &'a OidSequence,
        value: &'a Value,
        cache: &'a mut SetCache<'r>,
    ) -> Self {
        Self {
            common: GetSetHandlerCommon::new(seq, Some(index), false),
            value,
            cache,
            current: None,
            struct_writable: false,
            wrote: false,
        }
    }

    pub fn common(&self) -> &GetSetHandlerCommon<'a> {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut GetSetHandlerCommon<'a> {
        &mut self.common
    }

    /// True once a leaf accepted the value.
    pub fn wrote(&self) -> bool {
        self.wrote
    }

    /// Called by the tree before handing the handler to a structure.
    pub(crate) fn begin_struct(&mut self, leaf: &'r dyn StructBase) {
        self.current = Some(leaf);
        self.struct_writable = false;
        self.wrote = false;
    }

    pub(crate) fn set_struct_writable(&mut self, writable: bool) {
        self.struct_writable = writable;
    }

    /// Cache key of the row at `index` of the structure being visited.
    ///
    /// Must be taken before the row is exposed, while the cursor still
    /// ends at the structure.
    pub(crate) fn row_oid(&self, index: &OidSequence) -> OidSequence {
        self.common.consumed_oid().concat(index)
    }

    /// Copy of a row an earlier varbind of this request already modified.
    pub(crate) fn cached_row<D: Clone + 'static>(&self, row_oid: &OidSequence) -> Option<D> {
        self.cache
            .find(row_oid)
            .and_then(|e| e.pending.downcast_ref::<D>())
            .cloned()
    }

    /// Hand a row copy back after the walk wrote into it.
    ///
    /// `original` is the row as read from the access trait; it is `None`
    /// when the copy came from the cache.
    pub(crate) fn store_row<D: Send + 'static>(
        &mut self,
        row_oid: OidSequence,
        data: D,
        original: Option<D>,
    ) {
        if !self.wrote {
            return;
        }
        if let Some(entry) = self.cache.find_mut(&row_oid) {
            entry.pending = Box::new(data);
            return;
        }

        let (Some(leaf), Some(original)) = (self.current, original) else {
            tracing::warn!(target: "mib_expose::handler", oid = %row_oid, "row copy without a source");
            return;
        };
        if self.cache.entries.len() >= self.cache.capacity {
            tracing::warn!(
                target: "mib_expose::handler",
                oid = %row_oid,
                capacity = self.cache.capacity,
                "set cache full"
            );
            self.common.set_error(ErrorStatus::ResourceUnavailable);
            return;
        }
        self.cache.entries.push(SetCacheEntry {
            oid: row_oid,
            leaf,
            pending: Box::new(data),
            original: Box::new(original),
        });
    }
}

impl std::fmt::Debug for SetHandler<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetHandler")
            .field("common", &self.common)
            .field("value", self.value)
            .field("cached", &self.cache.len())
            .field("wrote", &self.wrote)
            .finish()
    }
}

impl Handler for SetHandler<'_, '_> {
    fn state(&self) -> HandlerState {
        self.common.state()
    }

    fn argument_properties(&mut self, props: ArgumentProperties) {
        self.common
            .set_argument_properties(props.oid_offset, props.read_only);
    }

    fn add_leaf<V: LeafValue + ?Sized>(&mut self, value: &mut V, opts: LeafOptions<'_>) {
        if self.common.state() != HandlerState::Searching {
            return;
        }

        let arc = opts.element.numeric.saturating_add(self.common.oid_offset());
        if !self.common.consume_oid_leaf(arc) {
            return;
        }

        if !self.struct_writable || opts.access != MaxAccess::ReadWrite || self.common.read_only()
        {
            self.common.set_error(ErrorStatus::NotWritable);
            return;
        }

        if let Err(status) = value.set(self.value) {
            self.common.set_error(status);
            return;
        }
        self.wrote = true;

        for action in opts.post_set {
            action();
        }
        self.common.set_state(HandlerState::Done);

        // The write above stays in the row copy even when the range check
        // fails, so a commit still applies it.
        if let Some(range) = &opts.range
            && let Some(v) = value.range_operand()
            && !range.contains(v)
        {
            tracing::debug!(target: "mib_expose::handler", leaf = %opts.element, value = v, range = %range, "out of range");
            self.common.set_error(ErrorStatus::WrongValue);
        }
    }

    fn capability<V: LeafValue>(&mut self, _value: V, _opts: LeafOptions<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::RangeSpec;
    use crate::oid;
    use crate::oid::OidElement;

    fn leaf<'a>(n: u32) -> LeafOptions<'a> {
        LeafOptions::new(OidElement::new(n, "leaf"))
    }

    #[test]
    fn test_set_writes_value() {
        let seq = oid!(2);
        let index = oid!();
        let value = Value::Integer(17);
        let mut cache = SetCache::new(4);
        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);

        let mut a = 0i32;
        let mut b = 0i32;
        h.add_leaf(&mut a, leaf(1));
        h.add_leaf(&mut b, leaf(2));
        assert_eq!(h.state(), HandlerState::Done);
        assert!(h.wrote());
        assert_eq!((a, b), (0, 17));
    }

    #[test]
    fn test_set_read_only_is_not_writable() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::Integer(1);
        let mut cache = SetCache::new(4);

        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);
        let mut a = 0i32;
        h.add_leaf(&mut a, leaf(1).read_only());
        assert_eq!(h.common().error_code(), ErrorStatus::NotWritable);
        assert_eq!(a, 0);
    }

    #[test]
    fn test_set_key_column_is_not_writable() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::Integer(1);
        let mut cache = SetCache::new(4);

        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);
        h.argument_properties(ArgumentProperties::key(0));
        let mut a = 0i32;
        h.add_leaf(&mut a, leaf(1));
        assert_eq!(h.state(), HandlerState::Failed);
        assert_eq!(h.common().error_code(), ErrorStatus::NotWritable);
    }

    #[test]
    fn test_set_wrong_type_passes_through() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::string("x");
        let mut cache = SetCache::new(4);

        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);
        let mut a = 0i32;
        h.add_leaf(&mut a, leaf(1));
        assert_eq!(h.common().error_code(), ErrorStatus::WrongType);
        assert!(!h.wrote());
    }

    #[test]
    fn test_set_out_of_range_still_writes() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::Integer(500);
        let mut cache = SetCache::new(4);

        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);
        let mut a = 0i32;
        h.add_leaf(&mut a, leaf(1).range(RangeSpec::new(0, 100)));
        assert_eq!(h.state(), HandlerState::Failed);
        assert_eq!(h.common().error_code(), ErrorStatus::WrongValue);
        assert!(h.wrote());
        assert_eq!(a, 500);
    }

    #[test]
    fn test_set_runs_post_set_actions() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::Integer(3);
        let mut cache = SetCache::new(4);
        let mut calls = 0;

        {
            let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
            h.set_struct_writable(true);
            let mut a = 0i32;
            let mut bump = || calls += 1;
            h.add_leaf(&mut a, leaf(1).post_set(&mut bump));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_set_capability_is_noop() {
        let seq = oid!(1);
        let index = oid!();
        let value = Value::Unsigned32(3);
        let mut cache = SetCache::new(4);

        let mut h = SetHandler::new(&seq, &index, &value, &mut cache);
        h.set_struct_writable(true);
        h.capability(1u32, leaf(1));
        assert_eq!(h.state(), HandlerState::Searching);
    }
}
