//! GET and GETNEXT leaf dispatch.

use super::{
    ArgumentProperties, GetSetHandlerCommon, Handler, HandlerState, LeafOptions, MaxAccess,
};
use crate::oid::OidSequence;
use crate::value::{LeafValue, Value};

/// Reads the value of the single leaf matching the target OID.
#[derive(Debug)]
pub struct GetHandler<'a> {
    common: GetSetHandlerCommon<'a>,
    value: Option<Value>,
    struct_writable: bool,
    rw: bool,
}

impl<'a> GetHandler<'a> {
    /// Exact GET of `seq` at instance `index`.
    pub fn new(seq: &'a OidSequence, index: &'a OidSequence) -> Self {
        Self::with_mode(seq, Some(index), false)
    }

    /// GETNEXT below `seq`, strictly after `index` (or from the first
    /// instance when `index` is `None`).
    pub fn next(seq: &'a OidSequence, index: Option<&'a OidSequence>) -> Self {
        Self::with_mode(seq, index, true)
    }

    fn with_mode(seq: &'a OidSequence, index: Option<&'a OidSequence>, getnext: bool) -> Self {
        Self {
            common: GetSetHandlerCommon::new(seq, index, getnext),
            value: None,
            struct_writable: false,
            rw: false,
        }
    }

    pub fn common(&self) -> &GetSetHandlerCommon<'a> {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut GetSetHandlerCommon<'a> {
        &mut self.common
    }

    /// The value read, once the walk is done.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn take_value(&mut self) -> Option<Value> {
        self.value.take()
    }

    /// Whether the matched leaf accepts SET.
    pub fn is_read_write(&self) -> bool {
        self.rw
    }

    pub(crate) fn set_struct_writable(&mut self, writable: bool) {
        self.struct_writable = writable;
    }
}

impl Handler for GetHandler<'_> {
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
        if opts.access == MaxAccess::AccessibleForNotify {
            return;
        }

        let arc = opts.element.numeric.saturating_add(self.common.oid_offset());
        if !self.common.consume_oid_leaf(arc) {
            return;
        }

        if let Some(condition) = opts.pre_get
            && !condition()
        {
            tracing::trace!(target: "mib_expose::handler", leaf = %opts.element, "pre-get declined");
            self.common.set_state(HandlerState::Again);
            return;
        }

        self.value = Some(value.get());
        self.rw =
            self.struct_writable && opts.access == MaxAccess::ReadWrite && !self.common.read_only();
        self.common.set_state(HandlerState::Done);
    }

    fn capability<V: LeafValue>(&mut self, value: V, opts: LeafOptions<'_>) {
        let mut value = value;
        self.add_leaf(&mut value, opts.read_only());
    }
}
