//! Full-tree walker recording every leaf.

use super::{ArgumentProperties, Handler, HandlerState, LeafOptions, MaxAccess, RangeSpec, Status};
use crate::oid::OidSequence;
use crate::tag::AsnType;
use crate::value::{LeafValue, Value};

/// One leaf as seen by an [`InventoryWalker`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInfo {
    /// Nodal OID, without instance index.
    pub oid: OidSequence,
    pub name: &'static str,
    pub syntax: AsnType,
    /// Effective access: a read-write leaf in a structure that cannot be
    /// written is reported read-only.
    pub access: MaxAccess,
    pub status: Status,
    pub description: &'static str,
    /// Table index column.
    pub index: bool,
    pub range: Option<RangeSpec>,
    pub has_pre_get: bool,
    /// Value held by the walked data when the leaf was visited.
    pub value: Value,
}

/// Records the OID and metadata of every leaf it visits.
///
/// Unlike GET and SET walks it never matches anything, so its state stays
/// [`HandlerState::Searching`] and every leaf is visited.
#[derive(Debug, Default)]
pub struct InventoryWalker {
    path: OidSequence,
    oid_offset: u32,
    read_only: bool,
    struct_writable: bool,
    leaves: Vec<LeafInfo>,
}

impl InventoryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start below `root` instead of the empty OID.
    pub fn at(root: OidSequence) -> Self {
        Self {
            path: root,
            ..Self::default()
        }
    }

    pub fn push(&mut self, arc: u32) {
        self.path.push(arc);
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    pub fn path(&self) -> &OidSequence {
        &self.path
    }

    pub(crate) fn begin_struct(&mut self, writable: bool) {
        self.struct_writable = writable;
        self.oid_offset = 0;
        self.read_only = false;
    }

    pub fn leaves(&self) -> &[LeafInfo] {
        &self.leaves
    }

    pub fn into_leaves(self) -> Vec<LeafInfo> {
        self.leaves
    }
}

impl Handler for InventoryWalker {
    fn state(&self) -> HandlerState {
        HandlerState::Searching
    }

    fn argument_properties(&mut self, props: ArgumentProperties) {
        self.oid_offset = props.oid_offset;
        self.read_only = props.read_only;
    }

    fn add_leaf<V: LeafValue + ?Sized>(&mut self, value: &mut V, opts: LeafOptions<'_>) {
        let access = match opts.access {
            MaxAccess::ReadWrite if !self.struct_writable || self.read_only => MaxAccess::ReadOnly,
            other => other,
        };
        self.leaves.push(LeafInfo {
            oid: self
                .path
                .child(opts.element.numeric.saturating_add(self.oid_offset)),
            name: opts.element.name,
            syntax: value.asn_type(),
            access,
            status: opts.status,
            description: opts.description,
            index: self.read_only,
            range: opts.range.clone(),
            has_pre_get: opts.pre_get.is_some(),
            value: value.get(),
        });
    }

    fn capability<V: LeafValue>(&mut self, value: V, opts: LeafOptions<'_>) {
        let mut value = value;
        self.add_leaf(&mut value, opts.read_only());
    }
}
