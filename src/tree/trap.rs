//! Notification definitions.

use std::any::Any;
use std::marker::PhantomData;

use super::{Node, StructBase, StructKind};
use crate::error::{MgmtError, MgmtResult};
use crate::handler::{
    ArgumentProperties, Expose, GetHandler, Handler, InventoryWalker, MaxAccess, SetHandler,
};
use crate::oid::{OidElement, OidSequence};
use crate::varbind::VarBind;

/// A trap with payload `P`.
///
/// Traps are never matched by GET or SET walks; they are located by name
/// through the registry and produce the varbinds of an outgoing
/// notification.
pub struct Trap<P> {
    element: OidElement,
    _payload: PhantomData<fn() -> P>,
}

impl<P: Expose + Default + 'static> Trap<P> {
    pub fn new(element: OidElement) -> Self {
        Self {
            element,
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.element.name
    }

    /// Varbinds carrying `payload`, numbered below `trap_oid`.
    pub fn varbinds(&self, trap_oid: &OidSequence, payload: &mut P) -> Vec<VarBind> {
        let mut w = InventoryWalker::at(trap_oid.clone());
        w.begin_struct(false);
        w.argument_properties(ArgumentProperties::offset(1));
        payload.expose(&mut w);
        w.into_leaves()
            .into_iter()
            .map(|leaf| VarBind::new(leaf.oid, leaf.value))
            .collect()
    }
}

impl<P: Expose + Default + 'static> StructBase for Trap<P> {
    fn element(&self) -> OidElement {
        self.element
    }

    fn kind(&self) -> StructKind {
        StructKind::Trap
    }

    fn access(&self) -> MaxAccess {
        MaxAccess::AccessibleForNotify
    }

    fn get(&self, _h: &mut GetHandler<'_>) {}

    fn set(&self, _h: &mut SetHandler<'_, '_>) {}

    /// Notification objects, as [`varbinds`](Self::varbinds) numbers them.
    fn inventory(&self, w: &mut InventoryWalker) {
        w.begin_struct(false);
        w.argument_properties(ArgumentProperties::offset(1));
        P::default().expose(w);
    }

    fn commit(&self, _row: &(dyn Any + Send)) -> MgmtResult<()> {
        Err(MgmtError::UNSPECIFIED)
    }

    fn trap_varbinds(&self, trap_oid: &OidSequence) -> Vec<VarBind> {
        self.varbinds(trap_oid, &mut P::default())
    }
}

impl<P: Expose + Default + 'static> From<Trap<P>> for Node {
    fn from(leaf: Trap<P>) -> Self {
        Node::leaf(leaf)
    }
}
