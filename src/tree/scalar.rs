//! Scalar groups: one instance, addressed with an empty index.

use std::any::Any;

use super::{Node, StructBase};
use crate::error::{MgmtError, MgmtResult};
use crate::handler::{
    ArgumentProperties, Expose, GetHandler, Handler, InventoryWalker, MaxAccess, SetHandler,
};
use crate::oid::{OidElement, OidSequence};

/// Access to the feature data behind a [`Scalar`].
pub trait ScalarAccess: Send + Sync + 'static {
    type Value: Expose + Default + Clone + Send + 'static;

    fn get(&self) -> MgmtResult<Self::Value>;

    fn set(&self, _value: &Self::Value) -> MgmtResult<()> {
        Err(MgmtError::UNSPECIFIED)
    }

    /// Whether [`set`](Self::set) is implemented.
    fn writable(&self) -> bool {
        false
    }
}

/// A group of scalar leaves numbered from 1 below the group element.
pub struct Scalar<A> {
    element: OidElement,
    access: A,
}

impl<A: ScalarAccess> Scalar<A> {
    pub fn new(element: OidElement, access: A) -> Self {
        Self { element, access }
    }

    pub fn access_ref(&self) -> &A {
        &self.access
    }

    const PROPS: ArgumentProperties = ArgumentProperties::offset(1);
}

impl<A: ScalarAccess> StructBase for Scalar<A> {
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
        let common = h.common();
        let visible = match common.index() {
            None => common.is_getnext(),
            Some(index) => !common.is_getnext() && index.is_empty(),
        };
        if !visible {
            return;
        }

        let mut data = match self.access.get() {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(target: "mib_expose::tree", scalar = %self.element, error = %e, "get failed");
                return;
            }
        };
        h.set_struct_writable(self.access.writable());
        h.argument_properties(Self::PROPS);
        data.expose(h);
    }

    fn set(&self, h: &mut SetHandler<'_, '_>) {
        if !h.common().index().is_some_and(OidSequence::is_empty) {
            return;
        }

        let row_oid = h.row_oid(&OidSequence::empty());
        let (mut data, original) = match h.cached_row::<A::Value>(&row_oid) {
            Some(data) => (data, None),
            None => match self.access.get() {
                Ok(data) => (data.clone(), Some(data)),
                Err(e) => {
                    tracing::debug!(target: "mib_expose::tree", scalar = %self.element, error = %e, "get failed");
                    return;
                }
            },
        };
        h.set_struct_writable(self.access.writable());
        h.argument_properties(Self::PROPS);
        data.expose(h);
        h.store_row(row_oid, data, original);
    }

    fn inventory(&self, w: &mut InventoryWalker) {
        w.begin_struct(self.access.writable());
        w.argument_properties(Self::PROPS);
        A::Value::default().expose(w);
    }

    fn commit(&self, row: &(dyn Any + Send)) -> MgmtResult<()> {
        let data = row
            .downcast_ref::<A::Value>()
            .ok_or(MgmtError::UNSPECIFIED)?;
        self.access.set(data)
    }
}

impl<A: ScalarAccess> From<Scalar<A>> for Node {
    fn from(leaf: Scalar<A>) -> Self {
        Node::leaf(leaf)
    }
}
