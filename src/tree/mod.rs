//! The MIB tree.
//!
//! A tree is made of [`NamespaceNode`]s, which only contribute an arc to
//! the OIDs below them, and structure leaves implementing [`StructBase`].
//! A structure owns a group of SNMP leaves: a [`Scalar`] group, a
//! [`Table`] or a [`Trap`] definition. Feature modules build a subtree
//! once at startup and attach it to a
//! [`MibRegistry`](crate::globals::MibRegistry).
//!
//! ```rust
//! use mib_expose::tree::{NamespaceNode, Node};
//! use mib_expose::oid::OidElement;
//!
//! let module = NamespaceNode::new(OidElement::new(37, "vtssPortMib"))
//!     .with(NamespaceNode::new(OidElement::new(1, "vtssPortMibObjects")));
//! assert_eq!(Node::from(module).element().numeric, 37);
//! ```

mod scalar;
mod table;
mod trap;

pub use scalar::{Scalar, ScalarAccess};
pub use table::{Table, TableAccess};
pub use trap::Trap;

use std::any::Any;

use crate::error::{Error, MgmtResult, Result};
use crate::handler::{GetHandler, HandlerState, InventoryWalker, MaxAccess, SetHandler};
use crate::oid::{OidElement, OidSequence};
use crate::varbind::VarBind;

/// How a structure is laid out in a MIB module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    /// Leaves numbered directly below the structure.
    Scalar,
    /// `table.1.column.index` rows.
    Table,
    /// A notification; its objects are numbered below the trap OID.
    Trap,
}

/// A group of leaves sharing one access path to feature data.
///
/// The walk has already consumed the structure's own element when one of
/// the walk entry points is called.
pub trait StructBase: Send + Sync {
    fn element(&self) -> OidElement;

    fn kind(&self) -> StructKind {
        StructKind::Scalar
    }

    fn is_trap(&self) -> bool {
        self.kind() == StructKind::Trap
    }

    /// Whether SET can reach the data at all.
    fn access(&self) -> MaxAccess;

    fn get(&self, h: &mut GetHandler<'_>);

    fn set(&self, h: &mut SetHandler<'_, '_>);

    /// Record the structure's leaves. The walker is positioned at the
    /// structure's own OID.
    fn inventory(&self, w: &mut InventoryWalker);

    /// Apply a row copy produced by [`set`](Self::set).
    fn commit(&self, row: &(dyn Any + Send)) -> MgmtResult<()>;

    /// Objects carried by a notification, for trap definitions.
    fn trap_varbinds(&self, _trap_oid: &OidSequence) -> Vec<VarBind> {
        Vec::new()
    }
}

/// A tree node.
pub enum Node {
    Namespace(NamespaceNode),
    Leaf(Box<dyn StructBase>),
}

impl Node {
    pub fn leaf<S: StructBase + 'static>(leaf: S) -> Self {
        Node::Leaf(Box::new(leaf))
    }

    pub fn element(&self) -> OidElement {
        match self {
            Node::Namespace(ns) => ns.element,
            Node::Leaf(leaf) => leaf.element(),
        }
    }
}

impl From<NamespaceNode> for Node {
    fn from(ns: NamespaceNode) -> Self {
        Node::Namespace(ns)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Namespace(ns) => std::fmt::Debug::fmt(ns, f),
            Node::Leaf(leaf) => f
                .debug_tuple("Leaf")
                .field(&leaf.element())
                .finish(),
        }
    }
}

/// An inner node. Children are kept in insertion order and must have
/// distinct elements.
#[derive(Debug)]
pub struct NamespaceNode {
    element: OidElement,
    children: Vec<Node>,
}

impl NamespaceNode {
    pub fn new(element: OidElement) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    pub fn element(&self) -> OidElement {
        self.element
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Builder form of [`add`](Self::add). A duplicate element is logged
    /// and dropped.
    pub fn with(mut self, child: impl Into<Node>) -> Self {
        if let Err(e) = self.add(child) {
            tracing::warn!(target: "mib_expose::tree", error = %e, "child not added");
        }
        self
    }

    pub fn with_leaf<S: StructBase + 'static>(self, leaf: S) -> Self {
        self.with(Node::leaf(leaf))
    }

    pub fn add(&mut self, child: impl Into<Node>) -> Result<()> {
        let child = child.into();
        let element = child.element();
        if self.child(element.numeric).is_some() {
            return Err(Error::DuplicateNode {
                oid: OidSequence::from_slice(&[self.element.numeric, element.numeric]),
                name: element.name,
            });
        }
        self.children.push(child);
        Ok(())
    }

    pub fn child(&self, numeric: u32) -> Option<&Node> {
        self.children
            .iter()
            .find(|c| c.element().numeric == numeric)
    }

    pub(crate) fn namespace(&self, path: &[u32]) -> Option<&NamespaceNode> {
        let Some((&first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children.iter().find_map(|c| match c {
            Node::Namespace(ns) if ns.element.numeric == first => ns.namespace(rest),
            _ => None,
        })
    }

    /// Namespace reached by following `path` downwards from here.
    pub(crate) fn namespace_mut(&mut self, path: &[u32]) -> Option<&mut NamespaceNode> {
        let Some((&first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children.iter_mut().find_map(|c| match c {
            Node::Namespace(ns) if ns.element.numeric == first => ns.namespace_mut(rest),
            _ => None,
        })
    }
}

/// Walk operations needed to descend the tree.
pub(crate) trait TreeWalk<'r> {
    fn walk_state(&self) -> HandlerState;
    fn consume_oid(&mut self, arc: u32) -> bool;
    fn consume_oid_rollback(&mut self);
    fn visit(&mut self, leaf: &'r dyn StructBase);
}

impl<'r> TreeWalk<'r> for GetHandler<'_> {
    fn walk_state(&self) -> HandlerState {
        self.common().state()
    }

    fn consume_oid(&mut self, arc: u32) -> bool {
        self.common_mut().consume_oid(arc)
    }

    fn consume_oid_rollback(&mut self) {
        self.common_mut().consume_oid_rollback();
    }

    fn visit(&mut self, leaf: &'r dyn StructBase) {
        leaf.get(self);
    }
}

impl<'r> TreeWalk<'r> for SetHandler<'_, 'r> {
    fn walk_state(&self) -> HandlerState {
        self.common().state()
    }

    fn consume_oid(&mut self, arc: u32) -> bool {
        self.common_mut().consume_oid(arc)
    }

    fn consume_oid_rollback(&mut self) {
        self.common_mut().consume_oid_rollback();
    }

    fn visit(&mut self, leaf: &'r dyn StructBase) {
        self.begin_struct(leaf);
        leaf.set(self);
    }
}

/// Descend into `node` if it lies on the handler's target OID.
pub(crate) fn walk<'r, W: TreeWalk<'r>>(node: &'r Node, w: &mut W) {
    if w.walk_state() != HandlerState::Searching {
        return;
    }
    if !w.consume_oid(node.element().numeric) {
        return;
    }
    match node {
        Node::Namespace(ns) => {
            for child in &ns.children {
                walk(child, w);
                if w.walk_state() != HandlerState::Searching {
                    break;
                }
            }
        }
        Node::Leaf(leaf) if !leaf.is_trap() => w.visit(&**leaf),
        Node::Leaf(_) => {}
    }
    w.consume_oid_rollback();
}

/// Record every leaf below `node`.
pub(crate) fn inventory(node: &Node, w: &mut InventoryWalker) {
    w.push(node.element().numeric);
    match node {
        Node::Namespace(ns) => {
            for child in &ns.children {
                inventory(child, w);
            }
        }
        Node::Leaf(leaf) if !leaf.is_trap() => leaf.inventory(w),
        Node::Leaf(_) => {}
    }
    w.pop();
}

/// Trap definition named `name`, with its OID.
pub(crate) fn trap_find<'r>(
    node: &'r Node,
    path: &mut OidSequence,
    name: &str,
) -> Option<(OidSequence, &'r dyn StructBase)> {
    path.push(node.element().numeric);
    let found = match node {
        Node::Leaf(leaf) if leaf.is_trap() && leaf.element().name == name => {
            Some((path.clone(), &**leaf))
        }
        Node::Leaf(_) => None,
        Node::Namespace(ns) => ns
            .children
            .iter()
            .find_map(|c| trap_find(c, path, name)),
    };
    path.pop();
    found
}

/// Trap definition with the smallest name greater than `name`.
///
/// Names are not ordered along the tree, so every subtree is searched and
/// the best candidate so far is carried along.
pub(crate) fn trap_find_next<'r>(
    node: &'r Node,
    path: &mut OidSequence,
    name: &str,
    found: &mut Option<(OidSequence, &'r dyn StructBase)>,
) {
    path.push(node.element().numeric);
    match node {
        Node::Leaf(leaf) if leaf.is_trap() => {
            let candidate = leaf.element().name;
            let better = match found {
                Some((_, best)) => candidate < best.element().name,
                None => true,
            };
            if candidate > name && better {
                *found = Some((path.clone(), &**leaf));
            }
        }
        Node::Leaf(_) => {}
        Node::Namespace(ns) => {
            for child in &ns.children {
                trap_find_next(child, path, name, found);
            }
        }
    }
    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Expose, Handler, LeafOptions};
    use crate::oid;

    #[derive(Clone, Default)]
    struct Alarm {
        level: i32,
    }

    impl Expose for Alarm {
        fn expose<H: Handler>(&mut self, h: &mut H) {
            h.add_leaf(
                &mut self.level,
                LeafOptions::new(OidElement::new(0, "alarmLevel")),
            );
        }
    }

    fn ns(n: u32, name: &'static str) -> NamespaceNode {
        NamespaceNode::new(OidElement::new(n, name))
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let mut root = ns(1, "root");
        assert!(root.add(ns(2, "a")).is_ok());
        assert!(matches!(
            root.add(ns(2, "b")),
            Err(Error::DuplicateNode { .. })
        ));
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_namespace_mut_follows_path() {
        let mut root = ns(0, "root").with(ns(1, "a").with(ns(4, "b")));
        assert_eq!(
            root.namespace_mut(&[1, 4]).map(|n| n.element().name),
            Some("b")
        );
        assert!(root.namespace_mut(&[1, 5]).is_none());
        assert_eq!(root.namespace_mut(&[]).map(|n| n.element().numeric), Some(0));
    }

    #[test]
    fn test_trap_find() {
        let tree: Node = ns(1, "mib")
            .with(ns(2, "traps").with_leaf(Trap::<Alarm>::new(OidElement::new(3, "zAlarm"))))
            .with_leaf(Trap::<Alarm>::new(OidElement::new(5, "aAlarm")))
            .into();

        let mut path = OidSequence::empty();
        let (oid, leaf) = trap_find(&tree, &mut path, "zAlarm").unwrap();
        assert_eq!(oid, oid!(1, 2, 3));
        assert!(leaf.is_trap());
        assert!(path.is_empty());
        assert!(trap_find(&tree, &mut path, "missing").is_none());

        let mut found = None;
        trap_find_next(&tree, &mut path, "", &mut found);
        assert_eq!(found.as_ref().map(|(o, _)| o.clone()), Some(oid!(1, 5)));

        let mut found = None;
        trap_find_next(&tree, &mut path, "aAlarm", &mut found);
        assert_eq!(found.as_ref().map(|(o, _)| o.clone()), Some(oid!(1, 2, 3)));

        let mut found = None;
        trap_find_next(&tree, &mut path, "zAlarm", &mut found);
        assert!(found.is_none());
    }

    #[test]
    fn test_inventory_skips_traps() {
        let tree: Node = ns(1, "mib")
            .with_leaf(Trap::<Alarm>::new(OidElement::new(5, "alarm")))
            .into();
        let mut w = InventoryWalker::new();
        inventory(&tree, &mut w);
        assert!(w.leaves().is_empty());
    }
}
