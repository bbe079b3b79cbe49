//! The MIB registry: entry point for GET, GETNEXT and SET.
//!
//! A [`MibRegistry`] owns the whole tree. Feature modules attach their
//! subtrees at startup, after which the registry serves requests by
//! walking the tree with a fresh handler per request.
//!
//! # Example
//!
//! ```rust
//! use mib_expose::globals::MibRegistry;
//! use mib_expose::handler::{Expose, Handler, LeafOptions};
//! use mib_expose::error::MgmtResult;
//! use mib_expose::oid::OidElement;
//! use mib_expose::tree::{Scalar, ScalarAccess};
//! use mib_expose::value::Value;
//! use mib_expose::oid;
//!
//! #[derive(Clone, Default)]
//! struct Uptime {
//!     seconds: u32,
//! }
//!
//! impl Expose for Uptime {
//!     fn expose<H: Handler>(&mut self, h: &mut H) {
//!         h.add_leaf(&mut self.seconds, LeafOptions::new(OidElement::new(0, "sysUptime")));
//!     }
//! }
//!
//! struct UptimeAccess;
//!
//! impl ScalarAccess for UptimeAccess {
//!     type Value = Uptime;
//!
//!     fn get(&self) -> MgmtResult<Uptime> {
//!         Ok(Uptime { seconds: 42 })
//!     }
//! }
//!
//! let mut registry = MibRegistry::bare();
//! registry
//!     .attach_module(Scalar::new(OidElement::new(1, "uptime"), UptimeAccess))
//!     .unwrap();
//!
//! assert_eq!(registry.get(&oid!(1, 1)), Ok(Value::Unsigned32(42)));
//! assert!(registry.get_next(&oid!(1, 1)).is_err());
//! assert_eq!(registry.get_next(&oid!(1)).unwrap().oid, oid!(1, 1));
//! ```

use crate::error::{Error, ErrorStatus, OidErrorKind, Result};
use crate::handler::{GetHandler, HandlerState, LeafInfo, Response, SetCache, SetHandler};
use crate::oid::{OidElement, OidSequence};
use crate::tree::{self, NamespaceNode, Node, StructBase, TreeWalk};
use crate::value::Value;
use crate::varbind::VarBind;

/// Enterprise number used when none is configured.
pub const DEFAULT_ENTERPRISE: u32 = 6603;

/// Namespace feature modules attach below, inside the enterprise subtree.
pub const DEFAULT_MODULES_ROOT: OidElement = OidElement::new(1, "vtssSwitchMgmt");

/// Rows one SET request may modify.
pub const DEFAULT_SET_CACHE_CAPACITY: usize = 32;

const ROOT: OidElement = OidElement::new(0, "root");

/// Sorted list of every leaf in the tree.
///
/// Used to split a request OID into nodal part and instance index, and to
/// find the next leaf when a GETNEXT runs off the end of one.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    leaves: Vec<LeafInfo>,
}

impl Inventory {
    fn build(root: &NamespaceNode) -> Self {
        let mut w = crate::handler::InventoryWalker::new();
        for child in root.children() {
            tree::inventory(child, &mut w);
        }
        let mut leaves = w.into_leaves();
        leaves.sort_by(|a, b| a.oid.cmp(&b.oid));
        leaves.dedup_by(|a, b| a.oid == b.oid);
        Self { leaves }
    }

    pub fn leaves(&self) -> &[LeafInfo] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Leaf registered at exactly `oid`.
    pub fn find(&self, oid: &OidSequence) -> Option<&LeafInfo> {
        self.leaves
            .binary_search_by(|l| l.oid.cmp(oid))
            .ok()
            .map(|i| &self.leaves[i])
    }

    /// Split `oid` into a registered leaf OID and the instance index after
    /// it.
    ///
    /// A leaf that is a prefix of `oid` sorts at or before it, and no other
    /// leaf can sort between the two, so only the last leaf not after `oid`
    /// needs checking.
    pub fn find_split(&self, oid: &OidSequence) -> Option<(OidSequence, OidSequence)> {
        let pos = self.leaves.partition_point(|l| l.oid <= *oid);
        let leaf = self.leaves.get(pos.checked_sub(1)?)?;
        let index = oid.strip_prefix(&leaf.oid)?;
        Some((leaf.oid.clone(), index))
    }

    /// First registered leaf OID strictly after `oid`.
    pub fn find_next(&self, oid: &OidSequence) -> Option<&OidSequence> {
        let pos = self.leaves.partition_point(|l| l.oid <= *oid);
        self.leaves.get(pos).map(|l| &l.oid)
    }
}

/// Builder for [`MibRegistry`].
#[derive(Debug, Clone)]
pub struct MibRegistryBuilder {
    enterprise: u32,
    modules_root: OidElement,
    set_cache_capacity: usize,
}

impl Default for MibRegistryBuilder {
    fn default() -> Self {
        Self {
            enterprise: DEFAULT_ENTERPRISE,
            modules_root: DEFAULT_MODULES_ROOT,
            set_cache_capacity: DEFAULT_SET_CACHE_CAPACITY,
        }
    }
}

impl MibRegistryBuilder {
    /// Private enterprise number under `1.3.6.1.4.1`.
    pub fn enterprise(mut self, enterprise: u32) -> Self {
        self.enterprise = enterprise;
        self
    }

    pub fn modules_root(mut self, element: OidElement) -> Self {
        self.modules_root = element;
        self
    }

    pub fn set_cache_capacity(mut self, capacity: usize) -> Self {
        self.set_cache_capacity = capacity;
        self
    }

    pub fn build(self) -> MibRegistry {
        let chain = [
            OidElement::new(1, "iso"),
            OidElement::new(3, "org"),
            OidElement::new(6, "dod"),
            OidElement::new(1, "internet"),
            OidElement::new(4, "private"),
            OidElement::new(1, "enterprises"),
            OidElement::new(self.enterprise, "vtss"),
        ];

        let mut node = NamespaceNode::new(self.modules_root);
        for element in chain.iter().rev() {
            node = NamespaceNode::new(*element).with(node);
        }
        let mut modules_path: Vec<u32> = chain.iter().map(|e| e.numeric).collect();
        modules_path.push(self.modules_root.numeric);

        tracing::debug!(
            target: "mib_expose::globals",
            modules_root = %OidSequence::from_slice(&modules_path),
            "registry created"
        );
        MibRegistry {
            root: NamespaceNode::new(ROOT).with(node),
            modules_path,
            set_cache_capacity: self.set_cache_capacity,
            inventory: Inventory::default(),
        }
    }
}

/// Owner of the MIB tree.
#[derive(Debug)]
pub struct MibRegistry {
    root: NamespaceNode,
    modules_path: Vec<u32>,
    set_cache_capacity: usize,
    inventory: Inventory,
}

impl Default for MibRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MibRegistry {
    pub fn builder() -> MibRegistryBuilder {
        MibRegistryBuilder::default()
    }

    /// A registry without the enterprise chain: modules attach at the top
    /// level.
    pub fn bare() -> Self {
        Self {
            root: NamespaceNode::new(ROOT),
            modules_path: Vec::new(),
            set_cache_capacity: DEFAULT_SET_CACHE_CAPACITY,
            inventory: Inventory::default(),
        }
    }

    /// OID modules are attached below.
    pub fn modules_oid(&self) -> OidSequence {
        OidSequence::from_slice(&self.modules_path)
    }

    /// Name of the namespace modules attach below; `None` when modules sit
    /// at the top level.
    pub fn modules_root_name(&self) -> Option<&'static str> {
        if self.modules_path.is_empty() {
            return None;
        }
        self.root
            .namespace(&self.modules_path)
            .map(|ns| ns.element().name)
    }

    /// Attached module named `name`, with its OID.
    pub fn module(&self, name: &str) -> Result<(OidSequence, &Node)> {
        self.root
            .namespace(&self.modules_path)
            .and_then(|modules| {
                modules
                    .children()
                    .iter()
                    .find(|c| c.element().name == name)
            })
            .map(|node| (self.modules_oid().child(node.element().numeric), node))
            .ok_or_else(|| Error::UnknownModule { name: name.into() })
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Attach a feature module below the modules root.
    pub fn attach_module(&mut self, node: impl Into<Node>) -> Result<()> {
        let node = node.into();
        let element = node.element();
        let modules_oid = self.modules_oid();
        let Some(modules) = self.root.namespace_mut(&self.modules_path) else {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::InvalidArc,
                modules_oid.to_string(),
            ));
        };
        if let Err(e) = modules.add(node) {
            tracing::warn!(target: "mib_expose::globals", module = %element, "module already attached");
            return Err(match e {
                Error::DuplicateNode { name, .. } => Error::DuplicateNode {
                    oid: modules_oid.child(element.numeric),
                    name,
                },
                other => other,
            });
        }

        self.inventory = Inventory::build(&self.root);
        tracing::info!(
            target: "mib_expose::globals",
            module = %element,
            oid = %modules_oid.child(element.numeric),
            leaves = self.inventory.len(),
            "module attached"
        );
        Ok(())
    }

    fn walk<'r, W: TreeWalk<'r>>(&'r self, w: &mut W) {
        for child in self.root.children() {
            tree::walk(child, w);
            if w.walk_state() != HandlerState::Searching {
                break;
            }
        }
    }

    /// Value of the instance at exactly `oid`.
    pub fn get(&self, oid: &OidSequence) -> std::result::Result<Value, ErrorStatus> {
        self.get_leaf(oid).map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also reporting whether the leaf is writable.
    pub fn get_leaf(&self, oid: &OidSequence) -> std::result::Result<(Value, bool), ErrorStatus> {
        let (nodal, index) = self
            .inventory
            .find_split(oid)
            .ok_or(ErrorStatus::NoSuchName)?;

        let mut h = GetHandler::new(&nodal, &index);
        self.walk(&mut h);
        match h.common().state() {
            HandlerState::Done => {
                let rw = h.is_read_write();
                h.take_value()
                    .map(|v| (v, rw))
                    .ok_or(ErrorStatus::NoSuchName)
            }
            HandlerState::Failed => Err(h.common().error_code()),
            state => {
                tracing::debug!(target: "mib_expose::globals", oid = %oid, state = %state, "get unresolved");
                Err(ErrorStatus::NoSuchName)
            }
        }
    }

    /// First visible instance after `oid`.
    pub fn get_next(&self, oid: &OidSequence) -> std::result::Result<VarBind, ErrorStatus> {
        let (mut nodal, mut index) = match self.inventory.find_split(oid) {
            Some((nodal, index)) => (nodal, Some(index)),
            None => (self.next_leaf(oid)?, None),
        };

        loop {
            let step = {
                let mut h = GetHandler::next(&nodal, index.as_ref());
                self.walk(&mut h);
                match h.common().state() {
                    HandlerState::Done => {
                        let out = h.common().oid_seq_out();
                        Step::Found(VarBind::new(out, h.take_value().unwrap_or(Value::Null)))
                    }
                    HandlerState::Failed => Step::Failed(h.common().error_code()),
                    HandlerState::Again => Step::Again(h.common().next_index().clone()),
                    HandlerState::Searching => Step::Exhausted,
                }
            };

            match step {
                Step::Found(vb) => return Ok(vb),
                Step::Failed(status) => return Err(status),
                Step::Again(skipped) => {
                    tracing::trace!(target: "mib_expose::globals", oid = %nodal, index = %skipped, "instance skipped");
                    index = Some(skipped);
                }
                Step::Exhausted => {
                    nodal = self.next_leaf(&nodal)?;
                    index = None;
                }
            }
        }
    }

    fn next_leaf(&self, oid: &OidSequence) -> std::result::Result<OidSequence, ErrorStatus> {
        self.inventory
            .find_next(oid)
            .cloned()
            .ok_or(ErrorStatus::NoSuchName)
    }

    /// Write `value` at `oid` and commit it.
    ///
    /// The walk and commit both run even when the walk reports an error:
    /// a value that fails its range check is still applied and reported
    /// as `wrongValue`. Rows already committed are not rolled back when a
    /// later commit fails.
    pub fn set(&self, oid: &OidSequence, value: &Value) -> std::result::Result<(), ErrorStatus> {
        let mut tx = self.transaction();
        let walked = tx.reserve(oid, value);
        let committed = tx.action();
        tx.free();
        walked.and(committed)
    }

    /// Apply several varbinds as one request.
    ///
    /// Every varbind is walked into a shared row cache before anything is
    /// committed. The first varbind that fails stops the request without
    /// committing and is reported by its 1-based position.
    pub fn set_many(&self, varbinds: &[VarBind]) -> Response {
        let mut tx = self.transaction();
        for (i, vb) in varbinds.iter().enumerate() {
            if let Err(status) = tx.reserve(&vb.oid, &vb.value) {
                tx.free();
                return Response::error(status, i as i32 + 1, varbinds.to_vec());
            }
        }
        let committed = tx.action();
        tx.free();
        match committed {
            Ok(()) => Response::success(varbinds.to_vec()),
            Err(status) => Response::error(status, 0, varbinds.to_vec()),
        }
    }

    /// Start a multi-phase SET.
    pub fn transaction(&self) -> SetTransaction<'_> {
        SetTransaction {
            registry: self,
            cache: SetCache::new(self.set_cache_capacity),
            committed: 0,
        }
    }

    /// Trap definition with exactly this name.
    pub fn trap_find(&self, name: &str) -> Option<(OidSequence, &dyn StructBase)> {
        let mut path = OidSequence::empty();
        self.root
            .children()
            .iter()
            .find_map(|c| tree::trap_find(c, &mut path, name))
    }

    /// Trap definition with the smallest name after `name`. An empty name
    /// yields the first trap.
    pub fn trap_find_next(&self, name: &str) -> Option<(OidSequence, &dyn StructBase)> {
        let mut path = OidSequence::empty();
        let mut found = None;
        for child in self.root.children() {
            tree::trap_find_next(child, &mut path, name, &mut found);
        }
        found
    }

    /// Iterate over every visible instance below `base` in OID order.
    pub fn walk_from(&self, base: OidSequence) -> Walk<'_> {
        Walk {
            registry: self,
            current: base.clone(),
            base,
            last: None,
            done: false,
        }
    }
}

enum Step {
    Found(VarBind),
    Failed(ErrorStatus),
    Again(OidSequence),
    Exhausted,
}

/// A SET in progress, split into the phases an agent drives.
///
/// [`reserve`](Self::reserve) walks each varbind into cached row copies,
/// [`action`](Self::action) applies them, [`undo`](Self::undo) restores the
/// applied rows and [`free`](Self::free) drops the cache.
#[derive(Debug)]
pub struct SetTransaction<'r> {
    registry: &'r MibRegistry,
    cache: SetCache<'r>,
    committed: usize,
}

impl<'r> SetTransaction<'r> {
    pub fn reserve(&mut self, oid: &OidSequence, value: &Value) -> std::result::Result<(), ErrorStatus> {
        let Some((nodal, index)) = self.registry.inventory.find_split(oid) else {
            return Err(ErrorStatus::NoSuchName);
        };

        let mut h = SetHandler::new(&nodal, &index, value, &mut self.cache);
        self.registry.walk(&mut h);
        match h.common().state() {
            HandlerState::Done => Ok(()),
            HandlerState::Failed => {
                let status = h.common().error_code();
                tracing::debug!(target: "mib_expose::globals", oid = %oid, status = %status, "set rejected");
                Err(status)
            }
            _ => Err(ErrorStatus::NoSuchName),
        }
    }

    /// Rows currently cached.
    pub fn pending(&self) -> usize {
        self.cache.len()
    }

    /// Commit every cached row in the order first touched. Stops at the
    /// first failure.
    pub fn action(&mut self) -> std::result::Result<(), ErrorStatus> {
        for (i, entry) in self.cache.entries().iter().enumerate().skip(self.committed) {
            if let Err(e) = entry.leaf.commit(entry.pending.as_ref()) {
                tracing::warn!(target: "mib_expose::globals", oid = %entry.oid, error = %e, "commit failed");
                return Err(ErrorStatus::CommitFailed);
            }
            self.committed = i + 1;
        }
        Ok(())
    }

    /// Restore the rows committed so far, newest first.
    pub fn undo(&mut self) -> std::result::Result<(), ErrorStatus> {
        let mut result = Ok(());
        for entry in self.cache.entries()[..self.committed].iter().rev() {
            if let Err(e) = entry.leaf.commit(entry.original.as_ref()) {
                tracing::warn!(target: "mib_expose::globals", oid = %entry.oid, error = %e, "undo failed");
                result = Err(ErrorStatus::UndoFailed);
            }
        }
        self.committed = 0;
        result
    }

    pub fn free(&mut self) {
        self.cache.clear();
        self.committed = 0;
    }
}

/// Iterator returned by [`MibRegistry::walk_from`].
pub struct Walk<'r> {
    registry: &'r MibRegistry,
    base: OidSequence,
    current: OidSequence,
    /// Used to detect a walk that does not advance.
    last: Option<OidSequence>,
    done: bool,
}

impl Iterator for Walk<'_> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.registry.get_next(&self.current) {
            Ok(vb) => {
                if !vb.oid.starts_with(&self.base) {
                    self.done = true;
                    return None;
                }

                if let Some(last) = self.last.take()
                    && vb.oid <= last
                {
                    self.done = true;
                    return Some(Err(Error::NonIncreasingOid {
                        previous: last,
                        current: vb.oid,
                    }));
                }

                self.current = vb.oid.clone();
                self.last = Some(vb.oid.clone());
                Some(Ok(vb))
            }
            Err(ErrorStatus::NoSuchName) => {
                self.done = true;
                None
            }
            Err(status) => {
                self.done = true;
                Some(Err(Error::snmp(status, Some(self.current.clone()))))
            }
        }
    }
}
