//! # mib-expose
//!
//! Expose management data as an SNMP MIB tree.
//!
//! Feature modules describe their data once, as plain structs implementing
//! [`Expose`](handler::Expose), and hang them in a tree of namespaces. The
//! same description then serves GET, GETNEXT, SET, the leaf inventory and
//! trap varbinds: each operation walks the tree with its own
//! [`Handler`](handler::Handler), which matches request OIDs against leaves
//! as they are exposed.
//!
//! ```text
//!  request OID ──► MibRegistry ──► Inventory::find_split ──► tree walk
//!                                                              │
//!                      GetHandler / SetHandler ◄── Expose::expose
//! ```
//!
//! Front ends:
//! - [`passpersist`] speaks net-snmp's `pass_persist` line protocol.
//! - [`rpc`] exposes management functions over JSON-RPC with the same
//!   privilege and error envelope conventions.
//!
//! [`mib_generator`] writes the SMIv2 text of an attached module.
//!
//! # Example
//!
//! ```rust
//! use mib_expose::prelude::*;
//! use mib_expose::tree::{Table, TableAccess};
//!
//! #[derive(Clone, Default)]
//! struct Port {
//!     mtu: u32,
//! }
//!
//! impl Expose for Port {
//!     fn expose<H: Handler>(&mut self, h: &mut H) {
//!         h.add_leaf(&mut self.mtu, LeafOptions::new(OidElement::new(0, "portMtu")));
//!     }
//! }
//!
//! struct Ports;
//!
//! impl TableAccess for Ports {
//!     type Key = u32;
//!     type Row = Port;
//!
//!     fn get(&self, key: &u32) -> MgmtResult<Port> {
//!         if (1..=4).contains(key) {
//!             Ok(Port { mtu: 1500 + key })
//!         } else {
//!             Err(MgmtError::new(1, 1))
//!         }
//!     }
//!
//!     fn next(&self, key: Option<&u32>) -> Option<u32> {
//!         let next = key.map_or(1, |k| k + 1);
//!         (next <= 4).then_some(next)
//!     }
//! }
//!
//! let mut registry = MibRegistry::bare();
//! registry
//!     .attach_module(Table::new(OidElement::new(7, "portTable"), Ports))
//!     .unwrap();
//!
//! // table.entry.column.index
//! assert_eq!(registry.get(&oid!(7, 1, 2, 3)), Ok(Value::Unsigned32(1503)));
//! let next = registry.get_next(&oid!(7, 1, 2, 4)).unwrap_err();
//! assert_eq!(next, ErrorStatus::NoSuchName);
//! ```
//!
//! # Logging
//!
//! All crate events go through `tracing` with targets below `mib_expose`.
//! The library never installs a subscriber.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod globals;
pub mod handler;
pub mod index;
pub mod mib_generator;
pub mod oid;
pub mod passpersist;
pub mod prelude;
pub mod rpc;
pub mod tag;
pub mod tree;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;

pub use error::{Error, ErrorStatus, MgmtError, MgmtResult, Result};
pub use globals::{MibRegistry, MibRegistryBuilder};
pub use oid::{OidElement, OidSequence};
pub use value::Value;
pub use varbind::VarBind;
