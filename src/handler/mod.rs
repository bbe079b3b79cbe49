//! Walk handlers for GET, GETNEXT and SET.
//!
//! A request is served by walking the MIB tree with a handler. Every node
//! on the way tries to consume its arc from the handler's target OID; the
//! single leaf whose OID matches completely performs the read or write.
//!
//! - [`GetSetHandlerCommon`] - OID cursor and request state shared by all walks
//! - [`GetHandler`] - Reads one value (exact or next)
//! - [`SetHandler`] - Writes one value into a cached row copy
//! - [`InventoryWalker`] - Records every leaf, used to index the tree
//! - [`Handler`] and [`Expose`] - The interface between handlers and feature data
//!
//! # Exposing data
//!
//! Feature data types describe their leaves once, in an [`Expose`]
//! implementation, and every handler interprets that description in its own
//! way:
//!
//! ```rust
//! use mib_expose::handler::{Expose, Handler, LeafOptions, RangeSpec};
//! use mib_expose::oid::OidElement;
//!
//! #[derive(Clone, Default)]
//! struct PortConf {
//!     enabled: bool,
//!     mtu: u32,
//! }
//!
//! impl Expose for PortConf {
//!     fn expose<H: Handler>(&mut self, h: &mut H) {
//!         h.add_leaf(&mut self.enabled, LeafOptions::new(OidElement::new(0, "portEnabled")));
//!         let enabled = self.enabled;
//!         h.add_leaf(
//!             &mut self.mtu,
//!             LeafOptions::new(OidElement::new(1, "portMtu"))
//!                 .range(RangeSpec::new(1518, 9600))
//!                 .pre_get(&|| enabled),
//!         );
//!     }
//! }
//! ```
//!
//! # Handler states
//!
//! A walk starts in [`HandlerState::Searching`]. A match moves it to
//! [`HandlerState::Done`]; a match whose pre-condition declines moves it to
//! [`HandlerState::Again`], telling GETNEXT to continue after this instance;
//! any error moves it to [`HandlerState::Failed`]. Once the state leaves
//! `Searching`, every further leaf visit is a no-op.

mod common;
mod get;
mod inventory;
mod options;
mod results;
mod set;

pub use common::GetSetHandlerCommon;
pub use get::GetHandler;
pub use inventory::{InventoryWalker, LeafInfo};
pub use options::{ArgumentProperties, LeafOptions, MaxAccess, RangeSpec, Status};
pub use results::Response;
pub use set::{SetCache, SetHandler};

use crate::value::LeafValue;

/// Progress of a single walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Still looking for the target OID.
    Searching,
    /// Matched, but the instance is not visible; continue after it.
    Again,
    /// Request satisfied.
    Done,
    /// Terminal error, see the handler's error code.
    Failed,
}

impl std::fmt::Display for HandlerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searching => write!(f, "SEARCHING"),
            Self::Again => write!(f, "AGAIN"),
            Self::Done => write!(f, "DONE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// The visitor interface feature data is exposed through.
///
/// Implemented by each walk direction. Leaf dispatch is generic so a walk
/// over many leaves allocates nothing and does no dynamic lookup.
pub trait Handler {
    fn state(&self) -> HandlerState;

    /// Apply properties to every following leaf of the current structure.
    fn argument_properties(&mut self, props: ArgumentProperties);

    /// Visit one leaf.
    fn add_leaf<V: LeafValue + ?Sized>(&mut self, value: &mut V, opts: LeafOptions<'_>);

    /// Visit a read-only capability constant.
    fn capability<V: LeafValue>(&mut self, value: V, opts: LeafOptions<'_>);
}

/// Data that can describe its leaves to a [`Handler`].
pub trait Expose {
    fn expose<H: Handler>(&mut self, h: &mut H);
}

/// Nothing to expose, e.g. a table whose index columns are not accessible.
impl Expose for () {
    fn expose<H: Handler>(&mut self, _h: &mut H) {}
}
