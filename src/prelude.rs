//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use mib_expose::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`MibRegistry`], [`OidSequence`], [`OidElement`], [`Value`], [`VarBind`]
//! - Exposition: [`Expose`], [`Handler`], [`LeafOptions`], [`ArgumentProperties`]
//! - Error handling: [`Error`], [`Result`], [`ErrorStatus`], [`MgmtError`], [`MgmtResult`]
//! - The [`oid!`] macro for OID literals

pub use crate::error::{Error, ErrorStatus, MgmtError, MgmtResult, Result};
pub use crate::globals::MibRegistry;
pub use crate::handler::{ArgumentProperties, Expose, Handler, LeafOptions, MaxAccess, RangeSpec};
pub use crate::oid::{OidElement, OidSequence};
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;
