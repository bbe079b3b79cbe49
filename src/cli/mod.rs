//! CLI support for the `mib-expose-*` binaries.
//!
//! Argument parsing, log setup and a demo module to serve when no feature
//! modules are linked in.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod demo;
