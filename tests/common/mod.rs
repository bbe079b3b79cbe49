//! Shared test utilities for mib-expose integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod fixtures;
mod walk;

pub use fixtures::*;
pub use walk::{collect_walk, init_tracing};
