//! Per-leaf and per-structure options.

use std::fmt;

use smallvec::SmallVec;

use crate::oid::OidElement;

/// MAX-ACCESS clause of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxAccess {
    #[default]
    ReadWrite,
    ReadOnly,
    AccessibleForNotify,
}

impl fmt::Display for MaxAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadWrite => write!(f, "read-write"),
            Self::ReadOnly => write!(f, "read-only"),
            Self::AccessibleForNotify => write!(f, "accessible-for-notify"),
        }
    }
}

/// STATUS clause of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Deprecated => write!(f, "deprecated"),
            Self::Obsolete => write!(f, "obsolete"),
        }
    }
}

/// Inclusive value (or size) ranges a written value must fall in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    ranges: SmallVec<[(i64, i64); 2]>,
}

impl RangeSpec {
    pub fn new(min: i64, max: i64) -> Self {
        let mut ranges = SmallVec::new();
        ranges.push((min, max));
        Self { ranges }
    }

    /// Allow an additional range.
    pub fn or(mut self, min: i64, max: i64) -> Self {
        self.ranges.push((min, max));
        self
    }

    pub fn contains(&self, v: i64) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= v && v <= hi)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}..{}", lo, hi)?;
        }
        Ok(())
    }
}

/// Options accompanying one [`add_leaf`](super::Handler::add_leaf) call.
///
/// Only the element is mandatory; everything else has a default.
pub struct LeafOptions<'a> {
    pub element: OidElement,
    pub description: &'static str,
    pub status: Status,
    pub access: MaxAccess,
    /// Decides whether the value is currently gettable.
    pub pre_get: Option<&'a dyn Fn() -> bool>,
    /// Run after the value has been written.
    pub post_set: SmallVec<[&'a mut dyn FnMut(); 2]>,
    pub range: Option<RangeSpec>,
}

impl<'a> LeafOptions<'a> {
    pub fn new(element: OidElement) -> Self {
        Self {
            element,
            description: "",
            status: Status::Current,
            access: MaxAccess::ReadWrite,
            pre_get: None,
            post_set: SmallVec::new(),
            range: None,
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn access(mut self, access: MaxAccess) -> Self {
        self.access = access;
        self
    }

    pub fn read_only(self) -> Self {
        self.access(MaxAccess::ReadOnly)
    }

    pub fn pre_get(mut self, condition: &'a dyn Fn() -> bool) -> Self {
        self.pre_get = Some(condition);
        self
    }

    pub fn post_set(mut self, action: &'a mut dyn FnMut()) -> Self {
        self.post_set.push(action);
        self
    }

    pub fn range(mut self, range: RangeSpec) -> Self {
        self.range = Some(range);
        self
    }
}

impl fmt::Debug for LeafOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafOptions")
            .field("element", &self.element)
            .field("access", &self.access)
            .field("status", &self.status)
            .field("pre_get", &self.pre_get.is_some())
            .field("post_set", &self.post_set.len())
            .field("range", &self.range)
            .finish()
    }
}

/// Properties of the structure currently being exposed.
///
/// `oid_offset` is added to the element of every following leaf, so a key
/// exposed at offset 1 and a row at offset 2 can both number their fields
/// from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArgumentProperties {
    pub oid_offset: u32,
    /// Index columns: readable but never writable.
    pub read_only: bool,
}

impl ArgumentProperties {
    /// Value fields at `offset`.
    pub const fn offset(oid_offset: u32) -> Self {
        Self {
            oid_offset,
            read_only: false,
        }
    }

    /// Index fields at `offset`.
    pub const fn key(oid_offset: u32) -> Self {
        Self {
            oid_offset,
            read_only: true,
        }
    }
}
