//! OID sequences and tree elements.
//!
//! An [`OidSequence`] is the numeric path addressing a node, a leaf, or a
//! leaf instance in the MIB tree. Arcs are stored as `SmallVec<[u32; 16]>`
//! so that the common case never touches the heap.

use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs an [`OidSequence`] may hold.
///
/// Per RFC 2578 Section 3.5: "there are at most 128 sub-identifiers in a value".
pub const MAX_OID_LEN: usize = 128;

/// One numbered, named component of the MIB tree.
///
/// Every node in the tree (namespaces, structs, tables, traps, and each
/// exposed field) is identified to its parent by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OidElement {
    /// The arc value contributed to the OID.
    pub numeric: u32,
    /// The MIB object name.
    pub name: &'static str,
}

impl OidElement {
    pub const fn new(numeric: u32, name: &'static str) -> Self {
        Self { numeric, name }
    }
}

impl fmt::Display for OidElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.numeric)
    }
}

/// Object identifier path with at most [`MAX_OID_LEN`] arcs.
///
/// Ordering is lexicographic over the arcs, which is exactly SNMP's
/// GETNEXT order: a prefix sorts before every OID that extends it.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OidSequence {
    arcs: SmallVec<[u32; 16]>,
}

impl OidSequence {
    /// Create an empty sequence.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create a sequence from arc values, dropping arcs beyond [`MAX_OID_LEN`].
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().take(MAX_OID_LEN).collect(),
        }
    }

    /// Create a sequence from a slice of arcs, dropping arcs beyond [`MAX_OID_LEN`].
    pub fn from_slice(arcs: &[u32]) -> Self {
        let n = arcs.len().min(MAX_OID_LEN);
        Self {
            arcs: SmallVec::from_slice(&arcs[..n]),
        }
    }

    /// Parse dotted decimal notation.
    ///
    /// A leading dot is accepted since net-snmp writes OIDs that way.
    ///
    /// ```
    /// use mib_expose::oid::OidSequence;
    ///
    /// let oid = OidSequence::parse(".1.3.6.1.4.1.6603").unwrap();
    /// assert_eq!(oid.arcs(), &[1, 3, 6, 1, 4, 1, 6603]);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            let arc: u32 = part.parse().map_err(|_| {
                Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s.to_string())
            })?;
            if arcs.len() == MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: body.split('.').count(),
                        max: MAX_OID_LEN,
                    },
                    s.to_string(),
                ));
            }
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Append an arc.
    ///
    /// Saturates at [`MAX_OID_LEN`]: the arc is dropped and a warning logged.
    /// Use [`try_push`](Self::try_push) when overflow must be observed.
    pub fn push(&mut self, arc: u32) {
        if self.try_push(arc).is_err() {
            tracing::warn!(target: "mib_expose::oid", oid = %self, arc, "OID capacity exceeded, arc dropped");
        }
    }

    /// Append an arc, failing if the sequence is already full.
    pub fn try_push(&mut self, arc: u32) -> Result<()> {
        if self.arcs.len() >= MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len() + 1,
                max: MAX_OID_LEN,
            }));
        }
        self.arcs.push(arc);
        Ok(())
    }

    /// Remove and return the last arc.
    pub fn pop(&mut self) -> Option<u32> {
        self.arcs.pop()
    }

    /// Shorten the sequence to `len` arcs.
    pub fn truncate(&mut self, len: usize) {
        self.arcs.truncate(len);
    }

    pub fn clear(&mut self) {
        self.arcs.clear();
    }

    /// Append every arc of `other`, saturating like [`push`](Self::push).
    pub fn extend_from(&mut self, other: &OidSequence) {
        for &arc in other.arcs() {
            self.push(arc);
        }
    }

    /// Return `self` followed by `other`.
    pub fn concat(&self, other: &OidSequence) -> OidSequence {
        let mut out = self.clone();
        out.extend_from(other);
        out
    }

    /// Return `self` with one more arc.
    pub fn child(&self, arc: u32) -> OidSequence {
        let mut out = self.clone();
        out.push(arc);
        out
    }

    /// Check whether `prefix` is a (not necessarily proper) prefix of `self`.
    pub fn starts_with(&self, prefix: &OidSequence) -> bool {
        self.arcs.len() >= prefix.arcs.len() && self.arcs[..prefix.arcs.len()] == prefix.arcs[..]
    }

    /// Return the arcs following `prefix`, or `None` if `prefix` does not match.
    pub fn strip_prefix(&self, prefix: &OidSequence) -> Option<OidSequence> {
        if self.starts_with(prefix) {
            Some(OidSequence::from_slice(&self.arcs[prefix.arcs.len()..]))
        } else {
            None
        }
    }
}

impl fmt::Debug for OidSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OidSequence({})", self)
    }
}

impl fmt::Display for OidSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for OidSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for OidSequence {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for OidSequence {
    fn from(arcs: [u32; N]) -> Self {
        Self::from_slice(&arcs)
    }
}

impl PartialOrd for OidSequence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OidSequence {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`OidSequence`] from literal arcs.
///
/// ```
/// use mib_expose::oid;
///
/// let root = oid!(1, 3, 6, 1, 4, 1, 6603);
/// assert_eq!(root.to_string(), "1.3.6.1.4.1.6603");
/// assert!(oid!(1, 3, 6, 1, 4, 1, 6603, 1).starts_with(&root));
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::OidSequence::from_slice(&[$($arc),*])
    };
}
