//! OID cursor and request state shared by every walk direction.

use std::panic::Location;

use super::HandlerState;
use crate::error::ErrorStatus;
use crate::oid::OidSequence;

/// Tracks how far a walk has matched the target OID.
///
/// `seq` is the nodal OID of the leaf being looked for, without the
/// instance index. `index` is the instance part: `Some(empty)` for a scalar,
/// the row key arcs for a table, or `None` when a GETNEXT should start from
/// the first instance.
#[derive(Debug)]
pub struct GetSetHandlerCommon<'a> {
    seq: &'a OidSequence,
    index: Option<&'a OidSequence>,
    oid_index: usize,
    next_index: OidSequence,
    state: HandlerState,
    error_code: ErrorStatus,
    oid_offset: u32,
    read_only: bool,
    getnext: bool,
}

impl<'a> GetSetHandlerCommon<'a> {
    pub fn new(seq: &'a OidSequence, index: Option<&'a OidSequence>, getnext: bool) -> Self {
        Self {
            seq,
            index,
            oid_index: 0,
            next_index: OidSequence::empty(),
            state: HandlerState::Searching,
            error_code: ErrorStatus::NoError,
            oid_offset: 0,
            read_only: false,
            getnext,
        }
    }

    /// Match `arc` at the cursor and advance past it.
    ///
    /// A mismatch leaves the cursor untouched. A match must be undone with
    /// [`consume_oid_rollback`](Self::consume_oid_rollback) once the
    /// subtree below it has been tried.
    pub fn consume_oid(&mut self, arc: u32) -> bool {
        match self.seq.arcs().get(self.oid_index) {
            Some(&a) if a == arc => {
                self.oid_index += 1;
                true
            }
            _ => false,
        }
    }

    /// Like [`consume_oid`](Self::consume_oid), but only matches when
    /// `arc` is the last arc of the target.
    pub fn consume_oid_leaf(&mut self, arc: u32) -> bool {
        if self.oid_index + 1 != self.seq.len() {
            return false;
        }
        self.consume_oid(arc)
    }

    pub fn consume_oid_rollback(&mut self) {
        self.oid_index = self.oid_index.saturating_sub(1);
    }

    /// Arcs matched so far.
    pub fn consumed_oid(&self) -> OidSequence {
        OidSequence::from_slice(&self.seq.arcs()[..self.oid_index])
    }

    /// Record an error. Anything but `noError` ends the walk.
    #[track_caller]
    pub fn set_error(&mut self, status: ErrorStatus) {
        self.error_code = status;
        if status.is_error() {
            let caller = Location::caller();
            tracing::warn!(
                target: "mib_expose::handler",
                status = %status,
                oid = %self.seq,
                file = caller.file(),
                line = caller.line(),
                "walk error"
            );
            self.state = HandlerState::Failed;
        }
    }

    pub fn error_code(&self) -> ErrorStatus {
        self.error_code
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    pub fn set_state(&mut self, state: HandlerState) {
        self.state = state;
    }

    pub fn seq(&self) -> &OidSequence {
        self.seq
    }

    pub fn index(&self) -> Option<&'a OidSequence> {
        self.index
    }

    pub fn is_getnext(&self) -> bool {
        self.getnext
    }

    /// Instance index of the matched row, as it should appear in the answer.
    pub fn next_index(&self) -> &OidSequence {
        &self.next_index
    }

    pub fn set_next_index(&mut self, index: OidSequence) {
        self.next_index = index;
    }

    /// Full OID of the matched instance: nodal OID plus `next_index`.
    pub fn oid_seq_out(&self) -> OidSequence {
        self.seq.concat(&self.next_index)
    }

    pub fn oid_offset(&self) -> u32 {
        self.oid_offset
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub(crate) fn set_argument_properties(&mut self, oid_offset: u32, read_only: bool) {
        self.oid_offset = oid_offset;
        self.read_only = read_only;
    }
}
