//! Error types for mib-expose.
//!
//! Two layers of failure exist. Walk outcomes are SNMP protocol statuses
//! ([`ErrorStatus`]) and are returned by value, never raised. Everything
//! else (malformed OIDs and value text, tree construction mistakes, I/O in
//! the front ends) is an [`Error`].
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.

use crate::oid::OidSequence;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for calls into a management API.
pub type MgmtResult<T> = std::result::Result<T, MgmtError>;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Textual value parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// Type keyword not recognised.
    UnknownType,
    /// Value missing after the type keyword.
    MissingValue,
    /// Number did not parse or does not fit the type.
    InvalidNumber,
    /// Dotted quad did not parse.
    InvalidIpAddress,
    /// Hex octet list did not parse.
    InvalidOctets,
}

impl std::fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType => write!(f, "unknown value type"),
            Self::MissingValue => write!(f, "missing value"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::InvalidIpAddress => write!(f, "invalid IP address"),
            Self::InvalidOctets => write!(f, "invalid octet string"),
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// True for every status other than `noError`.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Error code returned by a management API call.
///
/// The upper 16 bits identify the module that produced the error and the
/// lower 16 bits the module-specific code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("management error 0x{:08x} (module {}, code {})", .0, .0 >> 16, .0 & 0xffff)]
pub struct MgmtError(pub u32);

impl MgmtError {
    /// Failure without a more specific code.
    pub const UNSPECIFIED: MgmtError = MgmtError(0xffff_ffff);

    /// Build a code from its module and module-local parts.
    pub const fn new(module: u16, code: u16) -> Self {
        Self(((module as u32) << 16) | code as u32)
    }

    /// Module identifier.
    pub const fn module(&self) -> u32 {
        self.0 >> 16
    }

    /// Module-local code.
    pub const fn code(&self) -> u32 {
        self.0 & 0xffff
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error in a front end.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// SNMP protocol status returned by a walk.
    #[error("SNMP error: {status}{}", oid.as_ref().map(|o| format!(" at {}", o)).unwrap_or_default())]
    Snmp {
        status: ErrorStatus,
        oid: Option<OidSequence>,
    },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// Invalid textual value.
    #[error("invalid value: {kind}{}", input.as_ref().map(|i| format!(" in '{}'", i)).unwrap_or_default())]
    InvalidValue {
        kind: ValueErrorKind,
        input: Option<Box<str>>,
    },

    /// A walk produced an OID that does not sort after the previous one.
    #[error("non-increasing OID: {current} after {previous}")]
    NonIncreasingOid {
        previous: OidSequence,
        current: OidSequence,
    },

    /// A node with the same element is already attached at this position.
    #[error("duplicate node {name} at {oid}")]
    DuplicateNode {
        oid: OidSequence,
        name: &'static str,
    },

    /// No module with this name is attached to the registry.
    #[error("unknown module {name}")]
    UnknownModule { name: Box<str> },
}

impl Error {
    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create an invalid value error with the input string that failed.
    pub fn invalid_value(kind: ValueErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidValue {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create a protocol status error.
    pub fn snmp(status: ErrorStatus, oid: Option<OidSequence>) -> Self {
        Self::Snmp { status, oid }
    }
}
