//! SNMP values and their textual form.
//!
//! [`Value`] is what a walk produces and consumes. The text codec speaks the
//! net-snmp `pass_persist` dialect: a type word followed by the value, e.g.
//! `integer 5`, `ipaddress 10.0.0.1` or `octet "0a 0b"`.
//!
//! Typed bindings between values and feature data live in [`leaf`].

pub mod leaf;

pub use leaf::{
    AsBitMask, AsCounter, AsCounter32, AsDisplayString, AsEnum, AsOctetString, AsPassword,
    AsTimeTicks, LeafValue, SnmpEnum,
};

use std::fmt;
use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::error::{Error, Result, ValueErrorKind};
use crate::oid::OidSequence;
use crate::tag::AsnType;

/// SNMP value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Integer(i32),
    Unsigned32(u32),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    OctetString(Bytes),
    IpAddress([u8; 4]),
    ObjectIdentifier(OidSequence),
    Null,
}

impl Value {
    /// SMI type of this value.
    pub fn asn_type(&self) -> AsnType {
        match self {
            Value::Integer(_) => AsnType::Integer,
            Value::Unsigned32(_) => AsnType::Unsigned32,
            Value::Counter32(_) => AsnType::Counter32,
            Value::Gauge32(_) => AsnType::Gauge32,
            Value::TimeTicks(_) => AsnType::TimeTicks,
            Value::Counter64(_) => AsnType::Counter64,
            Value::OctetString(_) => AsnType::OctetString,
            Value::IpAddress(_) => AsnType::IpAddress,
            Value::ObjectIdentifier(_) => AsnType::ObjectIdentifier,
            Value::Null => AsnType::Null,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Any of the unsigned 32-bit types.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Unsigned32(v) | Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                Some(*v)
            }
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            _ => self.as_u32().map(u64::from),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) => Some(b),
            _ => None,
        }
    }

    /// Octet string as UTF-8, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Build an octet string value from text.
    pub fn string(s: impl Into<String>) -> Self {
        Value::OctetString(Bytes::from(s.into()))
    }

    /// `pass_persist` type word.
    ///
    /// Octet strings that are entirely printable ASCII are reported as
    /// `string`, everything else as `octet`.
    pub fn type_word(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Unsigned32(_) | Value::Gauge32(_) => "gauge",
            Value::Counter32(_) => "counter",
            Value::TimeTicks(_) => "timeticks",
            Value::Counter64(_) => "counter64",
            Value::OctetString(b) if is_printable(b) => "string",
            Value::OctetString(_) => "octet",
            Value::IpAddress(_) => "ipaddress",
            Value::ObjectIdentifier(_) => "objectid",
            Value::Null => "null",
        }
    }

    /// Value text as written after the type word in `pass_persist` output.
    pub fn format_text(&self) -> String {
        match self {
            Value::OctetString(b) if is_printable(b) => String::from_utf8_lossy(b).into_owned(),
            Value::OctetString(b) => format_hex(b),
            Value::IpAddress(a) => Ipv4Addr::from(*a).to_string(),
            Value::ObjectIdentifier(o) => format!(".{}", o),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parse a typed value as written by snmpd in a `pass_persist` set
    /// request, e.g. `integer 5` or `string "hello"`.
    pub fn parse_typed(line: &str) -> Result<Value> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        Self::parse_with_type(word, rest).map_err(|kind| Error::invalid_value(kind, line))
    }

    fn parse_with_type(word: &str, text: &str) -> std::result::Result<Value, ValueErrorKind> {
        let word = word.to_ascii_lowercase();
        let needs_value = !matches!(word.as_str(), "string" | "octet" | "null");
        if needs_value && text.is_empty() {
            return Err(ValueErrorKind::MissingValue);
        }

        let number = |t: &str| t.parse::<u64>().map_err(|_| ValueErrorKind::InvalidNumber);
        let number32 = |t: &str| t.parse::<u32>().map_err(|_| ValueErrorKind::InvalidNumber);

        match word.as_str() {
            "integer" | "integer32" => text
                .parse::<i32>()
                .map(Value::Integer)
                .map_err(|_| ValueErrorKind::InvalidNumber),
            "gauge" | "unsigned" | "unsigned32" | "gauge32" => number32(text).map(Value::Gauge32),
            "counter" | "counter32" => number32(text).map(Value::Counter32),
            "timeticks" | "timetick" => number32(text).map(Value::TimeTicks),
            "counter64" => number(text).map(Value::Counter64),
            "ipaddress" => text
                .parse::<Ipv4Addr>()
                .map(|a| Value::IpAddress(a.octets()))
                .map_err(|_| ValueErrorKind::InvalidIpAddress),
            "objectid" => OidSequence::parse(text)
                .map(Value::ObjectIdentifier)
                .map_err(|_| ValueErrorKind::InvalidNumber),
            "string" => Ok(Value::OctetString(Bytes::copy_from_slice(
                unquote(text).as_bytes(),
            ))),
            "octet" => parse_hex(unquote(text)).map(|b| Value::OctetString(Bytes::from(b))),
            "null" => Ok(Value::Null),
            _ => Err(ValueErrorKind::UnknownType),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Unsigned32(v) | Value::Counter32(v) | Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::OctetString(b) if is_printable(b) => {
                write!(f, "\"{}\"", String::from_utf8_lossy(b))
            }
            Value::OctetString(b) => write!(f, "{}", format_hex(b)),
            Value::IpAddress(a) => write!(f, "{}", Ipv4Addr::from(*a)),
            Value::ObjectIdentifier(o) => write!(f, "{}", o),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Ipv4Addr> for Value {
    fn from(a: Ipv4Addr) -> Self {
        Value::IpAddress(a.octets())
    }
}

/// 48-bit Ethernet MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

fn is_printable(b: &[u8]) -> bool {
    !b.is_empty() && b.iter().all(|c| (32..=126).contains(c))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Space separated two-digit lowercase hex pairs.
pub(crate) fn format_hex(b: &[u8]) -> String {
    let mut out = String::with_capacity(b.len() * 3);
    for (i, byte) in b.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

fn parse_hex(s: &str) -> std::result::Result<Vec<u8>, ValueErrorKind> {
    s.split_whitespace()
        .map(|tok| {
            if tok.len() > 2 {
                return Err(ValueErrorKind::InvalidOctets);
            }
            u8::from_str_radix(tok, 16).map_err(|_| ValueErrorKind::InvalidOctets)
        })
        .collect()
}
