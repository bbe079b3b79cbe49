//! ASN.1 type tags of the SNMP SMI.
//!
//! Tag encoding follows X.690 Section 8.1.2:
//! - Bits 7-6: Class (00=Universal, 01=Application, 10=Context-specific, 11=Private)
//! - Bit 5: Primitive (0) or Constructed (1)
//! - Bits 4-0: Tag number

/// Universal tags (class bits 00)
pub mod universal {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
}

/// Application tags (class bits 01) - SNMP-specific types
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    pub const GAUGE32: u8 = 0x42; // Also Unsigned32
    pub const TIMETICKS: u8 = 0x43;
    pub const COUNTER64: u8 = 0x46;
}

/// The SMI syntax of a leaf.
///
/// `Unsigned32` and `Gauge32` share a tag on the wire but are kept apart
/// here so generated inventories keep the declared syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsnType {
    Integer,
    OctetString,
    Null,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    Unsigned32,
    TimeTicks,
    Counter64,
}

impl AsnType {
    /// BER tag byte for this type.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Integer => universal::INTEGER,
            Self::OctetString => universal::OCTET_STRING,
            Self::Null => universal::NULL,
            Self::ObjectIdentifier => universal::OBJECT_IDENTIFIER,
            Self::IpAddress => application::IP_ADDRESS,
            Self::Counter32 => application::COUNTER32,
            Self::Gauge32 | Self::Unsigned32 => application::GAUGE32,
            Self::TimeTicks => application::TIMETICKS,
            Self::Counter64 => application::COUNTER64,
        }
    }

    /// Whether two types are interchangeable for a SET.
    ///
    /// Only `Gauge32` and `Unsigned32`, which are identical on the wire.
    pub fn accepts(self, other: AsnType) -> bool {
        self.tag() == other.tag()
    }

    /// SMI name as written in a MIB module.
    pub const fn smi_name(self) -> &'static str {
        match self {
            Self::Integer => "Integer32",
            Self::OctetString => "OCTET STRING",
            Self::Null => "NULL",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::IpAddress => "IpAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::Unsigned32 => "Unsigned32",
            Self::TimeTicks => "TimeTicks",
            Self::Counter64 => "Counter64",
        }
    }
}

impl std::fmt::Display for AsnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.smi_name())
    }
}
