//! Typed bindings between feature data and SNMP values.
//!
//! A [`LeafValue`] knows its SMI syntax, how to render itself as a
//! [`Value`], and how to accept a [`Value`] written by a SET. Plain Rust
//! types map to their natural syntax; the `As*` wrappers select another
//! syntax or add constraints for the same storage (a `u64` as Counter64,
//! a `String` as a size-limited DisplayString, a `[bool]` as a BITS mask).
//!
//! Assignment failures are reported as the SNMP status a SET should fail
//! with: `wrongType`, `wrongLength` or `wrongValue`.

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;

use super::{MacAddress, Value};
use crate::error::ErrorStatus;
use crate::tag::AsnType;

type AssignResult = std::result::Result<(), ErrorStatus>;

/// A field that can be exposed as an SNMP leaf.
pub trait LeafValue {
    /// Declared SMI syntax of the leaf.
    fn asn_type(&self) -> AsnType;

    /// Current value in wire form.
    fn get(&self) -> Value;

    /// Overwrite from a SET value.
    fn set(&mut self, value: &Value) -> AssignResult;

    /// Quantity checked against a declared range after a SET: the number
    /// for integer syntaxes, the length for strings.
    fn range_operand(&self) -> Option<i64> {
        None
    }
}

fn expect_type(expected: AsnType, value: &Value) -> AssignResult {
    if expected.accepts(value.asn_type()) {
        Ok(())
    } else {
        tracing::debug!(target: "mib_expose::value", expected = %expected, actual = %value.asn_type(), "wrong type");
        Err(ErrorStatus::WrongType)
    }
}

fn signed(value: &Value) -> std::result::Result<i32, ErrorStatus> {
    expect_type(AsnType::Integer, value)?;
    value.as_i32().ok_or(ErrorStatus::WrongType)
}

fn unsigned(expected: AsnType, value: &Value) -> std::result::Result<u32, ErrorStatus> {
    expect_type(expected, value)?;
    value.as_u32().ok_or(ErrorStatus::WrongType)
}

fn octets(value: &Value) -> std::result::Result<&[u8], ErrorStatus> {
    expect_type(AsnType::OctetString, value)?;
    value.as_bytes().ok_or(ErrorStatus::WrongType)
}

// ============================================================================
// Integer syntaxes
// ============================================================================

impl LeafValue for i32 {
    fn asn_type(&self) -> AsnType {
        AsnType::Integer
    }

    fn get(&self) -> Value {
        Value::Integer(*self)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        *self = signed(value)?;
        Ok(())
    }

    fn range_operand(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

macro_rules! narrow_signed {
    ($($t:ty),*) => {$(
        impl LeafValue for $t {
            fn asn_type(&self) -> AsnType {
                AsnType::Integer
            }

            fn get(&self) -> Value {
                Value::Integer(i32::from(*self))
            }

            fn set(&mut self, value: &Value) -> AssignResult {
                *self = <$t>::try_from(signed(value)?).map_err(|_| ErrorStatus::WrongValue)?;
                Ok(())
            }

            fn range_operand(&self) -> Option<i64> {
                Some(i64::from(*self))
            }
        }
    )*};
}

narrow_signed!(i16, i8);

impl LeafValue for u32 {
    fn asn_type(&self) -> AsnType {
        AsnType::Unsigned32
    }

    fn get(&self) -> Value {
        Value::Unsigned32(*self)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        *self = unsigned(AsnType::Unsigned32, value)?;
        Ok(())
    }

    fn range_operand(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

macro_rules! narrow_unsigned {
    ($($t:ty),*) => {$(
        impl LeafValue for $t {
            fn asn_type(&self) -> AsnType {
                AsnType::Unsigned32
            }

            fn get(&self) -> Value {
                Value::Unsigned32(u32::from(*self))
            }

            fn set(&mut self, value: &Value) -> AssignResult {
                let v = unsigned(AsnType::Unsigned32, value)?;
                *self = <$t>::try_from(v).map_err(|_| ErrorStatus::WrongValue)?;
                Ok(())
            }

            fn range_operand(&self) -> Option<i64> {
                Some(i64::from(*self))
            }
        }
    )*};
}

narrow_unsigned!(u16, u8);

/// Counter64 is the only 64-bit syntax in SMIv2.
impl LeafValue for u64 {
    fn asn_type(&self) -> AsnType {
        AsnType::Counter64
    }

    fn get(&self) -> Value {
        Value::Counter64(*self)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        expect_type(AsnType::Counter64, value)?;
        *self = value.as_u64().ok_or(ErrorStatus::WrongType)?;
        Ok(())
    }
}

/// TruthValue: true(1), false(2).
impl LeafValue for bool {
    fn asn_type(&self) -> AsnType {
        AsnType::Integer
    }

    fn get(&self) -> Value {
        Value::Integer(if *self { 1 } else { 2 })
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        match signed(value)? {
            1 => *self = true,
            2 => *self = false,
            other => {
                tracing::debug!(target: "mib_expose::value", value = other, "expected TruthValue 1 or 2");
                return Err(ErrorStatus::WrongValue);
            }
        }
        Ok(())
    }
}

/// Counter64 view of a `u64`.
pub struct AsCounter<'a>(pub &'a mut u64);

impl LeafValue for AsCounter<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::Counter64
    }

    fn get(&self) -> Value {
        Value::Counter64(*self.0)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        self.0.set(value)
    }
}

/// Counter32 view of a `u32`.
pub struct AsCounter32<'a>(pub &'a mut u32);

impl LeafValue for AsCounter32<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::Counter32
    }

    fn get(&self) -> Value {
        Value::Counter32(*self.0)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        *self.0 = unsigned(AsnType::Counter32, value)?;
        Ok(())
    }
}

/// TimeTicks view of a `u32` (hundredths of a second).
pub struct AsTimeTicks<'a>(pub &'a mut u32);

impl LeafValue for AsTimeTicks<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::TimeTicks
    }

    fn get(&self) -> Value {
        Value::TimeTicks(*self.0)
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        *self.0 = unsigned(AsnType::TimeTicks, value)?;
        Ok(())
    }
}

/// An enumeration exposed as an INTEGER with named values.
pub trait SnmpEnum: Copy {
    fn to_int(self) -> i32;
    fn from_int(v: i32) -> Option<Self>;
}

/// INTEGER view of an enumeration.
pub struct AsEnum<'a, E: SnmpEnum>(pub &'a mut E);

impl<E: SnmpEnum> LeafValue for AsEnum<'_, E> {
    fn asn_type(&self) -> AsnType {
        AsnType::Integer
    }

    fn get(&self) -> Value {
        Value::Integer(self.0.to_int())
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        let v = signed(value)?;
        *self.0 = E::from_int(v).ok_or(ErrorStatus::WrongValue)?;
        Ok(())
    }
}

// ============================================================================
// Address syntaxes
// ============================================================================

impl LeafValue for Ipv4Addr {
    fn asn_type(&self) -> AsnType {
        AsnType::IpAddress
    }

    fn get(&self) -> Value {
        Value::IpAddress(self.octets())
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        expect_type(AsnType::IpAddress, value)?;
        match value {
            Value::IpAddress(a) => {
                *self = Ipv4Addr::from(*a);
                Ok(())
            }
            _ => Err(ErrorStatus::WrongType),
        }
    }
}

/// InetAddress-style 16 octet string.
impl LeafValue for Ipv6Addr {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::OctetString(Bytes::copy_from_slice(&self.octets()))
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        let b: [u8; 16] = octets(value)?
            .try_into()
            .map_err(|_| ErrorStatus::WrongLength)?;
        *self = Ipv6Addr::from(b);
        Ok(())
    }
}

impl LeafValue for MacAddress {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::OctetString(Bytes::copy_from_slice(&self.0))
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        self.0 = octets(value)?
            .try_into()
            .map_err(|_| ErrorStatus::WrongLength)?;
        Ok(())
    }
}

// ============================================================================
// String syntaxes
// ============================================================================

/// Fixed-size OCTET STRING.
impl<const N: usize> LeafValue for [u8; N] {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::OctetString(Bytes::copy_from_slice(self))
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        *self = octets(value)?
            .try_into()
            .map_err(|_| ErrorStatus::WrongLength)?;
        Ok(())
    }

    fn range_operand(&self) -> Option<i64> {
        Some(N as i64)
    }
}

fn check_display(b: &[u8], max_len: usize) -> AssignResult {
    if b.len() > max_len || b.len() > 255 {
        tracing::debug!(target: "mib_expose::value", length = b.len(), max_len, "display string too long");
        return Err(ErrorStatus::WrongLength);
    }
    if let Some(c) = b.iter().find(|c| !(32..=126).contains(*c)) {
        tracing::debug!(target: "mib_expose::value", byte = *c, "non-printable character in display string");
        return Err(ErrorStatus::WrongValue);
    }
    Ok(())
}

/// DisplayString of at most `max_len` printable ASCII characters.
pub struct AsDisplayString<'a> {
    value: &'a mut String,
    max_len: usize,
}

impl<'a> AsDisplayString<'a> {
    pub fn new(value: &'a mut String, max_len: usize) -> Self {
        Self { value, max_len }
    }
}

impl LeafValue for AsDisplayString<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::from(self.value.as_str())
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        let b = octets(value)?;
        check_display(b, self.max_len)?;
        // Printable ASCII is always valid UTF-8.
        *self.value = String::from_utf8_lossy(b).into_owned();
        Ok(())
    }

    fn range_operand(&self) -> Option<i64> {
        Some(self.value.len() as i64)
    }
}

/// A plain `String` is a DisplayString of up to 255 characters.
impl LeafValue for String {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::from(self.as_str())
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        AsDisplayString::new(self, 255).set(value)
    }

    fn range_operand(&self) -> Option<i64> {
        Some(self.len() as i64)
    }
}

/// Write-only DisplayString: reads always return the empty string.
pub struct AsPassword<'a> {
    value: &'a mut String,
    max_len: usize,
}

impl<'a> AsPassword<'a> {
    pub fn new(value: &'a mut String, max_len: usize) -> Self {
        Self { value, max_len }
    }
}

impl LeafValue for AsPassword<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::OctetString(Bytes::new())
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        AsDisplayString::new(self.value, self.max_len).set(value)
    }
}

/// Variable length binary OCTET STRING of `min_len..=max_len` bytes.
pub struct AsOctetString<'a> {
    value: &'a mut Vec<u8>,
    min_len: usize,
    max_len: usize,
}

impl<'a> AsOctetString<'a> {
    pub fn new(value: &'a mut Vec<u8>, min_len: usize, max_len: usize) -> Self {
        Self {
            value,
            min_len,
            max_len,
        }
    }
}

impl LeafValue for AsOctetString<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        Value::OctetString(Bytes::copy_from_slice(self.value))
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        let b = octets(value)?;
        if b.len() < self.min_len || b.len() > self.max_len {
            tracing::debug!(
                target: "mib_expose::value",
                length = b.len(),
                min = self.min_len,
                max = self.max_len,
                "octet string length out of bounds"
            );
            return Err(ErrorStatus::WrongLength);
        }
        self.value.clear();
        self.value.extend_from_slice(b);
        Ok(())
    }

    fn range_operand(&self) -> Option<i64> {
        Some(self.value.len() as i64)
    }
}

/// BITS-style mask packed most significant bit first.
pub struct AsBitMask<'a>(pub &'a mut [bool]);

impl AsBitMask<'_> {
    fn octet_len(&self) -> usize {
        self.0.len().div_ceil(8)
    }
}

impl LeafValue for AsBitMask<'_> {
    fn asn_type(&self) -> AsnType {
        AsnType::OctetString
    }

    fn get(&self) -> Value {
        let mut out = vec![0u8; self.octet_len()];
        for (i, bit) in self.0.iter().enumerate() {
            if *bit {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        Value::OctetString(Bytes::from(out))
    }

    fn set(&mut self, value: &Value) -> AssignResult {
        let b = octets(value)?;
        if b.len() != self.octet_len() {
            tracing::debug!(target: "mib_expose::value", length = b.len(), expected = self.octet_len(), "bit mask length");
            return Err(ErrorStatus::WrongLength);
        }
        for (i, bit) in self.0.iter_mut().enumerate() {
            *bit = b[i / 8] & (0x80 >> (i % 8)) != 0;
        }
        Ok(())
    }
}
