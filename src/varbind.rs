//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value.

use crate::oid::OidSequence;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: OidSequence,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: OidSequence, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value, as sent in a GET request.
    pub fn null(oid: OidSequence) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_varbind_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::Integer(42));
        assert_eq!(vb.to_string(), format!("1.3.6.1 = {}", Value::Integer(42)));
    }

    #[test]
    fn test_varbind_null() {
        let vb = VarBind::null(oid!(1, 2));
        assert_eq!(vb.value, Value::Null);
    }
}
