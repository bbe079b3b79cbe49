//! Result type for multi-varbind requests.

use crate::error::ErrorStatus;
use crate::varbind::VarBind;

/// Outcome of a request carrying several varbinds.
#[derive(Debug, Clone)]
pub struct Response {
    /// Variable bindings in the response
    pub varbinds: Vec<VarBind>,
    /// Error status (0 = no error)
    pub error_status: ErrorStatus,
    /// Error index (1-based index of problematic varbind, 0 if no error)
    pub error_index: i32,
}

impl Response {
    /// Create a successful response with the given varbinds.
    pub fn success(varbinds: Vec<VarBind>) -> Self {
        Self {
            varbinds,
            error_status: ErrorStatus::NoError,
            error_index: 0,
        }
    }

    /// Create an error response.
    pub fn error(error_status: ErrorStatus, error_index: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            varbinds,
            error_status,
            error_index,
        }
    }

    pub fn is_ok(&self) -> bool {
        !self.error_status.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    #[test]
    fn test_response_success() {
        let r = Response::success(vec![VarBind::new(oid!(1), Value::Integer(1))]);
        assert!(r.is_ok());
        assert_eq!(r.error_index, 0);
    }

    #[test]
    fn test_response_error() {
        let r = Response::error(ErrorStatus::WrongValue, 2, Vec::new());
        assert!(!r.is_ok());
        assert_eq!(r.error_index, 2);
    }
}
