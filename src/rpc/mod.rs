//! JSON-RPC exposition of management functions.
//!
//! Functions are registered in an [`RpcNamespace`] under dotted method
//! names (`port.config.get`). A request is routed segment by segment to a
//! [`FunctionExporter`], which checks the caller's privilege, decodes the
//! positional parameters and runs the function.
//!
//! Every failure produces the same envelope:
//!
//! ```json
//! {"id": 1, "result": null, "error": {"code": -32602, "message": "Invalid params", "data": {...}}}
//! ```
//!
//! A method the caller may not use and a method that does not exist get
//! identical answers, so the response never reveals which restricted
//! methods exist.

mod function;
mod namespace;

pub use function::{RpcArgs, RpcFunction};
pub use namespace::RpcNamespace;

use std::fmt;

use serde_json::{Map, Value, json};

use crate::error::MgmtError;

/// JSON-RPC result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Ok,
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl Code {
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.as_i32())
    }
}

/// Privilege class a function requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivType {
    ConfRo,
    ConfRw,
    StatusRo,
    StatusRw,
}

impl fmt::Display for PrivType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfRo => write!(f, "CONF_RO"),
            Self::ConfRw => write!(f, "CONF_RW"),
            Self::StatusRo => write!(f, "STATUS_RO"),
            Self::StatusRw => write!(f, "STATUS_RW"),
        }
    }
}

/// Decides whether the current caller may use a module's functions.
pub trait PrivilegeChecker {
    fn check(&self, module: &str, priv_type: PrivType) -> bool;
}

impl<F: Fn(&str, PrivType) -> bool> PrivilegeChecker for F {
    fn check(&self, module: &str, priv_type: PrivType) -> bool {
        self(module, priv_type)
    }
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: Value,
    pub method: String,
    pub params: Vec<Value>,
}

impl Request {
    /// Parse request text.
    ///
    /// Text that is not JSON is a [`Code::ParseError`]; JSON that is not a
    /// request object is a [`Code::InvalidRequest`].
    pub fn parse(text: &str) -> Result<Self, Code> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            tracing::debug!(target: "mib_expose::rpc", error = %e, "unparsable request");
            Code::ParseError
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, Code> {
        let Value::Object(mut obj) = value else {
            return Err(Code::InvalidRequest);
        };
        let method = match obj.remove("method") {
            Some(Value::String(method)) => method,
            _ => return Err(Code::InvalidRequest),
        };
        let params = match obj.remove("params") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(params)) => params,
            Some(_) => return Err(Code::InvalidRequest),
        };
        Ok(Self {
            id: obj.remove("id").unwrap_or(Value::Null),
            method,
            params,
        })
    }
}

/// Diagnostic detail attached to an error response as `error.data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Failed management call and the function that made it.
    pub mgmt_error: Option<(MgmtError, &'static str)>,
    /// Expected and actual argument counts.
    pub argument_count: Option<(usize, usize)>,
    pub failing_argument_index: Option<usize>,
    pub argument_not_found: Option<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The `data` object, or `None` when there is nothing to report.
    pub fn to_json(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let mut data = Map::new();
        if let Some((err, function)) = self.mgmt_error {
            data.insert("vtss-error-code".into(), json!(err.0));
            data.insert("vtss-failing-function-ptr".into(), json!(function));
            data.insert("vtss-failing-module".into(), json!(err.module()));
            data.insert("vtss-module-code".into(), json!(err.code()));
        }
        if let Some((expect, actual)) = self.argument_count {
            data.insert("vtss-argument-cnt-expect".into(), json!(expect));
            data.insert("vtss-argument-cnt-actual".into(), json!(actual));
        }
        if let Some(index) = self.failing_argument_index {
            data.insert("vtss-failing-argument-index".into(), json!(index));
        }
        if let Some(name) = &self.argument_not_found {
            data.insert("vtss-argument-not-found".into(), json!(name));
        }
        Some(Value::Object(data))
    }
}

/// Failure of [`FunctionExporter::exec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}")]
pub struct ExecError {
    pub code: Code,
    pub diagnostics: Diagnostics,
}

impl ExecError {
    pub fn new(code: Code) -> Self {
        Self {
            code,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn argument_count(expect: usize, actual: usize) -> Self {
        Self {
            code: Code::InvalidParams,
            diagnostics: Diagnostics {
                argument_count: Some((expect, actual)),
                ..Diagnostics::default()
            },
        }
    }

    pub fn argument(index: usize) -> Self {
        Self {
            code: Code::InvalidParams,
            diagnostics: Diagnostics {
                failing_argument_index: Some(index),
                ..Diagnostics::default()
            },
        }
    }

    pub fn argument_not_found(name: impl Into<String>) -> Self {
        Self {
            code: Code::InvalidParams,
            diagnostics: Diagnostics {
                argument_not_found: Some(name.into()),
                ..Diagnostics::default()
            },
        }
    }

    pub fn mgmt(err: MgmtError, function: &'static str) -> Self {
        Self {
            code: Code::InternalError,
            diagnostics: Diagnostics {
                mgmt_error: Some((err, function)),
                ..Diagnostics::default()
            },
        }
    }
}

/// Successful response envelope.
pub fn result_response(id: &Value, result: Value) -> Value {
    json!({ "id": id, "error": null, "result": result })
}

/// Error response envelope. `data` is omitted when `None`.
pub fn error_response(id: &Value, code: Code, data: Option<Value>) -> Value {
    error_envelope(id, code, code.message(), data)
}

/// Response for a method that is missing or not permitted.
pub fn access_denied(id: &Value) -> Value {
    error_envelope(id, Code::MethodNotFound, "Access denied", None)
}

fn error_envelope(id: &Value, code: Code, message: &str, data: Option<Value>) -> Value {
    let mut error = Map::new();
    error.insert("code".into(), json!(code.as_i32()));
    error.insert("message".into(), json!(message));
    if let Some(data) = data {
        error.insert("data".into(), data);
    }
    json!({ "id": id, "result": null, "error": Value::Object(error) })
}

/// A callable method.
pub trait FunctionExporter: Send + Sync {
    /// Last segment of the method name.
    fn name(&self) -> &str;

    /// Module whose privileges guard the function.
    fn module(&self) -> &str;

    fn priv_type(&self) -> PrivType;

    fn exec(&self, params: &[Value]) -> Result<Value, ExecError>;

    /// Answer `req`. `method_rest` is what remains of the method name after
    /// routing reached this function; anything left means no such method.
    fn handle(&self, req: &Request, method_rest: &str, checker: &dyn PrivilegeChecker) -> Value {
        if !method_rest.is_empty() {
            tracing::debug!(target: "mib_expose::rpc", method = %req.method, "unconsumed method path");
            return access_denied(&req.id);
        }
        if !checker.check(self.module(), self.priv_type()) {
            tracing::debug!(
                target: "mib_expose::rpc",
                method = %req.method,
                module = self.module(),
                priv_type = %self.priv_type(),
                "privilege check failed"
            );
            return access_denied(&req.id);
        }

        match self.exec(&req.params) {
            Ok(result) => result_response(&req.id, result),
            Err(e) => {
                tracing::debug!(target: "mib_expose::rpc", method = %req.method, error = %e, "call failed");
                error_response(&req.id, e.code, e.diagnostics.to_json())
            }
        }
    }
}
