//! Typed functions behind the JSON-RPC envelope.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ExecError, FunctionExporter, PrivType};
use crate::error::MgmtResult;

/// Positional parameter list of an [`RpcFunction`].
pub trait RpcArgs: Sized {
    /// Number of parameters the function takes.
    const COUNT: usize;

    /// Decode `params`, reporting the first argument that fails.
    fn decode(params: &[Value]) -> Result<Self, ExecError>;
}

impl RpcArgs for () {
    const COUNT: usize = 0;

    fn decode(params: &[Value]) -> Result<Self, ExecError> {
        if !params.is_empty() {
            return Err(ExecError::argument_count(0, params.len()));
        }
        Ok(())
    }
}

fn decode_at<T: DeserializeOwned>(params: &[Value], index: usize) -> Result<T, ExecError> {
    let value = params
        .get(index)
        .ok_or_else(|| ExecError::argument(index))?;
    T::deserialize(value).map_err(|e| {
        tracing::debug!(target: "mib_expose::rpc", index, error = %e, "argument did not decode");
        ExecError::argument(index)
    })
}

macro_rules! impl_rpc_args {
    ($count:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: DeserializeOwned),+> RpcArgs for ($($name,)+) {
            const COUNT: usize = $count;

            fn decode(params: &[Value]) -> Result<Self, ExecError> {
                // Arguments are decoded before the count is checked, so a
                // bad argument is reported by index even when extras follow.
                let args = ($(decode_at::<$name>(params, $idx)?,)+);
                if params.len() != Self::COUNT {
                    return Err(ExecError::argument_count(Self::COUNT, params.len()));
                }
                Ok(args)
            }
        }
    };
}

impl_rpc_args!(1; A: 0);
impl_rpc_args!(2; A: 0, B: 1);
impl_rpc_args!(3; A: 0, B: 1, C: 2);
impl_rpc_args!(4; A: 0, B: 1, C: 2, D: 3);

/// A management call exposed as a method.
///
/// # Example
///
/// ```
/// use mib_expose::rpc::{FunctionExporter, PrivType, Request, RpcFunction};
/// use serde_json::json;
///
/// let double = RpcFunction::new("double", "demo", PrivType::StatusRo, |(n,): (u32,)| Ok(n * 2));
/// let req = Request::parse(r#"{"id": 1, "method": "double", "params": [21]}"#).unwrap();
/// let resp = double.handle(&req, "", &|_: &str, _: PrivType| true);
/// assert_eq!(resp, json!({"id": 1, "error": null, "result": 42}));
/// ```
pub struct RpcFunction<Args, F> {
    name: &'static str,
    module: &'static str,
    priv_type: PrivType,
    f: F,
    _args: PhantomData<fn(Args)>,
}

impl<Args, R, F> RpcFunction<Args, F>
where
    Args: RpcArgs,
    R: Serialize,
    F: Fn(Args) -> MgmtResult<R> + Send + Sync,
{
    pub fn new(name: &'static str, module: &'static str, priv_type: PrivType, f: F) -> Self {
        Self {
            name,
            module,
            priv_type,
            f,
            _args: PhantomData,
        }
    }
}

impl<Args, R, F> FunctionExporter for RpcFunction<Args, F>
where
    Args: RpcArgs,
    R: Serialize,
    F: Fn(Args) -> MgmtResult<R> + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn module(&self) -> &str {
        self.module
    }

    fn priv_type(&self) -> PrivType {
        self.priv_type
    }

    fn exec(&self, params: &[Value]) -> Result<Value, ExecError> {
        let args = Args::decode(params)?;
        let out = (self.f)(args).map_err(|e| ExecError::mgmt(e, self.name))?;
        serde_json::to_value(out).map_err(|e| {
            tracing::warn!(target: "mib_expose::rpc", function = self.name, error = %e, "result did not serialize");
            ExecError::new(super::Code::InternalError)
        })
    }
}
