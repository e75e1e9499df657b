//! JSON-RPC helpers.

use crate::{error, rpc, Error};
use serde::de::DeserializeOwned;

/// Takes any type which is deserializable from rpc::Value and such a value and
/// yields the deserialized value
pub fn decode<T: DeserializeOwned>(value: rpc::Value) -> error::Result<T> {
    serde_json::from_value(value).map_err(Into::into)
}

/// Serialize a type. Panics if the type is returns error during serialization.
pub fn serialize<T: serde::Serialize>(t: &T) -> rpc::Value {
    serde_json::to_value(t).expect("Types never fail to serialize.")
}

/// Parse positional parameters of a method taking `arity` arguments.
///
/// Missing trailing arguments are passed as `null`, so optional parameters
/// can be omitted by the caller.
pub fn parse_params<T: DeserializeOwned>(params: rpc::Params, arity: usize) -> error::Result<T> {
    let mut values = match params {
        rpc::Params::Array(values) => values,
        rpc::Params::None => vec![],
        rpc::Params::Map(_) => return Err(Error::Input("expected positional parameters".into())),
    };
    if values.len() > arity {
        return Err(Error::Input(format!(
            "too many parameters, want at most {}, got {}",
            arity,
            values.len()
        )));
    }
    values.resize(arity, rpc::Value::Null);
    decode(rpc::Value::Array(values))
}

/// Build a JSON-RPC request.
pub fn build_request(id: usize, method: &str, params: Vec<rpc::Value>) -> rpc::Call {
    rpc::Call::MethodCall(rpc::MethodCall {
        jsonrpc: Some(rpc::Version::V2),
        method: method.into(),
        params: rpc::Params::Array(params),
        id: rpc::Id::Num(id as u64),
    })
}

/// Parse a JSON-RPC response string.
pub fn to_response_from_str(response: &str) -> error::Result<rpc::Response> {
    serde_json::from_str(response).map_err(|e| Error::Encoding(format!("invalid response: {}", e)))
}

/// Parse `rpc::Output` into `Result`.
pub fn to_result_from_output(output: rpc::Output) -> error::Result<rpc::Value> {
    match output {
        rpc::Output::Success(success) => Ok(success.result),
        rpc::Output::Failure(failure) => Err(error::Error::Rpc(failure.error)),
    }
}
