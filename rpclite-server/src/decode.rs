//! Request decoding and parameter binding
//!
//! Turns raw request text into validated requests whose parameters are
//! already decoded into the types the target method declares. Every shape
//! violation is reported as a `JsonRpcErrorData` with the matching standard
//! code:
//!
//! | Violation                                         | Code   |
//! |---------------------------------------------------|--------|
//! | Text is not valid JSON                            | -32700 |
//! | Not a request object, bad `jsonrpc`/`id`, empty or oversized batch | -32600 |
//! | Unknown method                                    | -32601 |
//! | `params` shape or value does not fit the method   | -32602 |
//!
//! # Binding Rules
//!
//! With `n` declared parameters:
//!
//! - `n == 0`: `params` absent or `null`
//! - `n == 1`: `params` present and not an array; the value is decoded into
//!   the declared type (`null` included)
//! - `n > 1`: `params` an array of exactly `n` values, decoded positionally
//!
//! A failure in any element of a batch fails the whole decode.

use crate::method::{Method, Param, ParamType};
use crate::service::Service;
use rpclite_core::{Id, JsonRpcErrorData, RequestEnvelope, JSONRPC_VERSION};
use serde_json::Value;

/// A validated request bound to a method of one service
pub struct Request {
    /// Request ID; `None` marks a notification
    pub id: Option<Id>,
    /// Name of the target method, known to exist in the service
    pub method: String,
    /// Parameters decoded into the method's declared types, in order
    pub params: Vec<Param>,
}

impl Request {
    /// A request without an ID gets no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("params", &self.params.len())
            .finish()
    }
}

/// Decode single or batch request text against `service`
///
/// Text whose first non-whitespace character is `[` is a batch.
///
/// # Arguments
///
/// * `service` - Service whose method table the requests are bound to
/// * `text` - Raw request text as received by the engine
/// * `max_batch_size` - Largest accepted batch; `None` leaves batches unbounded
pub fn decode_requests(
    service: &Service,
    text: &str,
    max_batch_size: Option<usize>,
) -> Result<Vec<Request>, JsonRpcErrorData> {
    let trimmed = text.trim_start();
    let value: Value = serde_json::from_str(trimmed).map_err(JsonRpcErrorData::parse_error)?;

    match value {
        // Batch: reject empty and oversized arrays, then decode in order and
        // stop at the first bad element
        Value::Array(items) => {
            if items.is_empty() {
                return Err(JsonRpcErrorData::invalid_request("Batch cannot be empty"));
            }
            if let Some(limit) = max_batch_size {
                if items.len() > limit {
                    return Err(JsonRpcErrorData::batch_size_exceeded(limit, items.len()));
                }
            }
            items
                .into_iter()
                .map(|item| decode_request(service, item))
                .collect()
        }
        single => decode_request(service, single).map(|request| vec![request]),
    }
}

/// Decode one request object
pub fn decode_request(service: &Service, value: Value) -> Result<Request, JsonRpcErrorData> {
    if !value.is_object() {
        return Err(JsonRpcErrorData::invalid_request(
            "A request must be a JSON object.",
        ));
    }

    let envelope: RequestEnvelope = serde_json::from_value(value)
        .map_err(|e| JsonRpcErrorData::invalid_request(e.to_string()))?;

    if envelope.jsonrpc != JSONRPC_VERSION {
        return Err(JsonRpcErrorData::invalid_request(format!(
            "Unsupported jsonrpc version \"{}\".",
            envelope.jsonrpc
        )));
    }

    let method = service
        .method(&envelope.method)
        .ok_or_else(|| JsonRpcErrorData::method_not_found(&envelope.method))?;

    let params = bind_params(method, envelope.params)?;

    Ok(Request {
        id: envelope.id,
        method: envelope.method,
        params,
    })
}

/// Bind raw `params` to the declared parameter types of `method`
///
/// # Arguments
///
/// * `method` - Method whose declared parameter types drive decoding
/// * `params` - The request's `params` member; `None` when absent
pub fn bind_params(method: &Method, params: Option<Value>) -> Result<Vec<Param>, JsonRpcErrorData> {
    let types = method.param_types();

    match (types, params) {
        // No declared params: nothing or null
        ([], None) | ([], Some(Value::Null)) => Ok(Vec::new()),
        ([], Some(_)) => Err(JsonRpcErrorData::invalid_params(format!(
            "The param count of method {} should be 0.",
            method.name()
        ))),
        // One declared param: any present value except a positional array
        ([_], None) => Err(JsonRpcErrorData::invalid_params(format!(
            "The param count of method {} should be 1.",
            method.name()
        ))),
        ([_], Some(Value::Array(_))) => Err(JsonRpcErrorData::invalid_params(format!(
            "Method {} takes a single structured parameter, not a positional array.",
            method.name()
        ))),
        ([ty], Some(value)) => Ok(vec![decode_param(method, 0, ty, value)?]),
        // Several declared params: an array of exactly that length, decoded
        // position by position
        (types, Some(Value::Array(values))) => {
            if values.len() != types.len() {
                return Err(JsonRpcErrorData::invalid_params(format!(
                    "The param count of method {} should be {}, got {}.",
                    method.name(),
                    types.len(),
                    values.len()
                )));
            }
            types
                .iter()
                .zip(values)
                .enumerate()
                .map(|(index, (ty, value))| decode_param(method, index, ty, value))
                .collect()
        }
        (types, _) => Err(JsonRpcErrorData::invalid_params(format!(
            "The params of method {} should be an array of {} values.",
            method.name(),
            types.len()
        ))),
    }
}

fn decode_param(
    method: &Method,
    index: usize,
    ty: &ParamType,
    value: Value,
) -> Result<Param, JsonRpcErrorData> {
    ty.decode(value).map_err(|e| {
        JsonRpcErrorData::invalid_params(format!(
            "Parameter {} of method {} is not a valid {}: {}",
            index,
            method.name(),
            ty.name(),
            e
        ))
    })
}
