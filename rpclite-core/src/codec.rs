//! Client-side codec for JSON-RPC messages
//!
//! Server-side decoding needs the target service's method table and lives in
//! `rpclite-server`. What remains here is the part every client needs:
//! building request envelopes from positional parameters and reading the
//! response text a server sends back.
//!
//! # Envelope Shape
//!
//! `build_request_text` follows the binding rules servers apply:
//!
//! - no params: the `params` member is omitted
//! - exactly one param: `params` is that value, unwrapped
//! - two or more: `params` is the positional array
//!
//! # Examples
//!
//! ```rust
//! use rpclite_core::{codec, Id};
//! use serde_json::json;
//!
//! let text = codec::build_request_text(Id::from(1i64), "MyTest", vec![json!("hi"), json!(3)]).unwrap();
//! assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["hi",3]}"#);
//!
//! let responses = codec::decode_responses(r#"{"jsonrpc":"2.0","id":1,"result":"hi3"}"#).unwrap();
//! assert_eq!(responses.len(), 1);
//! ```

use crate::error::{Error, Result};
use crate::types::{Id, RequestEnvelope, Response};
use serde::Serialize;
use serde_json::Value;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Collapse positional params into the `params` member of an envelope
pub fn pack_params(mut params: Vec<Value>) -> Option<Value> {
    match params.len() {
        0 => None,
        1 => params.pop(),
        _ => Some(Value::Array(params)),
    }
}

/// Build the request text for a call with positional params
pub fn build_request_text(id: Id, method: &str, params: Vec<Value>) -> Result<String> {
    let envelope = RequestEnvelope::new(method, pack_params(params), Some(id));
    encode(&envelope)
}

/// Build the text for a notification (no `id`, no response expected)
pub fn build_notification_text(method: &str, params: Vec<Value>) -> Result<String> {
    let envelope = RequestEnvelope::new(method, pack_params(params), None);
    encode(&envelope)
}

/// Decode a single response object
pub fn decode_response(data: &str) -> Result<Response> {
    serde_json::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode response text that may hold one response, a batch, or nothing
///
/// Empty text (all-notification requests) decodes to an empty list.
pub fn decode_responses(data: &str) -> Result<Vec<Response>> {
    let trimmed = data.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| Error::Serialization(e.to_string()))
    } else {
        decode_response(trimmed).map(|response| vec![response])
    }
}
