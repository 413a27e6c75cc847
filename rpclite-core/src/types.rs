//! JSON-RPC 2.0 wire types
//!
//! These are the shapes that cross the wire. They know nothing about services
//! or methods: typed parameter binding happens in `rpclite-server`, which
//! decodes a `RequestEnvelope` against a registered method.
//!
//! # Request IDs
//!
//! An ID is a string or any JSON number. Numbers are kept as
//! `serde_json::Number`, so fractional and unsigned 64-bit IDs are echoed back
//! exactly as they arrived. A request whose `id` is absent or `null` is a
//! notification and never gets a response. Protocol-level errors that cannot
//! be tied to a single request use the sentinel `Id::sentinel()` (`-1`).

use crate::error::{Error, JsonRpcErrorData, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Protocol version carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request ID
///
/// Serialized untagged, so `Id::from(1i64)` is `1` and `Id::from("a")` is
/// `"a"` on the wire.
///
/// # Examples
///
/// ```rust
/// use rpclite_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
/// let id3: Id = serde_json::from_str("1.5").unwrap();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// assert_eq!(id3.to_string(), "1.5");
/// assert_eq!(Id::sentinel(), Id::from(-1i64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier, integral or not
    Number(Number),
    /// Explicit null identifier
    Null,
}

impl Id {
    /// ID used for error responses that are not tied to one request
    pub fn sentinel() -> Id {
        Id::Number(Number::from(-1))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(Number::from(n))
    }
}

impl From<Number> for Id {
    fn from(n: Number) -> Self {
        Id::Number(n)
    }
}

/// A request object exactly as it appears on the wire
///
/// `params` is kept as raw JSON; an explicit `"params": null` is preserved as
/// `Some(Value::Null)` so that it can be told apart from a missing member.
///
/// # Examples
///
/// ```rust
/// use rpclite_core::{Id, RequestEnvelope};
/// use serde_json::json;
///
/// let req = RequestEnvelope::new("MyTest", Some(json!(["hi", 3])), Some(Id::from(1)));
/// assert!(!req.is_notification());
///
/// let text = serde_json::to_string(&req).unwrap();
/// assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["hi",3]}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Protocol version, must be "2.0"
    pub jsonrpc: String,
    /// Request ID; `None` marks a notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Name of the method to invoke
    pub method: String,
    /// Raw parameters
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub params: Option<Value>,
}

impl RequestEnvelope {
    /// Create a new request envelope with `jsonrpc` set to "2.0"
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// A request without an ID expects no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

// A member that is present maps to Some, even when its value is null.
// Missing members fall back to the field default (None).
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Result or error carried by a response
///
/// Flattened into `Response`, so it contributes either a `result` member or
/// an `error` member, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Successful result (`null` for operations without a return value)
    Result(Value),
    /// Error object
    Error(JsonRpcErrorData),
}

/// JSON-RPC 2.0 response message
///
/// # Examples
///
/// ```rust
/// use rpclite_core::{Id, Response};
/// use serde_json::json;
///
/// let response = Response::success(Id::from(1), json!("hi3"));
/// let text = serde_json::to_string(&response).unwrap();
/// assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":"hi3"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// ID of the request this answers, or `Id::sentinel()`
    pub id: Id,
    /// Result or error
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl Response {
    /// Create a successful response
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    /// Create an error response
    pub fn error(id: Id, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Error(error),
        }
    }

    /// True when the response carries an error object
    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }

    /// The result value, if this is a success response
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    /// The error object, if this is an error response
    pub fn error_data(&self) -> Option<&JsonRpcErrorData> {
        match &self.payload {
            ResponsePayload::Result(_) => None,
            ResponsePayload::Error(error) => Some(error),
        }
    }

    /// Convert into the result value, turning an error object into `Error::JsonRpc`
    pub fn into_result(self) -> Result<Value> {
        match self.payload {
            ResponsePayload::Result(value) => Ok(value),
            ResponsePayload::Error(error) => Err(Error::JsonRpc(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_forms() {
        let id: Id = serde_json::from_str("7").unwrap();
        assert_eq!(id, Id::from(7));

        let id: Id = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id, Id::String("abc".into()));

        assert!(serde_json::from_str::<Id>("{}").is_err());
        assert!(serde_json::from_str::<Id>("[1]").is_err());
    }

    #[test]
    fn test_any_json_number_round_trips() {
        for text in ["1.5", "18446744073709551615", "-9223372036854775808", "2.5e-3"] {
            let id: Id = serde_json::from_str(text).unwrap();
            assert!(matches!(id, Id::Number(_)), "{}", text);

            let back: Id = serde_json::from_str(&serde_json::to_string(&id).unwrap()).unwrap();
            assert_eq!(back, id);
        }

        let id: Id = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(id, Id::Number(Number::from(u64::MAX)));
        assert_eq!(serde_json::to_string(&id).unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_absent_and_null_id_are_notifications() {
        let absent: RequestEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"Ping"}"#).unwrap();
        let null: RequestEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"Ping"}"#).unwrap();

        assert!(absent.is_notification());
        assert!(null.is_notification());
    }

    #[test]
    fn test_params_null_is_distinct_from_absent() {
        let absent: RequestEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"Ping"}"#).unwrap();
        let null: RequestEnvelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"Ping","params":null}"#)
                .unwrap();

        assert_eq!(absent.params, None);
        assert_eq!(null.params, Some(Value::Null));
    }

    #[test]
    fn test_missing_method_is_rejected() {
        let result = serde_json::from_str::<RequestEnvelope>(r#"{"jsonrpc":"2.0","id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_notification_serialization_omits_id() {
        let notif = RequestEnvelope::new("Log", Some(json!("line")), None);
        let text = serde_json::to_string(&notif).unwrap();

        assert_eq!(text, r#"{"jsonrpc":"2.0","method":"Log","params":"line"}"#);
    }

    #[test]
    fn test_error_response_wire_format() {
        let response = Response::error(Id::sentinel(), JsonRpcErrorData::new(-32601, "nope"));
        let text = serde_json::to_string(&response).unwrap();

        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32601,"message":"nope"}}"#
        );
    }

    #[test]
    fn test_null_result_survives_parsing() {
        let response: Response =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap();

        assert!(!response.is_error());
        assert_eq!(response.result(), Some(&Value::Null));
    }

    #[test]
    fn test_into_result_maps_error_object() {
        let response: Response = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32603,"message":"boom"}}"#,
        )
        .unwrap();

        match response.into_result() {
            Err(Error::JsonRpc(data)) => assert_eq!(data.code, -32603),
            other => panic!("Expected JsonRpc error, got {:?}", other),
        }
    }
}
