//! Error types for rpclite
//!
//! Two layers of errors live here:
//!
//! - **Error**: Application-level errors returned by every fallible rpclite API
//! - **JsonRpcErrorData**: The wire-format error object defined by JSON-RPC 2.0
//!
//! # Failure Channels
//!
//! `Error` separates three kinds of dispatch failure that transports must
//! render differently:
//!
//! - `Error::ErrorResponse` carries a fully encoded JSON-RPC error response.
//!   Transports hand its text to the caller as a normal response body.
//! - `Error::ServiceNotFound` and `Error::RouterNotInitialized` happen before
//!   any JSON-RPC message is parsed. Transports map them to their own failure
//!   signal (an HTTP 503, for example).
//! - Everything else is a transport or local fault.
//!
//! # Standard Error Codes
//!
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (not a valid request object)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! # Examples
//!
//! ```rust
//! use rpclite_core::{Error, JsonRpcErrorData};
//!
//! let error = Error::ServiceNotFound("ITest".into());
//! assert_eq!(error.to_string(), "Service ITest does not exist.");
//!
//! let json_error = JsonRpcErrorData::method_not_found("unknownMethod");
//! assert_eq!(json_error.code, -32601);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code for invalid JSON text
pub const PARSE_ERROR: i32 = -32700;
/// Code for JSON that is not a valid request object
pub const INVALID_REQUEST: i32 = -32600;
/// Code for an unknown method
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Code for parameters that do not match the method's declaration
pub const INVALID_PARAMS: i32 = -32602;
/// Code for unexpected failures while dispatching
pub const INTERNAL_ERROR: i32 = -32603;

/// Result type for rpclite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for rpclite operations
///
/// # Error Categories
///
/// - **Dispatch boundary**: ServiceNotFound, RouterNotInitialized, ErrorResponse
/// - **Protocol errors**: JsonRpc (an error object received from a peer)
/// - **Registration errors**: Registration
/// - **Transport errors**: Http, HttpStatus, Io
/// - **Processing errors**: Serialization, Internal
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// JSON-RPC error object received from a remote peer
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] JsonRpcErrorData),

    /// The dispatch failed but produced a well-formed JSON-RPC error response
    ///
    /// The payload is the encoded response text. Transports must deliver it
    /// to the caller as a regular response body.
    #[error("RpcErrors:{0}")]
    ErrorResponse(String),

    /// No service is registered under the requested name
    #[error("Service {0} does not exist.")]
    ServiceNotFound(String),

    /// The engine has no router attached (never started, or stopped)
    #[error("The rpc router has not been initialized.")]
    RouterNotInitialized,

    /// A service could not be registered
    ///
    /// This is a programming mistake in the service definition and is
    /// detected once, at startup.
    #[error("Registration error: {0}")]
    Registration(String),

    /// Serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP transport failure (connection refused, unknown host, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The HTTP peer answered with a non-success status
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// Response body, usually a plain-text diagnostic
        body: String,
    },

    /// Input/output error
    #[error("IO error: {0}")]
    Io(String),

    /// Unexpected local failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// JSON-RPC 2.0 error object
///
/// This is the exact wire format that appears in the `error` member of a
/// response: `{"code": <int>, "message": <string>}` with an optional `data`
/// member.
///
/// # Examples
///
/// ```rust
/// use rpclite_core::JsonRpcErrorData;
/// use serde_json::json;
///
/// let error = JsonRpcErrorData::invalid_params("param count should be 2");
/// assert_eq!(error.code, -32602);
///
/// let custom = JsonRpcErrorData::with_data(
///     1001,
///     "Insufficient funds",
///     json!({"balance": 50, "required": 100})
/// );
/// assert!(custom.data.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Optional additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcErrorData {
    /// Create a new JSON-RPC error with code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a new JSON-RPC error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a parse error (-32700)
    ///
    /// # Arguments
    ///
    /// * `detail` - The parser's diagnostic
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(
            PARSE_ERROR,
            format!(
                "Invalid JSON was received by the server. An error occurred on the server while parsing the JSON text.\n{}",
                detail
            ),
        )
    }

    /// Create an invalid request error (-32600)
    ///
    /// # Arguments
    ///
    /// * `msg` - Specific reason why the request object is invalid
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(
            INVALID_REQUEST,
            format!("The JSON sent is not a valid Request object.\n{}", msg.into()),
        )
    }

    /// Create a method not found error (-32601)
    ///
    /// ```rust
    /// use rpclite_core::JsonRpcErrorData;
    ///
    /// let error = JsonRpcErrorData::method_not_found("calculateFoo");
    /// assert_eq!(error.message, "Method not found: calculateFoo");
    /// ```
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", method.into()),
        )
    }

    /// Create an invalid params error (-32602)
    ///
    /// Used for every parameter-shape violation: wrong arity, array where a
    /// single value is declared, or a value that does not decode into the
    /// declared type.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(
            INVALID_PARAMS,
            format!("Invalid method parameter(s).\n{}", msg.into()),
        )
    }

    /// Create an internal error (-32603)
    ///
    /// # Arguments
    ///
    /// * `msg` - Diagnostic describing the unexpected failure
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(
            INTERNAL_ERROR,
            format!("Internal JSON-RPC error.\n{}", msg.into()),
        )
    }

    /// Create a batch size exceeded error (-32600)
    pub fn batch_size_exceeded(limit: usize, actual: usize) -> Self {
        Self::invalid_request(format!(
            "Batch size limit exceeded: limit={}, actual={}",
            limit, actual
        ))
    }
}

impl std::fmt::Display for JsonRpcErrorData {
    /// Formats as "[code] message", e.g. "[-32601] Method not found: foo"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorData {}
