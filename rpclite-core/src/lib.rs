//! Core JSON-RPC 2.0 types, errors and engine contracts for rpclite
//!
//! This crate provides the transport-independent foundation shared by the
//! server and client crates:
//!
//! - **Types**: Wire shapes for requests, responses and IDs
//! - **Codec**: Building request envelopes and reading response text
//! - **Error handling**: `Error` for every fallible API and the wire-level `JsonRpcErrorData`
//! - **Engine**: The `ClientEngine` contract and its request-ID source
//! - **Observability**: `tracing` loggers and OpenTelemetry setup
//!
//! # Example
//!
//! ```rust
//! use rpclite_core::{codec, Id};
//! use serde_json::json;
//!
//! let request = codec::build_request_text(Id::from(1i64), "MyTest", vec![json!("hi"), json!(3)]).unwrap();
//! assert!(request.contains(r#""params":["hi",3]"#));
//! ```

pub mod codec;
pub mod engine;
pub mod error;
pub mod observability;
pub mod types;

pub use engine::{ClientEngine, RequestIdGenerator};
pub use error::{Error, JsonRpcErrorData, Result};
pub use observability::{
    console_logger, default_logger, init_observability, shutdown_observability,
    ObservabilityConfig,
};
pub use types::{Id, RequestEnvelope, Response, ResponsePayload, JSONRPC_VERSION};
