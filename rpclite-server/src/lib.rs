//! JSON-RPC 2.0 services, dispatch and server engines
//!
//! This crate turns ordinary Rust values into JSON-RPC services and runs
//! request text against them, independent of the transport that carries the
//! bytes.
//!
//! # Core Features
//!
//! - **Method Registry**: Typed method tables built from plain `fn(&self, ..)`
//!   operations, by hand (`ServiceBuilder`) or with `#[rpc_service]`
//! - **Request Decoding**: JSON-RPC 2.0 shape rules with the standard error codes
//! - **Dispatch**: Ordered batch execution, notification filtering and panic
//!   containment
//! - **Engines**: In-process and HTTP server engines behind one `ServerEngine` trait
//! - **Observability**: `tracing` spans and events, optional OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpclite_server::{HttpServerEngine, Router, RpcServer, RpcService, ServiceBuilder};
//! use std::sync::Arc;
//!
//! struct Test;
//!
//! impl Test {
//!     fn my_test(&self, a: String, b: i64) -> String {
//!         format!("{}{}", a, b)
//!     }
//! }
//!
//! impl RpcService for Test {
//!     fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self> {
//!         builder.method("MyTest", Test::my_test)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.register("ITest", Test)?;
//!
//!     let server = RpcServer::new(HttpServerEngine::new(8080));
//!     server.start(Arc::new(router)).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Data Flow
//!
//! An engine receives request text for a service and calls
//! `Router::dispatch`. The decoder binds each request to a method of that
//! service, the dispatcher invokes the methods in order, and the encoder
//! produces the response text the engine sends back.
//!
//! # Failure Channels
//!
//! Dispatch failures that can be expressed as JSON-RPC arrive as
//! `Error::ErrorResponse` with ready-to-send text; an unknown service or a
//! detached router is reported before any parsing and engines map it to a
//! transport-level signal.

mod decode;
mod encode;
mod engine;
mod http;
mod in_process;
mod method;
mod metrics;
mod router;
mod server;
mod service;

pub use decode::{bind_params, decode_request, decode_requests, Request};
pub use encode::encode_responses;
pub use engine::{EngineCore, ServerEngine};
pub use http::{HttpServerEngine, SERVER_NAME};
pub use in_process::InProcessEngine;
pub use method::{Method, Operation, Param, ParamType};
pub use metrics::ServerMetrics;
pub use router::Router;
pub use server::RpcServer;
pub use service::{RpcService, Service, ServiceBuilder};
