//! rpclite - a lightweight JSON-RPC 2.0 request/response engine
//!
//! This is the convenience crate that re-exports all rpclite sub-crates. Use
//! it when one dependency should provide both client and server sides.
//!
//! # Architecture
//!
//! rpclite is organized into modular crates:
//!
//! - **rpclite-core**: Wire types, error handling, client engine contract, observability
//! - **rpclite-server**: Method registry, decoder, dispatcher, in-process and HTTP server engines
//! - **rpclite-client**: HTTP client engine and the `RpcClient` facade
//! - **rpclite-macros**: `#[rpc_service]` for deriving method tables
//!
//! # Quick Start - Server
//!
//! ```rust,no_run
//! use rpclite::{HttpServerEngine, Router, RpcServer};
//! use rpclite::rpc_service;
//! use std::sync::Arc;
//!
//! struct TestService;
//!
//! #[rpc_service]
//! impl TestService {
//!     #[rpc(name = "MyTest")]
//!     pub fn my_test(&self, a: String, b: i64) -> String {
//!         format!("{}{}", a, b)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.register("ITest", TestService)?;
//!
//!     let server = RpcServer::new(HttpServerEngine::new(8080));
//!     server.start(Arc::new(router)).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Client
//!
//! ```rust,no_run
//! use rpclite::{HttpClientEngine, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::new(HttpClientEngine::new("http://localhost:8080")?);
//!
//!     let result: String = client.call("ITest", "MyTest", ("hi", 3)).await?;
//!     println!("Result: {}", result);
//!
//!     Ok(())
//! }
//! ```

pub use rpclite_client as client;
pub use rpclite_core as core;
pub use rpclite_macros as macros;
pub use rpclite_server as server;

pub use rpclite_client::{HttpClientEngine, RpcClient};
pub use rpclite_core::{ClientEngine, Error, Result};
pub use rpclite_macros::rpc_service;
pub use rpclite_server::{
    HttpServerEngine, InProcessEngine, Router, RpcServer, RpcService, ServerEngine,
    ServiceBuilder,
};
