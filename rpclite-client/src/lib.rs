//! JSON-RPC 2.0 client engines for rpclite
//!
//! # Core Features
//!
//! - **HTTP Transport**: `HttpClientEngine` posts request text with reqwest
//! - **Raw Calls**: Send request text or positional params and read the response text
//! - **Typed Calls**: `RpcClient::call` decodes results into Rust types
//! - **Any Engine**: `RpcClient` works over any `ClientEngine`, including the
//!   in-process engine from `rpclite-server`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpclite_client::{HttpClientEngine, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::new(HttpClientEngine::new("http://localhost:8080")?);
//!
//!     let greeting: String = client.call("ITest", "MyTest", ("Hello", 999)).await?;
//!     println!("{}", greeting);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Raw sends return the server's response text even when it is a JSON-RPC
//! error response. Only calls that never reach a live service fail:
//! `Error::Http` for connection problems and timeouts, `Error::HttpStatus`
//! for non-2xx answers (an unknown service is a 503).

mod client;
mod http;

pub use client::RpcClient;
pub use http::{HttpClientEngine, DEFAULT_TIMEOUT};
