//! In-process engine
//!
//! One value plays both sides: started with a router it is a server engine,
//! and the same value sends requests straight into that router as a client
//! engine. Calls run on the caller's task; nothing is spawned.
//!
//! # Examples
//!
//! ```rust
//! use rpclite_core::ClientEngine;
//! use rpclite_server::{InProcessEngine, Router, ServerEngine, ServiceBuilder};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Calc;
//! impl Calc {
//!     fn add(&self, a: i64, b: i64) -> i64 { a + b }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut router = Router::new();
//! router.register_with("Calc", ServiceBuilder::new(Calc).method("Add", Calc::add)).unwrap();
//!
//! let engine = InProcessEngine::new();
//! engine.start(Arc::new(router)).await.unwrap();
//!
//! let text = engine.process_data("Calc", "Add", vec![json!(2), json!(3)]).await.unwrap();
//! assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":5}"#);
//! # }
//! ```

use crate::engine::{EngineCore, ServerEngine};
use crate::router::Router;
use async_trait::async_trait;
use rpclite_core::{ClientEngine, Error, RequestIdGenerator, Result};
use std::sync::Arc;
use tracing::Dispatch;

/// Engine that dispatches directly into a router in the same process
pub struct InProcessEngine {
    core: EngineCore,
    ids: RequestIdGenerator,
    logger: Dispatch,
}

impl InProcessEngine {
    /// Create an engine logging through the default logger
    pub fn new() -> Self {
        Self {
            core: EngineCore::new(),
            ids: RequestIdGenerator::new(),
            logger: rpclite_core::default_logger(),
        }
    }

    /// Log through `logger` instead of the default
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// True when a router is attached
    pub fn is_started(&self) -> bool {
        self.core.is_attached()
    }
}

impl Default for InProcessEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerEngine for InProcessEngine {
    fn name(&self) -> &str {
        "RpcInProcessEngine"
    }

    async fn start(&self, router: Arc<Router>) -> Result<()> {
        tracing::dispatcher::with_default(&self.logger, || {
            if self.core.attach(router).is_some() {
                tracing::warn!(engine = "RpcInProcessEngine", "Engine already started, previous router replaced");
            }
            tracing::info!(engine = "RpcInProcessEngine", "Engine started");
        });
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        tracing::dispatcher::with_default(&self.logger, || {
            self.core.detach();
            tracing::info!(engine = "RpcInProcessEngine", "Engine stopped");
        });
        Ok(())
    }
}

#[async_trait]
impl ClientEngine for InProcessEngine {
    fn name(&self) -> &str {
        "RpcInProcessEngine"
    }

    fn request_ids(&self) -> &RequestIdGenerator {
        &self.ids
    }

    /// Dispatch directly; an error response comes back as plain response text
    async fn process_string(&self, service_name: &str, request: &str) -> Result<String> {
        tracing::dispatcher::with_default(&self.logger, || {
            match self.core.dispatch(service_name, request) {
                Err(Error::ErrorResponse(text)) => Ok(text),
                other => other,
            }
        })
    }

    async fn close(&self) -> Result<()> {
        self.core.detach();
        Ok(())
    }
}
