//! Server facade over an engine

use crate::engine::ServerEngine;
use crate::router::Router;
use rpclite_core::Result;
use std::sync::Arc;

/// A server: one engine serving one router
///
/// # Examples
///
/// ```rust,no_run
/// use rpclite_server::{HttpServerEngine, Router, RpcServer};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> rpclite_core::Result<()> {
/// let server = RpcServer::new(HttpServerEngine::new(8080));
/// server.start(Arc::new(Router::new())).await?;
/// // ...
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct RpcServer {
    engine: Arc<dyn ServerEngine>,
}

impl RpcServer {
    /// Create a server that owns `engine`
    pub fn new<E: ServerEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Create a server around an engine that is also used elsewhere
    ///
    /// This is how an `InProcessEngine` serves and sends through one value.
    pub fn shared(engine: Arc<dyn ServerEngine>) -> Self {
        Self { engine }
    }

    /// Name of the underlying engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Start serving `router`
    pub async fn start(&self, router: Arc<Router>) -> Result<()> {
        tracing::info!(
            engine = %self.engine.name(),
            services = ?router.services(),
            "Starting rpc server"
        );
        self.engine.start(router).await
    }

    /// Stop serving
    pub async fn stop(&self) -> Result<()> {
        tracing::info!(engine = %self.engine.name(), "Stopping rpc server");
        self.engine.stop().await
    }
}
