//! Server engine contract
//!
//! A server engine is a transport: it receives request text for a named
//! service, hands it to the router and delivers whatever comes back. Engines
//! hold the router they were started with in an `EngineCore`, which detaches
//! it again on stop.

use crate::router::Router;
use async_trait::async_trait;
use rpclite_core::{Error, Result};
use std::sync::{Arc, RwLock};

/// Contract every server-side transport implements
///
/// At most one start is active per engine. Starting an engine that is
/// already running stops the previous instance first.
#[async_trait]
pub trait ServerEngine: Send + Sync {
    /// Engine name, for diagnostics
    fn name(&self) -> &str;

    /// Attach `router` and begin serving
    async fn start(&self, router: Arc<Router>) -> Result<()>;

    /// Stop serving and detach the router
    async fn stop(&self) -> Result<()>;
}

/// Router slot shared by engine implementations
#[derive(Debug, Default)]
pub struct EngineCore {
    router: RwLock<Option<Arc<Router>>>,
}

impl EngineCore {
    /// Create a core with no router attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a router, returning the one it replaces
    pub fn attach(&self, router: Arc<Router>) -> Option<Arc<Router>> {
        let mut slot = self.router.write().unwrap_or_else(|e| e.into_inner());
        slot.replace(router)
    }

    /// Detach the router, returning it if one was attached
    pub fn detach(&self) -> Option<Arc<Router>> {
        let mut slot = self.router.write().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }

    /// The attached router
    pub fn router(&self) -> Result<Arc<Router>> {
        let slot = self.router.read().unwrap_or_else(|e| e.into_inner());
        slot.clone().ok_or(Error::RouterNotInitialized)
    }

    /// True when a router is attached
    pub fn is_attached(&self) -> bool {
        self.router().is_ok()
    }

    /// True when the attached router has a service named `name`
    pub fn service_exists(&self, name: &str) -> bool {
        self.router()
            .map(|router| router.has_service(name))
            .unwrap_or(false)
    }

    /// Dispatch through the attached router
    ///
    /// Fails with `Error::RouterNotInitialized` when no router is attached.
    pub fn dispatch(&self, service_name: &str, text: &str) -> Result<String> {
        self.router()?.dispatch(service_name, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_core() {
        let core = EngineCore::new();

        assert!(!core.is_attached());
        assert!(!core.service_exists("ITest"));
        assert!(matches!(
            core.dispatch("ITest", "{}"),
            Err(Error::RouterNotInitialized)
        ));
    }

    #[test]
    fn test_attach_and_detach() {
        let core = EngineCore::new();

        assert!(core.attach(Arc::new(Router::new())).is_none());
        assert!(core.is_attached());
        assert!(core.attach(Arc::new(Router::new())).is_some());

        assert!(core.detach().is_some());
        assert!(core.detach().is_none());
        assert!(matches!(core.router(), Err(Error::RouterNotInitialized)));
    }

    #[test]
    fn test_unknown_service_passes_through() {
        let core = EngineCore::new();
        core.attach(Arc::new(Router::new()));

        assert!(matches!(
            core.dispatch("Missing", "{}"),
            Err(Error::ServiceNotFound(_))
        ));
    }
}
