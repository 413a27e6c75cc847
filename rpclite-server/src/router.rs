//! Service routing and request dispatch
//!
//! The router maps service names to registered services and runs request
//! text against them. It is the single place where failures are turned into
//! JSON-RPC error responses.
//!
//! # Dispatch Outcomes
//!
//! `Router::dispatch` returns:
//!
//! - `Ok(text)`: the encoded responses, or empty text when every request was
//!   a notification
//! - `Err(Error::ServiceNotFound)`: nothing was parsed; transports map this
//!   to their own failure signal
//! - `Err(Error::ErrorResponse(text))`: decoding or invocation failed and
//!   `text` is a single error response with id -1, to be delivered like any
//!   other response
//!
//! Panics raised by service code (a parameter's `Deserialize` impl, the
//! operation itself, or its result's `Serialize` impl) are caught here and
//! reported as -32603 internal errors; they never reach the transport.
//!
//! # Thread Safety
//!
//! Registration needs `&mut self` and happens before serving. Dispatch only
//! needs `&self`, so a router shared through `Arc` serves any number of
//! concurrent calls. Service instances are called without extra locking.
//!
//! # Examples
//!
//! ```rust
//! use rpclite_server::{Router, RpcService, ServiceBuilder};
//!
//! struct Test;
//!
//! impl Test {
//!     fn my_test(&self, a: String, b: i64) -> String { format!("{}{}", a, b) }
//! }
//!
//! impl RpcService for Test {
//!     fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self> {
//!         builder.method("MyTest", Test::my_test)
//!     }
//! }
//!
//! let mut router = Router::new();
//! router.register("ITest", Test).unwrap();
//!
//! let response = router
//!     .dispatch("ITest", r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["hi",3]}"#)
//!     .unwrap();
//! assert_eq!(response, r#"{"jsonrpc":"2.0","id":1,"result":"hi3"}"#);
//! ```

use crate::decode::{decode_requests, Request};
use crate::encode::encode_responses;
use crate::metrics::ServerMetrics;
use crate::service::{RpcService, Service, ServiceBuilder};
use rpclite_core::{codec, Error, Id, JsonRpcErrorData, Response, Result};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Registry of services and dispatcher for request text
#[derive(Default)]
pub struct Router {
    services: HashMap<String, Service>,
    max_batch_size: Option<usize>,
    metrics: Option<Arc<ServerMetrics>>,
}

impl Router {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject batches with more than `limit` requests
    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = Some(limit);
        self
    }

    /// Record dispatch metrics
    pub fn with_metrics(mut self, metrics: Arc<ServerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Register `instance` under `name` using its `RpcService` method table
    ///
    /// Registering a name again replaces the previous service.
    pub fn register<S: RpcService>(&mut self, name: impl Into<String>, instance: S) -> Result<()> {
        self.register_with(name, S::methods(ServiceBuilder::new(instance)))
    }

    /// Register a shared instance under `name`
    pub fn register_shared<S: RpcService>(
        &mut self,
        name: impl Into<String>,
        instance: Arc<S>,
    ) -> Result<()> {
        self.register_with(name, S::methods(ServiceBuilder::shared(instance)))
    }

    /// Register a hand-built method table under `name`
    pub fn register_with<S: Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        builder: ServiceBuilder<S>,
    ) -> Result<()> {
        let service = builder.build(name)?;
        tracing::debug!(
            service = %service.name(),
            methods = ?service.method_names(),
            "Service registered"
        );
        self.services.insert(service.name().to_string(), service);
        Ok(())
    }

    /// All registered service names, sorted
    pub fn services(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Check if a service is registered
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Run request text against the named service
    ///
    /// # Arguments
    ///
    /// * `service_name` - Name the service was registered under
    /// * `text` - Single or batch request text
    ///
    /// # Returns
    ///
    /// The encoded responses (empty for notifications only), or one of the
    /// failures listed in the module docs
    #[tracing::instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn dispatch(&self, service_name: &str, text: &str) -> Result<String> {
        let started = Instant::now();

        // Resolve the service before touching the text
        let service = match self.services.get(service_name) {
            Some(service) => service,
            None => {
                tracing::warn!("Service does not exist");
                self.record(service_name, "service_not_found", started);
                return Err(Error::ServiceNotFound(service_name.to_string()));
            }
        };

        // Run the pipeline and record how it ended
        let result = self.dispatch_to(service, text);
        let outcome = match &result {
            Ok(_) => "success",
            Err(_) => "error_response",
        };
        self.record(service_name, outcome, started);
        result
    }

    fn dispatch_to(&self, service: &Service, text: &str) -> Result<String> {
        // Param decoders, operations and result serializers are all service
        // code; one guard covers the whole pipeline.
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(service, text))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(&*payload);
                tracing::error!(panic = %message, "Service code panicked");
                Err(self.error_response(JsonRpcErrorData::internal_error(message)))
            }
        }
    }

    fn run(&self, service: &Service, text: &str) -> Result<String> {
        // Step 1: decode and bind every request; any failure answers for the
        // whole text
        let requests = decode_requests(service, text, self.max_batch_size)
            .map_err(|error| self.error_response(error))?;

        if let Some(metrics) = &self.metrics {
            metrics.record_batch(service.name(), requests.len() as u64);
        }

        // Step 2: invoke in input order, keeping responses for non-notifications
        let responses = invoke_all(service, requests).map_err(|error| {
            self.error_response(JsonRpcErrorData::internal_error(diagnostic(error)))
        })?;

        tracing::debug!(responses = responses.len(), "Dispatch completed");

        // Step 3: encode; no responses means empty text
        encode_responses(&responses)
            .map_err(|error| self.error_response(JsonRpcErrorData::internal_error(diagnostic(error))))
    }

    // Wraps an error object into the single id -1 response that travels on
    // the response-carrying failure channel.
    fn error_response(&self, error: JsonRpcErrorData) -> Error {
        tracing::warn!(code = error.code, message = %error.message, "Dispatch failed");
        if let Some(metrics) = &self.metrics {
            metrics.record_error(error.code);
        }

        match codec::encode(&Response::error(Id::sentinel(), error)) {
            Ok(text) => Error::ErrorResponse(text),
            Err(e) => Error::Internal(e.to_string()),
        }
    }

    fn record(&self, service: &str, outcome: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_dispatch(service, outcome, started.elapsed().as_secs_f64());
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("services", &self.services())
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

// Requests run sequentially, in input order.
fn invoke_all(service: &Service, requests: Vec<Request>) -> Result<Vec<Response>> {
    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        let result = service.invoke(&request.method, request.params)?;
        if let Some(id) = request.id {
            responses.push(Response::success(id, result));
        }
    }
    Ok(responses)
}

fn diagnostic(error: Error) -> String {
    match error {
        Error::Internal(msg) => msg,
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Service operation panicked.".to_string()
    }
}
