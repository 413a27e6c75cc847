//! Client engine contract
//!
//! A client engine moves request text to a named service and brings the
//! response text back. Concrete engines (in-process, HTTP) differ only in how
//! the bytes travel; they all build request envelopes the same way.
//!
//! The matching server-side contract needs a router and lives in
//! `rpclite-server`.

use crate::codec;
use crate::error::Result;
use crate::types::Id;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of request IDs for one client engine
///
/// IDs start at 1 and increase by one per call. The counter is atomic, so
/// concurrent sends on the same engine never share an ID.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    counter: AtomicU64,
}

impl RequestIdGenerator {
    /// Create a generator whose first ID is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next ID
    pub fn next_id(&self) -> Id {
        Id::Number(self.counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1).into())
    }
}

/// Contract every client-side transport implements
#[async_trait]
pub trait ClientEngine: Send + Sync {
    /// Engine name, for diagnostics
    fn name(&self) -> &str;

    /// ID source used by `process_data`
    fn request_ids(&self) -> &RequestIdGenerator;

    /// Send raw request text to a service and return the raw response text
    ///
    /// An empty string means the server produced no response (every request
    /// was a notification).
    async fn process_string(&self, service_name: &str, request: &str) -> Result<String>;

    /// Build a request envelope from positional params and send it
    ///
    /// The envelope is `{"jsonrpc":"2.0","id":<next id>,"method":..,"params":..}`
    /// where `params` is the single value when exactly one param is given,
    /// the array otherwise, and omitted when there are none.
    async fn process_data(
        &self,
        service_name: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<String> {
        let request = codec::build_request_text(self.request_ids().next_id(), method, params)?;
        self.process_string(service_name, &request).await
    }

    /// Release whatever the engine holds
    async fn close(&self) -> Result<()>;
}
