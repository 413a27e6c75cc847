//! Client facade over an engine

use rpclite_core::{codec, ClientEngine, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// A client: one engine, any number of services
///
/// `send_string` and `send_data` return raw response text, JSON-RPC error
/// responses included. `call` goes one step further and decodes the result
/// into a Rust type.
///
/// # Examples
///
/// ```rust,no_run
/// use rpclite_client::{HttpClientEngine, RpcClient};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> rpclite_core::Result<()> {
/// let client = RpcClient::new(HttpClientEngine::new("http://localhost:8080")?);
///
/// let text = client.send_data("ITest", "MyTest", vec![json!("hi"), json!(3)]).await?;
/// println!("{}", text);
///
/// let result: String = client.call("ITest", "MyTest", ("hi", 3)).await?;
/// assert_eq!(result, "hi3");
/// # Ok(())
/// # }
/// ```
pub struct RpcClient {
    engine: Arc<dyn ClientEngine>,
}

impl RpcClient {
    /// Create a client that owns `engine`
    pub fn new<E: ClientEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Create a client around an engine that is also used elsewhere
    pub fn shared(engine: Arc<dyn ClientEngine>) -> Self {
        Self { engine }
    }

    /// Name of the underlying engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Send raw request text and return the raw response text
    #[tracing::instrument(skip(self, request), fields(engine = %self.engine.name()))]
    pub async fn send_string(&self, service_name: &str, request: &str) -> Result<String> {
        self.engine.process_string(service_name, request).await
    }

    /// Send a call with positional params and return the raw response text
    #[tracing::instrument(skip(self, params), fields(engine = %self.engine.name(), params = params.len()))]
    pub async fn send_data(
        &self,
        service_name: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<String> {
        self.engine.process_data(service_name, method, params).await
    }

    /// Send a notification; no response is expected
    pub async fn notify(&self, service_name: &str, method: &str, params: Vec<Value>) -> Result<()> {
        let request = codec::build_notification_text(method, params)?;
        let text = self.engine.process_string(service_name, &request).await?;
        if !text.is_empty() {
            tracing::warn!(method = %method, "Notification produced a response");
        }
        Ok(())
    }

    /// Call a method and decode its result
    ///
    /// `params` is anything serializing to a JSON array (a tuple or a `Vec`)
    /// whose elements become the positional params; use `()` for none. A
    /// JSON-RPC error response becomes `Error::JsonRpc`.
    #[tracing::instrument(skip(self, params), fields(engine = %self.engine.name()))]
    pub async fn call<P, R>(&self, service_name: &str, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let params = positional(params)?;
        let text = self.send_data(service_name, method, params).await?;

        let response = codec::decode_response(&text)?;
        let value = response.into_result().map_err(|error| {
            tracing::error!(error = %error, "Call failed");
            error
        })?;

        tracing::debug!(
            duration_secs = started.elapsed().as_secs_f64(),
            "Call completed successfully"
        );
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Release the engine
    pub async fn close(&self) -> Result<()> {
        self.engine.close().await
    }
}

fn positional<P: Serialize>(params: P) -> Result<Vec<Value>> {
    match serde_json::to_value(params)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(values) => Ok(values),
        other => Err(Error::Serialization(format!(
            "Call params must serialize to an array, got {}",
            other
        ))),
    }
}
