//! HTTP server engine
//!
//! Serves every registered service over plain HTTP with warp. The URL path,
//! with all `/` removed, names the service; the POST body is the request
//! text.
//!
//! # Status Codes
//!
//! | Situation                                   | Status | Body                       |
//! |---------------------------------------------|--------|----------------------------|
//! | Responses produced                          | 200    | JSON responses             |
//! | Every request was a notification            | 200    | empty                      |
//! | Decode or invocation failure                | 200    | JSON error response        |
//! | Body is not valid UTF-8                     | 200    | JSON -32700 error response |
//! | Method other than POST                      | 405    | plain-text diagnostic      |
//! | Unknown service, or engine stopped          | 503    | plain-text diagnostic      |
//! | Any other fault                             | 500    | plain-text diagnostic      |
//!
//! Every response carries `Server: RpcLite-Rust` and
//! `Access-Control-Allow-Origin: *`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rpclite_server::{HttpServerEngine, Router, ServerEngine};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = HttpServerEngine::new(8080);
//! engine.start(Arc::new(Router::new())).await.unwrap();
//! println!("listening on {:?}", engine.local_addr().await);
//! engine.stop().await.unwrap();
//! # }
//! ```

use crate::engine::{EngineCore, ServerEngine};
use crate::router::Router;
use async_trait::async_trait;
use rpclite_core::{codec, Error, Id, JsonRpcErrorData, Response as RpcResponse, Result};
use std::net::SocketAddr;
use std::str::Utf8Error;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::{JoinError, JoinHandle};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument};
use warp::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, SERVER};
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::reply::Response;
use warp::Filter;

/// Value of the `Server` header
pub const SERVER_NAME: &str = "RpcLite-Rust";

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Running {
    async fn shutdown(self) {
        // The receiver is gone only if the server already exited.
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "HTTP server task ended abnormally");
        }
    }
}

/// Engine serving a router over HTTP
pub struct HttpServerEngine {
    port: u16,
    core: Arc<EngineCore>,
    logger: Dispatch,
    running: Mutex<Option<Running>>,
}

impl HttpServerEngine {
    /// Create an engine for `0.0.0.0:<port>`; port 0 picks a free port
    pub fn new(port: u16) -> Self {
        Self {
            port,
            core: Arc::new(EngineCore::new()),
            logger: rpclite_core::default_logger(),
            running: Mutex::new(None),
        }
    }

    /// Log through `logger` instead of the default
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Port the engine was configured with
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address actually bound, while running
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|running| running.addr)
    }

    async fn shutdown_running(&self, running: &mut Option<Running>) {
        if let Some(previous) = running.take() {
            previous.shutdown().await;
            tracing::info!(engine = "RpcHttpServerEngine", "Server closed");
        }
    }
}

#[async_trait]
impl ServerEngine for HttpServerEngine {
    fn name(&self) -> &str {
        "RpcHttpServerEngine"
    }

    async fn start(&self, router: Arc<Router>) -> Result<()> {
        let logger = self.logger.clone();
        async move {
            // A second start replaces the running listener
            let mut running = self.running.lock().await;
            if running.is_some() {
                tracing::warn!("The server of engine already started, will be closed.");
                self.shutdown_running(&mut running).await;
            }

            self.core.attach(router);

            // Bind before returning so port 0 resolves to a real port
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
            let routes = routes(Arc::clone(&self.core), self.logger.clone());

            let bound = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async move {
                shutdown_rx.await.ok();
            });
            let (bound_addr, server) = match bound {
                Ok(bound) => bound,
                Err(e) => {
                    self.core.detach();
                    tracing::error!(addr = %addr, error = %e, "Failed to bind HTTP server");
                    return Err(Error::Io(e.to_string()));
                }
            };

            // Serve in the background until the shutdown signal fires
            let handle = tokio::spawn(server.with_subscriber(self.logger.clone()));
            tracing::info!(addr = %bound_addr, "Server listening");

            *running = Some(Running {
                addr: bound_addr,
                shutdown: shutdown_tx,
                handle,
            });
            Ok(())
        }
        .with_subscriber(logger)
        .await
    }

    async fn stop(&self) -> Result<()> {
        let logger = self.logger.clone();
        async move {
            let mut running = self.running.lock().await;
            self.shutdown_running(&mut running).await;
            self.core.detach();
            Ok(())
        }
        .with_subscriber(logger)
        .await
    }
}

fn routes(
    core: Arc<EngineCore>,
    logger: Dispatch,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone + Send + Sync + 'static {
    warp::method()
        .and(warp::path::full())
        .and(warp::body::bytes())
        .then(move |method: Method, path: FullPath, body: Bytes| {
            let core = Arc::clone(&core);
            let logger = logger.clone();
            let service_name = path.as_str().replace('/', "");
            let span = tracing::dispatcher::with_default(&logger, || {
                tracing::info_span!("http.request", service = %service_name, method = %method)
            });
            handle(core, logger.clone(), method, service_name, body)
                .instrument(span)
                .with_subscriber(logger)
        })
        .recover(|rejection: warp::Rejection| async move {
            Ok::<_, warp::Rejection>(reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("text/html"),
                format!("Server error: {:?}", rejection),
            ))
        })
        .unify()
}

// Serves one HTTP exchange.
//
// # Arguments
//
// * `core` - Shared dispatch state holding the router
// * `logger` - Subscriber installed around dispatch
// * `method` - HTTP method; only POST is served
// * `service_name` - Last path segment naming the target service
// * `body` - Raw request bytes
async fn handle(
    core: Arc<EngineCore>,
    logger: Dispatch,
    method: Method,
    service_name: String,
    body: Bytes,
) -> Response {
    // Only POST carries request text
    if method != Method::POST {
        tracing::debug!("Rejected non-POST request");
        return reply(
            StatusCode::METHOD_NOT_ALLOWED,
            Some("text/html"),
            format!("Invalid http-method: {}", method),
        );
    }

    // Unknown services are refused before the body is looked at
    if !core.service_exists(&service_name) {
        return unavailable(&service_name);
    }

    // Invalid UTF-8 is a parse error
    let text = match std::str::from_utf8(&body) {
        Ok(text) => text.to_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Request body is not valid UTF-8");
            return render(&service_name, Ok(invalid_body(e)));
        }
    };

    // Dispatch off the acceptor, on the blocking pool
    let name = service_name.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&logger, || core.dispatch(&name, &text))
    })
    .await;

    render(&service_name, outcome)
}

fn invalid_body(error: Utf8Error) -> Result<String> {
    let error = JsonRpcErrorData::parse_error(format!("Request body is not valid UTF-8: {}", error));
    match codec::encode(&RpcResponse::error(Id::sentinel(), error)) {
        Ok(text) => Err(Error::ErrorResponse(text)),
        Err(e) => Err(e),
    }
}

// Maps a dispatch outcome to the HTTP reply
fn render(service_name: &str, outcome: std::result::Result<Result<String>, JoinError>) -> Response {
    match outcome {
        Ok(Ok(text)) if text.is_empty() => reply(StatusCode::OK, None, String::new()),
        Ok(Ok(text)) | Ok(Err(Error::ErrorResponse(text))) => {
            reply(StatusCode::OK, Some("application/json"), text)
        }
        Ok(Err(Error::ServiceNotFound(_))) | Ok(Err(Error::RouterNotInitialized)) => {
            unavailable(service_name)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Dispatch fault");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("text/html"),
                format!("Server error: {}", e),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("text/html"),
                format!("Server error: {}", e),
            )
        }
    }
}

fn unavailable(service_name: &str) -> Response {
    tracing::warn!(service = %service_name, "Service does not exist");
    reply(
        StatusCode::SERVICE_UNAVAILABLE,
        Some("text/html"),
        Error::ServiceNotFound(service_name.to_string()).to_string(),
    )
}

fn reply(status: StatusCode, content_type: Option<&str>, body: String) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(SERVER, HeaderValue::from_static(SERVER_NAME));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if let Some(content_type) = content_type {
        if let Ok(value) = HeaderValue::from_str(&format!("{}; charset=utf-8", content_type)) {
            headers.insert(CONTENT_TYPE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_headers() {
        let response = reply(StatusCode::OK, Some("application/json"), "{}".into());

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SERVER], "RpcLite-Rust");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_empty_reply_has_no_content_type() {
        let response = reply(StatusCode::OK, None, String::new());
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_filter_rejects_get() {
        let core = Arc::new(EngineCore::new());
        core.attach(Arc::new(Router::new()));

        let response = warp::test::request()
            .method("GET")
            .path("/ITest")
            .reply(&routes(core, rpclite_core::console_logger("warn")))
            .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.body(), "Invalid http-method: GET");
    }

    #[tokio::test]
    async fn test_filter_unknown_service() {
        let core = Arc::new(EngineCore::new());
        core.attach(Arc::new(Router::new()));

        let response = warp::test::request()
            .method("POST")
            .path("/Missing/")
            .body("{}")
            .reply(&routes(core, rpclite_core::console_logger("warn")))
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body(), "Service Missing does not exist.");
    }

    async fn body_of(response: Response) -> String {
        let bytes = warp::hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_common_headers(response: &Response) {
        assert_eq!(response.headers()[SERVER], SERVER_NAME);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_render_responses() {
        let response = render("ITest", Ok(Ok(r#"{"jsonrpc":"2.0","id":1,"result":1}"#.into())));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_common_headers(&response);
    }

    #[test]
    fn test_render_empty_text() {
        let response = render("ITest", Ok(Ok(String::new())));
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_common_headers(&response);
    }

    #[test]
    fn test_render_error_response_is_ok_json() {
        let response = render(
            "ITest",
            Ok(Err(Error::ErrorResponse(
                r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32601,"message":"x"}}"#.into(),
            ))),
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_common_headers(&response);
    }

    #[tokio::test]
    async fn test_render_missing_service_and_detached_router() {
        for error in [Error::ServiceNotFound("ITest".into()), Error::RouterNotInitialized] {
            let response = render("ITest", Ok(Err(error)));
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
            assert_common_headers(&response);
            assert_eq!(body_of(response).await, "Service ITest does not exist.");
        }
    }

    #[tokio::test]
    async fn test_render_other_fault_is_server_error() {
        let response = render("ITest", Ok(Err(Error::Internal("encoder gave up".into()))));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_common_headers(&response);

        let body = body_of(response).await;
        assert!(body.starts_with("Server error: "));
        assert!(body.contains("encoder gave up"));
    }

    #[tokio::test]
    async fn test_render_failed_task_is_server_error() {
        let outcome = tokio::task::spawn_blocking(|| -> Result<String> {
            panic!("dispatch task died")
        })
        .await;
        assert!(outcome.is_err());

        let response = render("ITest", outcome);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_common_headers(&response);
        assert!(body_of(response).await.starts_with("Server error: "));
    }

    #[tokio::test]
    async fn test_filter_rejects_invalid_utf8() {
        struct Sink;
        let mut router = Router::new();
        router
            .register_with(
                "Sink",
                crate::service::ServiceBuilder::new(Sink)
                    .method("Take", |_: &Sink, text: String| text),
            )
            .unwrap();

        let core = Arc::new(EngineCore::new());
        core.attach(Arc::new(router));

        let mut body = br#"{"jsonrpc":"2.0","id":1,"method":"Take","params":""#.to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(br#""}"#);

        let response = warp::test::request()
            .method("POST")
            .path("/Sink")
            .body(body)
            .reply(&routes(core, rpclite_core::console_logger("warn")))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(json["id"], serde_json::json!(-1));
        assert_eq!(json["error"]["code"], serde_json::json!(-32700));
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let engine = HttpServerEngine::new(0);
        engine.stop().await.unwrap();
        assert!(engine.local_addr().await.is_none());
    }
}
