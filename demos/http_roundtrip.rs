//! HTTP round trip
//!
//! Serves a `TestService` as "ITest" on port 8080 and calls it a hundred
//! times through the HTTP client engine.
//!
//! Run with: cargo run --example http_roundtrip

use rpclite::{rpc_service, HttpClientEngine, HttpServerEngine, Router, RpcClient, RpcServer};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParamData1 {
    a: i64,
    b: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParamData2 {
    a: i64,
    b: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Summary {
    a: String,
    b: String,
    c: String,
    d: String,
}

struct TestService;

#[rpc_service]
impl TestService {
    #[rpc(name = "MyTest")]
    pub fn my_test(&self, arg1: String, arg2: i64, arg3: ParamData1, arg4: ParamData2) -> Summary {
        Summary {
            a: arg1,
            b: arg2.to_string(),
            c: format!("[{}]{}", arg3.a, arg3.b.join(",")),
            d: format!("[{}]{}", arg4.a, arg4.b),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut router = Router::new();
    router.register("ITest", TestService)?;

    let server = RpcServer::new(HttpServerEngine::new(8080));
    server.start(Arc::new(router)).await?;
    println!("Rpc server started.");

    let client = RpcClient::new(HttpClientEngine::new("http://localhost:8080")?);
    for _ in 0..100 {
        let text = client
            .send_data(
                "ITest",
                "MyTest",
                vec![
                    json!("Hello"),
                    json!(999),
                    json!({"A": 666, "B": ["你好", "世界"]}),
                    json!({"A": 555, "B": "甜蜜的世界"}),
                ],
            )
            .await?;
        println!("{}", text);
    }

    println!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    server.stop().await?;
    println!("Rpc server stopped.");
    Ok(())
}
