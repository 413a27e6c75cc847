//! In-process engine
//!
//! One engine value is both the server engine and the client engine, so
//! calls never leave the process. Shows hand-built method tables, typed
//! calls, notifications and an error response.
//!
//! Run with: cargo run --example in_process

use rpclite::core::console_logger;
use rpclite::{InProcessEngine, Router, RpcClient, RpcServer, ServiceBuilder};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counter {
    value: AtomicU64,
}

impl Counter {
    fn add(&self, amount: u64) -> u64 {
        self.value.fetch_add(amount, Ordering::SeqCst) + amount
    }

    fn get(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.value.store(0, Ordering::SeqCst);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut router = Router::new();
    router.register_with(
        "Counter",
        ServiceBuilder::new(Counter::default())
            .method("Add", Counter::add)
            .method("Get", Counter::get)
            .method("Reset", Counter::reset),
    )?;

    let engine = Arc::new(InProcessEngine::new().with_logger(console_logger("debug")));
    let server = RpcServer::shared(engine.clone());
    let client = RpcClient::shared(engine);
    server.start(Arc::new(router)).await?;

    let total: u64 = client.call("Counter", "Add", (5,)).await?;
    println!("Add(5) -> {}", total);

    client.notify("Counter", "Add", vec![json!(10)]).await?;
    let total: u64 = client.call("Counter", "Get", ()).await?;
    println!("Get() after notification -> {}", total);

    let batch = r#"[
        {"jsonrpc":"2.0","id":"a","method":"Add","params":1},
        {"jsonrpc":"2.0","method":"Reset"},
        {"jsonrpc":"2.0","id":"b","method":"Get"}
    ]"#;
    println!("Batch -> {}", client.send_string("Counter", batch).await?);

    let text = client.send_data("Counter", "Multiply", vec![json!(2)]).await?;
    println!("Unknown method -> {}", text);

    server.stop().await?;
    Ok(())
}
