//! Shared service fixtures for rpclite-server integration tests

#![allow(dead_code)]

use rpclite_server::{Router, RpcService, ServiceBuilder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ParamData1 {
    pub a: i64,
    pub b: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ParamData2 {
    pub a: i64,
    pub b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResultData {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

/// Service with one method per parameter shape
#[derive(Default)]
pub struct TestService {
    pub pings: AtomicUsize,
}

impl TestService {
    pub fn my_test(&self, a: String, b: i64) -> String {
        format!("{}{}", a, b)
    }

    pub fn combine(&self, arg1: String, arg2: i64, arg3: ParamData1, arg4: ParamData2) -> ResultData {
        ResultData {
            a: arg1,
            b: arg2.to_string(),
            c: format!("[{}]{}", arg3.a, arg3.b.join(",")),
            d: format!("[{}]{}", arg4.a, arg4.b),
        }
    }

    pub fn echo(&self, value: serde_json::Value) -> serde_json::Value {
        value
    }

    pub fn ping(&self) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn explode(&self) -> String {
        panic!("service operation exploded")
    }

    pub fn divide(&self, a: i64, b: i64) -> Result<i64, String> {
        if b == 0 {
            Err("division by zero".to_string())
        } else {
            Ok(a / b)
        }
    }
}

impl RpcService for TestService {
    fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self> {
        builder
            .method("MyTest", TestService::my_test)
            .method("Combine", TestService::combine)
            .method("Echo", TestService::echo)
            .method("Ping", TestService::ping)
            .method("Pings", TestService::pings)
            .method("Explode", TestService::explode)
            .fallible("Divide", TestService::divide)
    }
}

/// Router with `TestService` registered as "ITest"
pub fn test_router() -> Router {
    let mut router = Router::new();
    router.register("ITest", TestService::default()).unwrap();
    router
}

/// Router sharing `service` as "ITest"
pub fn shared_router(service: Arc<TestService>) -> Router {
    let mut router = Router::new();
    router.register_shared("ITest", service).unwrap();
    router
}
