//! Router dispatch integration tests

mod common;

use common::{shared_router, test_router, ParamData1, ParamData2, ResultData, TestService};
use rpclite_core::{codec, Error, Id};
use rpclite_server::{Router, ServiceBuilder};
use serde_json::{json, Value};
use std::sync::Arc;

fn error_response(result: rpclite_core::Result<String>) -> Value {
    match result {
        Err(Error::ErrorResponse(text)) => serde_json::from_str(&text).unwrap(),
        other => panic!("Expected ErrorResponse, got {:?}", other),
    }
}

#[test]
fn test_my_test_scenario() {
    let router = test_router();

    let text = router
        .dispatch(
            "ITest",
            r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["hi",3]}"#,
        )
        .unwrap();

    assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":"hi3"}"#);
}

#[test]
fn test_structured_positional_params() {
    let router = test_router();
    let request = codec::build_request_text(
        Id::from(7i64),
        "Combine",
        vec![
            json!("Hello"),
            json!(999),
            json!({"A": 666, "B": ["你好", "世界"]}),
            json!({"A": 555, "B": "甜蜜的世界"}),
        ],
    )
    .unwrap();

    let text = router.dispatch("ITest", &request).unwrap();
    let response = codec::decode_response(&text).unwrap();
    let result: ResultData = serde_json::from_value(response.into_result().unwrap()).unwrap();

    assert_eq!(
        result,
        ResultData {
            a: "Hello".into(),
            b: "999".into(),
            c: "[666]你好,世界".into(),
            d: "[555]甜蜜的世界".into(),
        }
    );
}

#[test]
fn test_struct_round_trip_through_params() {
    let router = test_router();
    let data1 = ParamData1 {
        a: 1,
        b: vec!["x".into()],
    };
    let data2 = ParamData2 {
        a: 2,
        b: "y".into(),
    };
    let request = codec::build_request_text(
        Id::String("s".into()),
        "Combine",
        vec![
            json!("a"),
            json!(0),
            serde_json::to_value(&data1).unwrap(),
            serde_json::to_value(&data2).unwrap(),
        ],
    )
    .unwrap();

    let response = codec::decode_response(&router.dispatch("ITest", &request).unwrap()).unwrap();
    assert_eq!(response.id, Id::String("s".into()));
    assert_eq!(response.result().unwrap()["C"], json!("[1]x"));
}

#[test]
fn test_batch_ordering_skips_notifications() {
    let router = test_router();
    let text = router
        .dispatch(
            "ITest",
            r#"[
                {"jsonrpc":"2.0","id":1,"method":"MyTest","params":["a",1]},
                {"jsonrpc":"2.0","method":"Ping"},
                {"jsonrpc":"2.0","id":2,"method":"MyTest","params":["b",2]}
            ]"#,
        )
        .unwrap();

    let responses = codec::decode_responses(&text).unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].id, Id::from(1i64));
    assert_eq!(responses[0].result(), Some(&json!("a1")));
    assert_eq!(responses[1].id, Id::from(2i64));
    assert_eq!(responses[1].result(), Some(&json!("b2")));
}

#[test]
fn test_notification_still_runs() {
    let service = Arc::new(TestService::default());
    let router = shared_router(Arc::clone(&service));

    let text = router
        .dispatch("ITest", r#"{"jsonrpc":"2.0","method":"Ping"}"#)
        .unwrap();

    assert_eq!(text, "");
    assert_eq!(service.pings(), 1);
}

#[test]
fn test_unit_result_is_null() {
    let text = test_router()
        .dispatch("ITest", r#"{"jsonrpc":"2.0","id":3,"method":"Ping"}"#)
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":3,"result":null}"#);
}

#[test]
fn test_numeric_ids_are_echoed_exactly() {
    let router = test_router();

    let text = router
        .dispatch(
            "ITest",
            r#"{"jsonrpc":"2.0","id":18446744073709551615,"method":"Ping"}"#,
        )
        .unwrap();
    assert_eq!(
        text,
        r#"{"jsonrpc":"2.0","id":18446744073709551615,"result":null}"#
    );

    let text = router
        .dispatch("ITest", r#"{"jsonrpc":"2.0","id":1.5,"method":"Ping"}"#)
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":1.5,"result":null}"#);
}

#[test]
fn test_unknown_method_uses_sentinel_id() {
    let body = error_response(test_router().dispatch(
        "ITest",
        r#"{"jsonrpc":"2.0","id":5,"method":"DoesNotExist","params":[]}"#,
    ));

    assert_eq!(body["id"], json!(-1));
    assert_eq!(body["error"]["code"], json!(-32601));
}

#[test]
fn test_param_shape_violations_are_invalid_params() {
    let router = test_router();
    let cases = [
        r#"{"jsonrpc":"2.0","id":1,"method":"Ping","params":5}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"Echo","params":[1,2]}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"Echo"}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["a"]}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":["a","not a number"]}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"MyTest","params":{"a":"x","b":1}}"#,
    ];

    for case in cases {
        let body = error_response(router.dispatch("ITest", case));
        assert_eq!(body["error"]["code"], json!(-32602), "case: {}", case);
        assert_eq!(body["id"], json!(-1));
    }
}

#[test]
fn test_single_structured_param() {
    let text = test_router()
        .dispatch(
            "ITest",
            r#"{"jsonrpc":"2.0","id":1,"method":"Echo","params":{"k":[1,2]}}"#,
        )
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":{"k":[1,2]}}"#);
}

#[test]
fn test_malformed_and_invalid_requests() {
    let router = test_router();

    let body = error_response(router.dispatch("ITest", "{oops"));
    assert_eq!(body["error"]["code"], json!(-32700));

    let body = error_response(router.dispatch("ITest", "[]"));
    assert_eq!(body["error"]["code"], json!(-32600));

    let body = error_response(router.dispatch("ITest", r#"{"jsonrpc":"1.0","id":1,"method":"Ping"}"#));
    assert_eq!(body["error"]["code"], json!(-32600));
}

#[test]
fn test_batch_fails_fast() {
    let service = Arc::new(TestService::default());
    let router = shared_router(Arc::clone(&service));

    let body = error_response(router.dispatch(
        "ITest",
        r#"[
            {"jsonrpc":"2.0","id":1,"method":"Ping"},
            {"jsonrpc":"2.0","id":2,"method":"MyTest","params":[1]}
        ]"#,
    ));

    assert_eq!(body["error"]["code"], json!(-32602));
    // Nothing ran: decoding fails before any invocation.
    assert_eq!(service.pings(), 0);
}

#[test]
fn test_panic_is_contained() {
    let router = test_router();

    let body = error_response(
        router.dispatch("ITest", r#"{"jsonrpc":"2.0","id":1,"method":"Explode"}"#),
    );
    assert_eq!(body["id"], json!(-1));
    assert_eq!(body["error"]["code"], json!(-32603));
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Internal JSON-RPC error."));
    assert!(message.contains("service operation exploded"));

    let text = router
        .dispatch("ITest", r#"{"jsonrpc":"2.0","id":2,"method":"MyTest","params":["x",1]}"#)
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":2,"result":"x1"}"#);
}

#[test]
fn test_fallible_error_is_internal() {
    let router = test_router();

    let text = router
        .dispatch("ITest", r#"{"jsonrpc":"2.0","id":1,"method":"Divide","params":[9,3]}"#)
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":3}"#);

    let body = error_response(
        router.dispatch("ITest", r#"{"jsonrpc":"2.0","id":1,"method":"Divide","params":[1,0]}"#),
    );
    assert_eq!(body["error"]["code"], json!(-32603));
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("division by zero"));
}

#[test]
fn test_unknown_service() {
    let result = test_router().dispatch("Missing", r#"{"jsonrpc":"2.0","id":1,"method":"Ping"}"#);
    match result {
        Err(Error::ServiceNotFound(name)) => assert_eq!(name, "Missing"),
        other => panic!("Expected ServiceNotFound, got {:?}", other),
    }
}

#[test]
fn test_registration_is_idempotent() {
    let service = Arc::new(TestService::default());
    let mut router = Router::new();

    router.register_shared("X", Arc::clone(&service)).unwrap();
    let first: Vec<String> = router
        .service("X")
        .unwrap()
        .method_names()
        .into_iter()
        .map(String::from)
        .collect();

    router.register_shared("X", Arc::clone(&service)).unwrap();
    let second: Vec<String> = router
        .service("X")
        .unwrap()
        .method_names()
        .into_iter()
        .map(String::from)
        .collect();

    assert_eq!(first, second);
    assert_eq!(router.services(), vec!["X"]);
}

#[test]
fn test_max_batch_size() {
    let mut router = Router::new().with_max_batch_size(2);
    router.register("ITest", TestService::default()).unwrap();

    let ok = router.dispatch(
        "ITest",
        r#"[{"jsonrpc":"2.0","id":1,"method":"Ping"},{"jsonrpc":"2.0","id":2,"method":"Ping"}]"#,
    );
    assert!(ok.is_ok());

    let body = error_response(router.dispatch(
        "ITest",
        r#"[{"jsonrpc":"2.0","id":1,"method":"Ping"},{"jsonrpc":"2.0","id":2,"method":"Ping"},{"jsonrpc":"2.0","id":3,"method":"Ping"}]"#,
    ));
    assert_eq!(body["error"]["code"], json!(-32600));
}

#[test]
fn test_concurrent_dispatch() {
    let service = Arc::new(TestService::default());
    let router = Arc::new(shared_router(Arc::clone(&service)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for j in 0..50 {
                    let request = format!(
                        r#"{{"jsonrpc":"2.0","id":{},"method":"MyTest","params":["t{}",{}]}}"#,
                        j, i, j
                    );
                    let text = router.dispatch("ITest", &request).unwrap();
                    assert!(text.contains(&format!("\"t{}{}\"", i, j)));
                    router
                        .dispatch("ITest", r#"{"jsonrpc":"2.0","method":"Ping"}"#)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(service.pings(), 400);
}

#[test]
fn test_hand_built_closure_service() {
    struct Prefix(String);

    let mut router = Router::new();
    router
        .register_with(
            "Prefix",
            ServiceBuilder::new(Prefix("> ".into()))
                .method("Apply", |p: &Prefix, text: String| format!("{}{}", p.0, text)),
        )
        .unwrap();

    let text = router
        .dispatch("Prefix", r#"{"jsonrpc":"2.0","id":1,"method":"Apply","params":"hi"}"#)
        .unwrap();
    assert_eq!(text, r#"{"jsonrpc":"2.0","id":1,"result":"> hi"}"#);
}
