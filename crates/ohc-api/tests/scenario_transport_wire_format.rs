//! Wire format of the two actions against a mock OnlineHashCrack endpoint.

use httpmock::prelude::*;
use ohc_api::{OhcClient, OhcClientOptions};
use ohc_execution::{RemoteService, SubmitBatch, WritePermit};
use ohc_reconcile::Canonicalizer;
use serde_json::json;

fn client_for(server: &MockServer) -> OhcClient {
    OhcClient::new(
        "sk_test_wire_key".to_string(),
        OhcClientOptions {
            base_url: server.url("/v2"),
            ..OhcClientOptions::default()
        },
    )
    .unwrap()
}

fn batch(hashes: &[&str]) -> SubmitBatch {
    let c = Canonicalizer::default();
    SubmitBatch::for_test(hashes.iter().filter_map(|h| c.canonicalize(h)).collect())
}

#[test]
fn list_tasks_posts_action_with_terms_flag() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .header("content-type", "application/json")
            .json_body(json!({
                "api_key": "sk_test_wire_key",
                "agree_terms": "yes",
                "action": "list_tasks"
            }));
        then.status(200)
            .json_body(json!({"success": true, "tasks": [{"hash": "h1"}]}));
    });

    let reply = client_for(&server).list_tasks().unwrap();
    m.assert();
    assert_eq!(reply.http_status, 200);
    assert!(reply.is_accepted());
    assert_eq!(reply.body["tasks"][0]["hash"], "h1");
}

#[test]
fn upload_posts_hashes_in_order_with_algo_mode() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/v2").json_body(json!({
            "api_key": "sk_test_wire_key",
            "agree_terms": "yes",
            "algo_mode": 22000,
            "hashes": ["WPA*02*c", "WPA*02*a", "WPA*02*b"]
        }));
        then.status(200).json_body(json!({"success": true, "message": "3 tasks created"}));
    });

    let reply = client_for(&server)
        .upload_hashes(
            batch(&["WPA*02*c", "WPA*02*a", "WPA*02*b"]),
            WritePermit::for_test(),
        )
        .unwrap();
    m.assert();
    assert!(reply.is_accepted());
}

#[test]
fn custom_algo_mode_is_sent() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .json_body_partial(r#"{"algo_mode": 2500}"#);
        then.status(200).json_body(json!({"success": true}));
    });

    let client = OhcClient::new(
        "sk_test_wire_key".to_string(),
        OhcClientOptions {
            base_url: server.url("/v2"),
            algo_mode: 2500,
            ..OhcClientOptions::default()
        },
    )
    .unwrap();
    client
        .upload_hashes(batch(&["x"]), WritePermit::for_test())
        .unwrap();
    m.assert();
}
