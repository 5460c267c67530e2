//! Integration tests for HashLedger API endpoints
//!
//! Each node variant's router is driven through `axum_test::TestServer`
//! and checked for status codes and JSON shapes.

use axum_test::TestServer;
use hashledger::api::{build_peer_router, build_stake_router, build_work_router};
use hashledger::config::{MiningConfig, StakingConfig};
use hashledger::node::{PeerNode, StakeNode, WorkNode};
use serde_json::{json, Value};
use std::time::Duration;

fn work_server() -> TestServer {
    let node = WorkNode::new("HashLedger PoW", "Genesis", MiningConfig::default()).expect("Failed to create node");
    TestServer::new(build_work_router(node)).expect("Failed to create test server")
}

fn stake_server() -> TestServer {
    let node = StakeNode::new("HashLedger PoS", "Genesis", &StakingConfig::default()).expect("Failed to create node");
    TestServer::new(build_stake_router(node)).expect("Failed to create test server")
}

fn peer_server(peers: Vec<String>) -> TestServer {
    let node = PeerNode::new("HashLedger P2P", "Genesis", peers).expect("Failed to create node");
    TestServer::new(build_peer_router(node)).expect("Failed to create test server")
}

#[tokio::test]
async fn test_health_on_every_variant() {
    for server in [work_server(), stake_server(), peer_server(Vec::new())] {
        let response = server.get("/health").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_work_node_endpoints() {
    tokio::time::timeout(Duration::from_secs(60), async {
        let server = work_server();

        let response = server.get("/chain").await;
        assert_eq!(response.status_code(), 200);
        let chain: Vec<Value> = response.json();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0]["height"], 0);
        assert_eq!(chain[0]["data"], "Genesis");
        assert_eq!(chain[0]["prevHash"], "");
        assert!(chain[0]["time"].is_string());

        let response = server.post("/mine").json(&json!({"data": "A", "difficulty": 8})).await;
        assert_eq!(response.status_code(), 200);
        let block: Value = response.json();
        assert_eq!(block["height"], 1);
        assert_eq!(block["difficulty"], 8);
        assert_eq!(block["prevHash"], chain[0]["hash"]);
        assert!(block["nonce"].is_number());

        let response = server.get("/info").await;
        assert_eq!(response.status_code(), 200);
        let info: Value = response.json();
        assert_eq!(info["name"], "HashLedger PoW");
        assert_eq!(info["blocks"], 2);
        assert_eq!(info["lastHash"], block["hash"]);
        assert_eq!(info["defaultDifficulty"], 18);
        assert_eq!(info["blocksMined"], 1);
    })
    .await
    .expect("test_work_node_endpoints timed out");
}

#[tokio::test]
async fn test_work_node_rejects_bad_requests() {
    let server = work_server();

    let response = server.post("/mine").json(&json!({"data": ""})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "data is required");

    let response = server.post("/mine").text("not json").await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "invalid payload");

    let response = server.post("/mine").json(&json!({"data": "x", "difficulty": "hard"})).await;
    assert_eq!(response.status_code(), 400);

    let chain: Vec<Value> = server.get("/chain").await.json();
    assert_eq!(chain.len(), 1);
}

#[tokio::test]
async fn test_stake_node_endpoints() {
    let server = stake_server();

    let response = server.post("/stake").json(&json!({"validator": " alice ", "amount": 10})).await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["validator"], "alice");
    assert_eq!(json["total"], 10);

    let response = server.post("/stake").json(&json!({"validator": "alice", "amount": 5})).await;
    let json: Value = response.json();
    assert_eq!(json["total"], 15);

    let response = server.get("/validators").await;
    assert_eq!(response.status_code(), 200);
    let validators: Value = response.json();
    assert_eq!(
        validators,
        json!([
            {"validator": "alice", "stake": 15},
            {"validator": "genesis", "stake": 1}
        ])
    );

    let response = server.post("/forge").json(&json!({"data": "X"})).await;
    assert_eq!(response.status_code(), 200);
    let block: Value = response.json();
    assert_eq!(block["height"], 1);
    assert!(["alice", "genesis"].contains(&block["validator"].as_str().unwrap_or_default()));

    let info: Value = server.get("/info").await.json();
    assert_eq!(info["name"], "HashLedger PoS");
    assert_eq!(info["blocks"], 2);
    assert_eq!(info["lastHash"], block["hash"]);
    assert_eq!(info["validators"]["alice"], 15);

    let chain: Vec<Value> = server.get("/chain").await.json();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0]["validator"], "genesis");
}

#[tokio::test]
async fn test_stake_node_rejects_bad_requests() {
    let server = stake_server();

    for body in [
        json!({"validator": "", "amount": 5}),
        json!({"validator": "bob", "amount": 0}),
        json!({"validator": "bob"}),
    ] {
        let response = server.post("/stake").json(&body).await;
        assert_eq!(response.status_code(), 400, "body {}", body);
    }

    let response = server.post("/stake").json(&json!({"validator": "bob", "amount": -1})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "invalid payload");

    let response = server.post("/forge").json(&json!({"data": "  "})).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_forge_without_stake_is_rejected() {
    let staking = StakingConfig {
        genesis_stake: 0,
        ..StakingConfig::default()
    };
    let node = StakeNode::new("HashLedger PoS", "Genesis", &staking).expect("Failed to create node");
    let server = TestServer::new(build_stake_router(node)).expect("Failed to create test server");

    let response = server.post("/forge").json(&json!({"data": "X"})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    let validators: Vec<Value> = server.get("/validators").await.json();
    assert!(validators.is_empty());
}

#[tokio::test]
async fn test_peer_node_endpoints() {
    let peers = vec!["http://localhost:8091".to_string(), "http://localhost:8092".to_string()];
    let server = peer_server(peers.clone());

    let response = server.post("/push").json(&json!({"data": "A"})).await;
    assert_eq!(response.status_code(), 200);
    let first: Value = response.json();
    assert_eq!(first["height"], 1);

    let second: Value = server.post("/push").json(&json!({"data": "B"})).await.json();
    assert_eq!(second["height"], 2);
    assert_eq!(second["prevHash"], first["hash"]);

    let chain: Vec<Value> = server.get("/chain").await.json();
    assert_eq!(chain.len(), 3);

    let listed: Vec<String> = server.get("/peers").await.json();
    assert_eq!(listed, peers);

    let info: Value = server.get("/info").await.json();
    assert_eq!(info["name"], "HashLedger P2P");
    assert_eq!(info["blocks"], 3);
    assert_eq!(info["peers"], json!(peers));

    let status: Vec<Value> = server.get("/sync/status").await.json();
    assert_eq!(status.len(), 2);
    assert_eq!(status[0]["peer"], "http://localhost:8091");
    assert_eq!(status[0]["attempts"], 0);
    assert_eq!(status[0]["unreliable"], false);

    let response = server.post("/push").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "data is required");
}
