//! Synchronization between two peer nodes over real HTTP

use hashledger::api::build_peer_router;
use hashledger::blockchain::is_chain_valid;
use hashledger::node::PeerNode;
use hashledger::sync::{HttpPeerClient, PeerOutcome};
use std::time::Duration;
use tokio::net::TcpListener;

async fn serve(node: PeerNode) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, build_peer_router(node)).await.expect("Server failed");
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_follower_adopts_longer_remote_chain() {
    tokio::time::timeout(Duration::from_secs(20), async {
        // Both nodes share the genesis payload but not its timestamp; the
        // follower adopts the remote chain wholesale, genesis included.
        let remote = PeerNode::new("remote", "Genesis", Vec::new()).unwrap();
        for data in ["a", "b", "c", "d"] {
            remote.push(data).await.unwrap();
        }
        let url = serve(remote.clone()).await;

        let local = PeerNode::new("local", "Genesis", vec![url.clone()]).unwrap();
        local.push("local-only").await.unwrap();

        let client = HttpPeerClient::new(Duration::from_secs(3)).unwrap();
        let outcomes = local.synchronizer(client, Duration::from_secs(5)).sync_once().await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].1,
            PeerOutcome::Adopted {
                previous_len: 2,
                new_len: 5
            }
        );

        let chain = local.chain();
        let chain = chain.read().await;
        assert!(is_chain_valid(chain.blocks()));
        let remote_blocks: Vec<_> = remote.list_chain().await.into_iter().map(|v| v.into_block()).collect();
        assert_eq!(chain.blocks(), remote_blocks.as_slice());

        let status = local.sync_status().await;
        assert_eq!(status[0].adoptions, 1);
    })
    .await
    .expect("test_follower_adopts_longer_remote_chain timed out");
}

#[tokio::test]
async fn test_unreachable_peer_is_discarded() {
    tokio::time::timeout(Duration::from_secs(20), async {
        let closed = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let local = PeerNode::new("local", "Genesis", vec![closed]).unwrap();
        let client = HttpPeerClient::new(Duration::from_secs(1)).unwrap();
        let outcomes = local.synchronizer(client, Duration::from_secs(5)).sync_once().await;

        assert!(matches!(outcomes[0].1, PeerOutcome::Discarded { .. }));
        assert_eq!(local.list_chain().await.len(), 1);
        assert_eq!(local.sync_status().await[0].consecutive_failures, 1);
    })
    .await
    .expect("test_unreachable_peer_is_discarded timed out");
}

#[tokio::test]
async fn test_shorter_remote_is_ignored() {
    tokio::time::timeout(Duration::from_secs(20), async {
        let remote = PeerNode::new("remote", "Genesis", Vec::new()).unwrap();
        let url = serve(remote).await;

        let local = PeerNode::new("local", "Genesis", vec![url]).unwrap();
        local.push("x").await.unwrap();
        let before = local.list_chain().await;

        let client = HttpPeerClient::new(Duration::from_secs(3)).unwrap();
        let outcomes = local.synchronizer(client, Duration::from_secs(5)).sync_once().await;

        assert_eq!(
            outcomes[0].1,
            PeerOutcome::Kept {
                local_len: 2,
                remote_len: 1
            }
        );
        let after = local.list_chain().await;
        assert_eq!(
            before.into_iter().map(|v| v.into_block()).collect::<Vec<_>>(),
            after.into_iter().map(|v| v.into_block()).collect::<Vec<_>>()
        );
    })
    .await
    .expect("test_shorter_remote_is_ignored timed out");
}

#[tokio::test]
async fn test_oversized_peer_body_is_discarded() {
    tokio::time::timeout(Duration::from_secs(20), async {
        let remote = PeerNode::new("remote", "Genesis", Vec::new()).unwrap();
        for data in ["a", "b", "c"] {
            remote.push(data).await.unwrap();
        }
        let url = serve(remote).await;

        let local = PeerNode::new("local", "Genesis", vec![url]).unwrap();
        let client = HttpPeerClient::new(Duration::from_secs(3)).unwrap().with_body_limit(128);
        let outcomes = local.synchronizer(client, Duration::from_secs(5)).sync_once().await;

        match &outcomes[0].1 {
            PeerOutcome::Discarded { reason } => assert!(reason.contains("exceeds"), "reason {}", reason),
            other => panic!("expected discard, got {:?}", other),
        }
        assert_eq!(local.list_chain().await.len(), 1);
    })
    .await
    .expect("test_oversized_peer_body_is_discarded timed out");
}
