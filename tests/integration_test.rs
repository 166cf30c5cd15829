use bytes::Bytes;
use raft_kv::{run_node, KvClient, KvClientError, NodeConfig, NodeError, NodeOptions};
use std::error::Error;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

struct TestCluster {
    cancel: CancellationToken,
    nodes: Vec<JoinHandle<Result<(), NodeError>>>,
    api_addrs: Vec<SocketAddr>,
}

impl TestCluster {
    fn start(size: u64, api_base_port: u16, peer_base_port: u16) -> Self {
        let cancel = CancellationToken::new();
        let mut nodes = Vec::new();
        let mut api_addrs = Vec::new();

        for id in 1..=size {
            let config = node_config(id, size, api_base_port, peer_base_port);
            api_addrs.push(config.api_addr);
            let logger = raft_kv::create_root_logger_for_stdout(id, false);
            nodes.push(tokio::spawn(run_node(config, logger, cancel.clone())));
        }

        TestCluster {
            cancel,
            nodes,
            api_addrs,
        }
    }

    async fn client(&self, id: u64) -> KvClient {
        let addr = self.api_addrs[(id - 1) as usize];
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match KvClient::connect(addr).await {
                Ok(client) => return client,
                Err(e) if Instant::now() < deadline => {
                    println!("Node {} not up yet: {:?}", id, e);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(e) => panic!("Could not connect to node {}: {:?}", id, e),
            }
        }
    }

    async fn discover_leader_id(&self, timeout: Duration) -> u64 {
        let deadline = Instant::now() + timeout;
        loop {
            for id in 1..=self.api_addrs.len() as u64 {
                let status = self.client(id).await.status().await.unwrap();
                if status.role == "Leader" {
                    return id;
                }
            }
            assert!(Instant::now() < deadline, "Timeout waiting for leader election");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    async fn shutdown(self) -> Vec<Result<(), NodeError>> {
        self.cancel.cancel();
        let mut results = Vec::new();
        for node in self.nodes {
            let result = tokio::time::timeout(Duration::from_secs(5), node)
                .await
                .expect("Node did not stop after cancellation")
                .expect("Node task panicked");
            results.push(result);
        }
        results
    }
}

fn node_config(id: u64, size: u64, api_base_port: u16, peer_base_port: u16) -> NodeConfig {
    let peer_addr = |n: u64| format!("127.0.0.1:{}", peer_base_port + n as u16);

    NodeConfig {
        id,
        peers: (1..=size).filter(|n| *n != id).map(peer_addr).collect(),
        api_addr: format!("127.0.0.1:{}", api_base_port + id as u16).parse().unwrap(),
        peer_addr: peer_addr(id),
        debug: false,
        log_directory: None,
        options: NodeOptions {
            tick_interval: Some(Duration::from_millis(20)),
            ..Default::default()
        },
    }
}

/// Proposals return once accepted, so reads poll until the write has been applied.
async fn eventually_get(client: &mut KvClient, key: &str, expected: Result<Bytes, ()>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let actual = match client.get(key).await {
            Ok(value) => Ok(value),
            Err(KvClientError::KeyNotFound) => Err(()),
            Err(e) => panic!("Unexpected get failure: {:?}", e),
        };
        if actual == expected {
            return;
        }
        assert!(Instant::now() < deadline, "Read of '{}' never became {:?}", key, expected);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// A follower redirects writes and reads to the leader. It may briefly not know the leader yet,
/// so `NoLeader` is retried.
async fn assert_redirects_to(client: &mut KvClient, leader_id: u64) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match client.put("greeting", Bytes::from_static(b"ignored")).await {
            Err(KvClientError::LeaderRedirect { leader_id: redirect }) => {
                assert_eq!(redirect, leader_id);
                break;
            }
            Err(KvClientError::NoLeader) if Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            other => panic!("Expected redirect, got {:?}", other),
        }
    }

    match client.get("greeting").await {
        Err(KvClientError::LeaderRedirect { leader_id: redirect }) => assert_eq!(redirect, leader_id),
        other => panic!("Expected redirect, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn replicated_put_get_delete() -> Result<(), Box<dyn Error>> {
    // -- setup --
    let cluster = TestCluster::start(3, 47100, 47200);
    let leader_id = cluster.discover_leader_id(Duration::from_secs(10)).await;
    let follower_id = if leader_id == 1 { 2 } else { 1 };
    let mut leader = cluster.client(leader_id).await;
    let mut follower = cluster.client(follower_id).await;

    // -- execute & verify --

    // 1. Write through the leader.
    leader.put("greeting", Bytes::from_static(b"hello")).await?;
    eventually_get(&mut leader, "greeting", Ok(Bytes::from_static(b"hello"))).await;

    // 2. Followers redirect both writes and reads to the leader.
    assert_redirects_to(&mut follower, leader_id).await;

    // 3. Overwrite, then delete.
    leader.put("greeting", Bytes::from_static(b"bonjour")).await?;
    eventually_get(&mut leader, "greeting", Ok(Bytes::from_static(b"bonjour"))).await;
    leader.delete("greeting").await?;
    eventually_get(&mut leader, "greeting", Err(())).await;

    // 4. Every node applies the same log.
    let leader_commit = leader.status().await?.commit_index;
    let deadline = Instant::now() + Duration::from_secs(5);
    for id in 1..=3 {
        let mut client = cluster.client(id).await;
        loop {
            let status = client.status().await?;
            if status.applied_index >= leader_commit {
                assert_eq!(status.leader_id, Some(leader_id));
                break;
            }
            assert!(Instant::now() < deadline, "Node {} never caught up", id);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    // -- teardown --
    for result in cluster.shutdown().await {
        assert!(result.is_ok(), "Node failed: {:?}", result);
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_node_cluster_serves_writes() -> Result<(), Box<dyn Error>> {
    let cluster = TestCluster::start(1, 47300, 47400);
    assert_eq!(cluster.discover_leader_id(Duration::from_secs(10)).await, 1);
    let mut client = cluster.client(1).await;

    client.put("k", Bytes::from_static(b"v")).await?;
    eventually_get(&mut client, "k", Ok(Bytes::from_static(b"v"))).await;

    // Deleting a missing key still commits.
    client.delete("missing").await?;
    match client.get("missing").await {
        Err(KvClientError::KeyNotFound) => {}
        other => panic!("Expected not found, got {:?}", other),
    }

    for result in cluster.shutdown().await {
        assert!(result.is_ok(), "Node failed: {:?}", result);
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn api_port_conflict_stops_node() {
    // -- setup --
    let cluster = TestCluster::start(1, 47500, 47600);
    cluster.discover_leader_id(Duration::from_secs(10)).await;

    // -- execute --
    // Same API port as the running node, different peer port.
    let config = node_config(1, 1, 47500, 47700);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        run_node(config, raft_kv::create_root_logger_for_stdout(1, false), CancellationToken::new()),
    )
    .await
    .expect("Node with conflicting port did not stop");

    // -- verify --
    assert!(matches!(result, Err(NodeError::Api(_))), "{:?}", result);
    cluster.shutdown().await;
}
