// Copyright (c) 2024 Botho Foundation

//! Routers linked in a ring learn about each other through announcements.

use anla_packets::Address;
use anla_router::{
    PeerRecord, Router, RouterConfig, RouterEvent, RouterHandle, WebSocketTransport,
};
use std::{collections::HashSet, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    time::{sleep, timeout, Instant},
};

const ROUTERS: usize = 4;
const CONVERGENCE_TIMEOUT: Duration = Duration::from_secs(60);

fn config() -> RouterConfig {
    RouterConfig {
        announce_interval_ms: 250,
        ..RouterConfig::listening_on(Address::websocket("127.0.0.1".parse().unwrap(), 0))
    }
}

async fn listening(events: &mut mpsc::Receiver<RouterEvent>) -> SocketAddr {
    match timeout(Duration::from_secs(5), events.recv()).await {
        Ok(Some(RouterEvent::Listening(addr))) => addr,
        other => panic!("expected listening event, got {other:?}"),
    }
}

async fn start_ring() -> Vec<RouterHandle> {
    let mut handles = Vec::new();
    for _ in 0..ROUTERS {
        let (handle, mut events) = Router::start(config(), Arc::new(WebSocketTransport)).unwrap();
        listening(&mut events).await;
        handles.push(handle);
    }

    let mut records = Vec::new();
    for handle in &handles {
        records.push(handle.self_record().await.unwrap().unwrap());
    }

    // 1 -> 2 -> 3 -> 4 -> 1
    for (i, handle) in handles.iter().enumerate() {
        let next = &records[(i + 1) % ROUTERS];
        handle
            .add_peer(PeerRecord::new(next.public_key.clone(), next.address, false))
            .await
            .unwrap();
    }

    handles
}

async fn known_keys(handle: &RouterHandle) -> HashSet<Vec<u8>> {
    handle
        .peers()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.public_key.as_bytes().to_vec())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ring_becomes_complete_graph() {
    let handles = start_ring().await;

    let everyone: HashSet<Vec<u8>> = handles
        .iter()
        .map(|handle| handle.public_key().as_bytes().to_vec())
        .collect();
    assert_eq!(everyone.len(), ROUTERS);

    let deadline = Instant::now() + CONVERGENCE_TIMEOUT;
    loop {
        let mut complete = true;
        for handle in &handles {
            if known_keys(handle).await != everyone {
                complete = false;
                break;
            }
        }
        if complete {
            break;
        }
        assert!(Instant::now() < deadline, "ring did not converge");
        sleep(Duration::from_millis(200)).await;
    }

    for handle in &handles {
        let peers = handle.peers().await.unwrap();
        assert_eq!(peers.iter().filter(|record| record.is_self).count(), 1);
    }

    for handle in &handles {
        handle.close().await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_closed_router_is_forgotten() {
    let handles = start_ring().await;

    // Router 1 links to router 2 directly.
    let second = handles[1].public_key().as_bytes().to_vec();
    assert!(known_keys(&handles[0]).await.contains(&second));

    handles[1].close().await.unwrap();

    let deadline = Instant::now() + CONVERGENCE_TIMEOUT;
    while known_keys(&handles[0]).await.contains(&second) {
        assert!(Instant::now() < deadline, "closed router still known");
        sleep(Duration::from_millis(100)).await;
    }

    for handle in handles.iter().filter(|handle| handle.public_key().as_bytes() != second.as_slice()) {
        handle.close().await.unwrap();
    }
}
