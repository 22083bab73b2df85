// Copyright (c) 2024 Botho Foundation

use anla_router::{transport_for, Router, RouterEvent};
use anyhow::{anyhow, bail, Context, Result};
use std::net::IpAddr;
use tokio::select;
use tracing::{error, info, warn};

use crate::config::{NodeConfig, PeerEntry};

/// Command line settings that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Listen host
    pub host: Option<IpAddr>,

    /// Listen port
    pub port: Option<u16>,

    /// Secret exponent as hex
    pub exponent: Option<String>,

    /// Additional peers
    pub peers: Vec<PeerEntry>,
}

impl Overrides {
    /// Apply to `config` and revalidate it.
    pub fn apply(self, config: &mut NodeConfig) -> Result<()> {
        if let Some(host) = self.host {
            config.router.coordination.host = host;
        }
        if let Some(port) = self.port {
            config.router.coordination.port = port;
        }
        if let Some(exponent) = self.exponent {
            config.router.exponent = Some(exponent);
        }
        config.peers.extend(self.peers);
        config.validate()
    }
}

/// Run a router until interrupted.
pub async fn run(config: NodeConfig) -> Result<()> {
    if config.router.exponent.is_none() {
        warn!("No exponent configured, this node gets a new identity every start");
    }

    let transport = transport_for(config.router.coordination.kind)?;
    let (handle, mut events) = Router::start(config.router.clone(), transport)?;

    let local_addr = match events.recv().await {
        Some(RouterEvent::Listening(addr)) => addr,
        Some(RouterEvent::Error(e)) => bail!("Router failed to start: {e}"),
        None => bail!("Router stopped before listening"),
    };

    let me = handle
        .self_record()
        .await?
        .ok_or_else(|| anyhow!("Router has no self record"))?;
    info!(%local_addr, "Node running");
    println!("{}", PeerEntry::from_record(&me));

    for peer in &config.peers {
        handle
            .add_peer(peer.record()?)
            .await
            .with_context(|| format!("Failed to add peer {}", peer.address()))?;
    }
    info!(peers = config.peers.len(), "Linked configured peers");

    let result = loop {
        select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break Ok(());
            }

            event = events.recv() => match event {
                Some(RouterEvent::Error(e)) => {
                    error!(%e, "Router failed");
                    break Err(anyhow!("Router failed: {e}"));
                }
                Some(RouterEvent::Listening(_)) => {}
                None => break Ok(()),
            },
        }
    };

    // The router may already be gone after an error.
    let _ = handle.close().await;
    info!("Node stopped");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = NodeConfig::default();
        Overrides {
            host: Some("0.0.0.0".parse().unwrap()),
            port: Some(12001),
            ..Default::default()
        }
        .apply(&mut config)
        .unwrap();

        assert_eq!(config.router.coordination.port, 12001);
        assert!(config.router.coordination.host.is_unspecified());
        assert!(config.router.exponent.is_none());
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = NodeConfig::default();
        let result = Overrides {
            exponent: Some("xyz".to_string()),
            ..Default::default()
        }
        .apply(&mut config);
        assert!(result.is_err());
    }
}
