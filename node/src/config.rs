// Copyright (c) 2024 Botho Foundation

//! Node configuration file.

use anla_crypto_elgamal::PublicKey;
use anla_packets::{Address, TransportKind};
use anla_router::{PeerRecord, RouterConfig};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, net::IpAddr, path::Path, str::FromStr};

/// Main configuration for a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Router settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Peers to link to at startup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<PeerEntry>,
}

impl NodeConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: NodeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration, refusing to replace an existing file unless
    /// `overwrite` is set.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            bail!("{} already exists", path.display());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.router.validate()?;
        for peer in &self.peers {
            peer.record()
                .with_context(|| format!("Invalid peer {}", peer.address()))?;
        }
        Ok(())
    }
}

/// A peer given in the configuration file or as `host:port:public_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEntry {
    /// Transport the peer listens on
    #[serde(rename = "type", default)]
    pub kind: TransportKind,

    /// Peer host
    pub host: IpAddr,

    /// Peer port
    pub port: u16,

    /// Public key as 512 hex characters
    pub public_key: String,
}

impl PeerEntry {
    /// Entry for a known peer record.
    pub fn from_record(record: &PeerRecord) -> Self {
        Self {
            kind: record.address.kind,
            host: record.address.host,
            port: record.address.port,
            public_key: record.public_key.to_hex(),
        }
    }

    /// The peer's coordination address.
    pub fn address(&self) -> Address {
        Address::new(self.kind, self.host, self.port)
    }

    /// Decode into a router peer record.
    pub fn record(&self) -> Result<PeerRecord> {
        let public_key = PublicKey::from_hex(&self.public_key)?;
        Ok(PeerRecord::new(public_key, self.address(), false))
    }
}

impl FromStr for PeerEntry {
    type Err = anyhow::Error;

    /// Parse `host:port:public_key`. IPv6 hosts may be bracketed.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(public_key), Some(port), Some(host)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("expected host:port:public_key");
        };

        let host = host.trim_start_matches('[').trim_end_matches(']');
        let entry = Self {
            kind: TransportKind::WebSocket,
            host: host
                .parse()
                .map_err(|e| anyhow!("invalid host {host:?}: {e}"))?,
            port: port
                .parse()
                .map_err(|e| anyhow!("invalid port {port:?}: {e}"))?,
            public_key: public_key.to_string(),
        };
        entry.record()?;
        Ok(entry)
    }
}

impl fmt::Display for PeerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host {
            IpAddr::V4(host) => write!(f, "{host}:{}:{}", self.port, self.public_key),
            IpAddr::V6(host) => write!(f, "[{host}]:{}:{}", self.port, self.public_key),
        }
    }
}
