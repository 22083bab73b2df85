// Copyright (c) 2024 Botho Foundation

use anla_crypto_elgamal::KeyPair;
use anla_router::PeerRecord;
use anla_util_random::RandomGenerator;
use anyhow::Result;
use std::{net::IpAddr, path::Path};
use tracing::info;

use crate::config::{NodeConfig, PeerEntry};

/// Write a new configuration with a freshly generated key.
pub fn run(
    config_path: &Path,
    host: Option<IpAddr>,
    port: Option<u16>,
    force: bool,
) -> Result<NodeConfig> {
    let mut config = NodeConfig::default();
    if let Some(host) = host {
        config.router.coordination.host = host;
    }
    if let Some(port) = port {
        config.router.coordination.port = port;
    }

    let keys = KeyPair::generate(&mut RandomGenerator::from_entropy());
    config.router.exponent = Some(keys.exponent().to_hex());
    config.save(config_path, force)?;

    let coordination = config.router.coordination;
    info!(path = %config_path.display(), %coordination, "Configuration written");

    let record = PeerRecord::new(keys.public_key().clone(), coordination, false);
    println!("{}", PeerEntry::from_record(&record));

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anla-node.toml");

        let written = run(&path, Some("0.0.0.0".parse().unwrap()), Some(12000), false).unwrap();
        let loaded = NodeConfig::from_file(&path).unwrap();

        assert_eq!(loaded.router.coordination.port, 12000);
        assert_eq!(loaded.router.exponent, written.router.exponent);
        assert_eq!(loaded.router.exponent.as_ref().map(String::len), Some(512));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anla-node.toml");

        let first = run(&path, None, None, false).unwrap();
        assert!(run(&path, None, None, false).is_err());
        assert_eq!(
            NodeConfig::from_file(&path).unwrap().router.exponent,
            first.router.exponent
        );

        let replaced = run(&path, None, None, true).unwrap();
        assert_ne!(replaced.router.exponent, first.router.exponent);
    }
}
