// Copyright (c) 2024 Botho Foundation

use anla_crypto_elgamal::{Exponent, KeyPair};
use anla_router::PeerRecord;
use anyhow::{Context, Result};

use crate::config::{NodeConfig, PeerEntry};

/// The peer entry other nodes use to link to this one.
pub fn run(config: &NodeConfig) -> Result<PeerEntry> {
    let exponent = config
        .router
        .exponent
        .as_deref()
        .context("No exponent configured, run `anla-node init` first")?;
    let keys = KeyPair::from_exponent(Exponent::from_hex(exponent)?);

    let record = PeerRecord::new(keys.public_key().clone(), config.router.coordination, false);
    Ok(PeerEntry::from_record(&record))
}
