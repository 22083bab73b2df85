// Copyright (c) 2024 Botho Foundation

//! Configuration for the router.

use crate::error::{RouterError, RouterResult};
use anla_crypto_elgamal::{Exponent, KeyPair};
use anla_packets::{Address, DATA_OFFSET};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use std::{fmt, net::Ipv4Addr, time::Duration};

/// Default coordination port.
pub const DEFAULT_PORT: u16 = 11412;

/// Default time between announcements, in milliseconds.
pub const DEFAULT_ANNOUNCE_INTERVAL_MS: u64 = 750;

/// Default time a forwarding link stays open after sending, in milliseconds.
pub const DEFAULT_FORWARD_GRACE_MS: u64 = 1000;

/// Default upper bound on inbound frame length, in bytes.
pub const DEFAULT_MAX_PACKET_LENGTH: usize = 8192;

/// Default command channel capacity.
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Default number of inbound frames decrypted concurrently.
pub const DEFAULT_MAX_INFLIGHT_FRAMES: usize = 32;

/// Configuration for a router instance.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Secret exponent as 512 hex characters (little-endian bytes).
    /// A fresh one is drawn when absent.
    pub exponent: Option<String>,

    /// Where to listen for coordination frames
    pub coordination: Address,

    /// How often to announce a peer (milliseconds)
    pub announce_interval_ms: u64,

    /// How long a forwarding link stays open after sending (milliseconds)
    pub forward_grace_ms: u64,

    /// Inbound frames longer than this are dropped (bytes)
    pub max_packet_length: usize,

    /// Capacity of the command channel
    pub command_buffer: usize,

    /// Inbound frames being decrypted at once; more are dropped
    pub max_inflight_frames: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            exponent: None,
            coordination: Address::websocket(Ipv4Addr::LOCALHOST.into(), DEFAULT_PORT),
            announce_interval_ms: DEFAULT_ANNOUNCE_INTERVAL_MS,
            forward_grace_ms: DEFAULT_FORWARD_GRACE_MS,
            max_packet_length: DEFAULT_MAX_PACKET_LENGTH,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            max_inflight_frames: DEFAULT_MAX_INFLIGHT_FRAMES,
        }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("exponent", &self.exponent.as_ref().map(|_| "<redacted>"))
            .field("coordination", &self.coordination)
            .field("announce_interval_ms", &self.announce_interval_ms)
            .field("forward_grace_ms", &self.forward_grace_ms)
            .field("max_packet_length", &self.max_packet_length)
            .field("command_buffer", &self.command_buffer)
            .field("max_inflight_frames", &self.max_inflight_frames)
            .finish()
    }
}

impl RouterConfig {
    /// Configuration listening on `coordination`, other fields default.
    pub fn listening_on(coordination: Address) -> Self {
        Self {
            coordination,
            ..Default::default()
        }
    }

    /// Get the announce interval as a Duration.
    pub fn announce_interval(&self) -> Duration {
        Duration::from_millis(self.announce_interval_ms)
    }

    /// Get the forwarding grace period as a Duration.
    pub fn forward_grace(&self) -> Duration {
        Duration::from_millis(self.forward_grace_ms)
    }

    /// Check the configuration for values the router cannot run with.
    pub fn validate(&self) -> RouterResult<()> {
        if self.announce_interval_ms == 0 {
            return Err(RouterError::InvalidConfig(
                "announce_interval_ms must be positive".to_string(),
            ));
        }
        if self.command_buffer == 0 {
            return Err(RouterError::InvalidConfig(
                "command_buffer must be positive".to_string(),
            ));
        }
        if self.max_inflight_frames == 0 {
            return Err(RouterError::InvalidConfig(
                "max_inflight_frames must be positive".to_string(),
            ));
        }
        if self.max_packet_length < DATA_OFFSET {
            return Err(RouterError::InvalidConfig(format!(
                "max_packet_length must be at least {DATA_OFFSET}"
            )));
        }
        if let Some(exponent) = &self.exponent {
            Exponent::from_hex(exponent)?;
        }
        Ok(())
    }

    /// The configured key pair, or a fresh one drawn from `rng`.
    pub fn key_pair<R: RngCore + ?Sized>(&self, rng: &mut R) -> RouterResult<KeyPair> {
        match &self.exponent {
            Some(exponent) => Ok(KeyPair::from_exponent(Exponent::from_hex(exponent)?)),
            None => Ok(KeyPair::generate(rng)),
        }
    }
}
