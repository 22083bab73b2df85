// Copyright (c) 2024 Botho Foundation

//! Error types for the router.

use anla_crypto_elgamal::ElGamalError;
use anla_packets::{PacketError, TransportKind};
use displaydoc::Display;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur in the router.
#[derive(Debug, Display, Error)]
pub enum RouterError {
    /// Invalid configuration: {0}
    InvalidConfig(String),

    /// Unsupported transport: {0}
    UnsupportedTransport(TransportKind),

    /// Failed to bind {address}: {reason}
    Bind {
        /// Requested listen address
        address: SocketAddr,
        /// Underlying failure
        reason: String,
    },

    /// Key error: {0}
    Key(#[from] ElGamalError),

    /// Packet error: {0}
    Packet(#[from] PacketError),

    /// Channel closed
    ChannelClosed,
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
