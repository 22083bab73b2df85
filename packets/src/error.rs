// Copyright (c) 2024 Botho Foundation

//! Error types for the coordination packet codec.

use displaydoc::Display;
use thiserror::Error;

/// Reasons a coordination packet is rejected.
///
/// Every variant means the same thing to a router: drop the packet.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum PacketError {
    /// Buffer too short: need {needed} bytes, got {got}
    TooShort {
        /// Minimum length in bytes
        needed: usize,
        /// Supplied length in bytes
        got: usize,
    },

    /// Checksum mismatch: stored {stored:#06x}, computed {computed:#06x}
    ChecksumMismatch {
        /// Checksum read from the header
        stored: u16,
        /// Checksum of the header contents
        computed: u16,
    },

    /// Unknown message type {0}
    UnknownType(u8),

    /// Unknown address type {0}
    UnknownAddressType(u8),
}

/// Result type for packet operations.
pub type PacketResult<T> = Result<T, PacketError>;
