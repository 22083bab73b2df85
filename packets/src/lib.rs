// Copyright (c) 2024 Botho Foundation

//! Coordination packets for the Anla overlay.
//!
//! Every hop-to-hop frame starts with a fixed 256-byte header describing
//! what the hop should do with the payload behind it. This crate formats
//! and parses that header, checks its checksum, and splits frames into
//! header, sender key and payload.
//!
//! Parsing never panics: every malformed input becomes a [`PacketError`],
//! and callers drop the packet.

#![deny(missing_docs)]

pub mod address;
pub mod checksum;
pub mod codec;
pub mod constants;
pub mod frame;
pub mod message;

mod error;

pub use address::{Address, TransportKind};
pub use codec::{encode, format, parse};
pub use constants::{DATA_OFFSET, HEADER_LENGTH, SENDER_KEY_OFFSET};
pub use error::{PacketError, PacketResult};
pub use frame::CoordinationFrame;
pub use message::{
    CoordinationMessage, Flags, KeyColorChange, MessageBody, MessageType, SessionToken, Telemetry,
};
