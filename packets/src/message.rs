// Copyright (c) 2024 Botho Foundation

//! Decoded coordination messages.

use crate::{address::Address, constants::SESSION_TOKEN_LENGTH, PacketError};
use anla_crypto_multiplexing::MultiplexingMaterial;
use serde::{Deserialize, Serialize};

/// Length of the key color change block.
pub const KEY_COLOR_CHANGE_LENGTH: usize = 16;

/// Session token identifying a faster-link negotiation.
pub type SessionToken = [u8; SESSION_TOKEN_LENGTH];

/// Replacement key announced during a faster-link negotiation.
pub type KeyColorChange = [u8; KEY_COLOR_CHANGE_LENGTH];

/// Message type identifiers, as stored in header byte 2.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum MessageType {
    /// Relay the payload to the target address.
    Forward = 0,
    /// Gossip a peer's public key and address.
    AnnouncePeer = 1,
    /// Relay with a fixed return path.
    RedirectStatic = 2,
    /// Ask for a faster direct link.
    FasterLinkPlead = 16,
    /// Accept a faster link request.
    FasterLinkGrant = 17,
    /// Exchange keys over a granted link.
    FasterLinkTrade = 18,
    /// Confirm a traded link.
    FasterLinkCheck = 19,
}

impl TryFrom<u8> for MessageType {
    type Error = PacketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => MessageType::Forward,
            1 => MessageType::AnnouncePeer,
            2 => MessageType::RedirectStatic,
            16 => MessageType::FasterLinkPlead,
            17 => MessageType::FasterLinkGrant,
            18 => MessageType::FasterLinkTrade,
            19 => MessageType::FasterLinkCheck,
            other => return Err(PacketError::UnknownType(other)),
        })
    }
}

bitflags::bitflags! {
    /// Transport capabilities advertised in the header flags word.
    ///
    /// Bits outside the defined set are preserved as received.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Flags: u32 {
        /// Dials IPv4 WebSocket links
        const CLIENT_IPV4_WEBSOCKET = 1 << 0;
        /// Dials IPv4 UDP links
        const CLIENT_IPV4_UDP = 1 << 1;
        /// Dials IPv6 WebSocket links
        const CLIENT_IPV6_WEBSOCKET = 1 << 2;
        /// Dials IPv6 UDP links
        const CLIENT_IPV6_UDP = 1 << 3;
        /// Accepts IPv4 WebSocket links
        const SERVER_IPV4_WEBSOCKET = 1 << 4;
        /// Accepts IPv4 UDP links
        const SERVER_IPV4_UDP = 1 << 5;
        /// Accepts IPv6 WebSocket links
        const SERVER_IPV6_WEBSOCKET = 1 << 6;
        /// Accepts IPv6 UDP links
        const SERVER_IPV6_UDP = 1 << 7;
    }
}

/// Link quality hints, each a power-of-two shift.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Idle timeout shift
    pub shift_time_idle: u8,
    /// Total lifetime shift
    pub shift_time_total: u8,
    /// Average data rate shift
    pub shift_data_average: u8,
    /// Total data volume shift
    pub shift_data_total: u8,
}

/// Type-specific part of a coordination message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MessageBody {
    /// Relay the payload to `target`.
    Forward {
        /// Next hop
        target: Address,
    },
    /// The payload carries the public key of the peer at `target`.
    AnnouncePeer {
        /// Announced peer
        target: Address,
    },
    /// Relay to `target`; answers come back through `reply`.
    RedirectStatic {
        /// Next hop
        target: Address,
        /// Return path
        reply: Address,
        /// Link hints
        telemetry: Telemetry,
        /// Handshake material for inbound traffic
        decryption: MultiplexingMaterial,
        /// Handshake material for outbound traffic
        encryption: MultiplexingMaterial,
    },
    /// Request a faster link reachable at `reply`.
    FasterLinkPlead {
        /// Where the requester listens
        reply: Address,
        /// Link hints
        telemetry: Telemetry,
        /// Handshake material for inbound traffic
        decryption: MultiplexingMaterial,
        /// Handshake material for outbound traffic
        encryption: MultiplexingMaterial,
    },
    /// Grant a faster link at `target`.
    FasterLinkGrant {
        /// Where the granted link listens
        target: Address,
        /// Negotiation token
        session_token: SessionToken,
        /// Replacement key
        key_color_change: KeyColorChange,
    },
    /// Trade keys for a granted link.
    FasterLinkTrade {
        /// Negotiation token
        session_token: SessionToken,
        /// Replacement key
        key_color_change: KeyColorChange,
    },
    /// Confirm a traded link.
    FasterLinkCheck {
        /// Negotiation token
        session_token: SessionToken,
    },
}

impl MessageBody {
    /// Header type identifier for this body.
    pub fn message_type(&self) -> MessageType {
        match self {
            MessageBody::Forward { .. } => MessageType::Forward,
            MessageBody::AnnouncePeer { .. } => MessageType::AnnouncePeer,
            MessageBody::RedirectStatic { .. } => MessageType::RedirectStatic,
            MessageBody::FasterLinkPlead { .. } => MessageType::FasterLinkPlead,
            MessageBody::FasterLinkGrant { .. } => MessageType::FasterLinkGrant,
            MessageBody::FasterLinkTrade { .. } => MessageType::FasterLinkTrade,
            MessageBody::FasterLinkCheck { .. } => MessageType::FasterLinkCheck,
        }
    }

    /// Address the payload travels to next, if any.
    pub fn target(&self) -> Option<&Address> {
        match self {
            MessageBody::Forward { target }
            | MessageBody::AnnouncePeer { target }
            | MessageBody::RedirectStatic { target, .. }
            | MessageBody::FasterLinkGrant { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Return address, if any.
    pub fn reply(&self) -> Option<&Address> {
        match self {
            MessageBody::RedirectStatic { reply, .. }
            | MessageBody::FasterLinkPlead { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

/// A decoded coordination header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoordinationMessage {
    /// Twofish key for the payload behind this header
    pub decryption_key: [u8; 16],
    /// Length of the meaningful payload
    pub length_real: u16,
    /// Length of the frame handed to the next hop
    pub length_next: u16,
    /// Advertised transport capabilities
    pub flags: Flags,
    /// Type-specific fields
    pub body: MessageBody,
}

impl CoordinationMessage {
    /// A message with zeroed common fields.
    pub fn new(body: MessageBody) -> Self {
        Self {
            decryption_key: [0u8; 16],
            length_real: 0,
            length_next: 0,
            flags: Flags::empty(),
            body,
        }
    }

    /// Header type identifier.
    pub fn message_type(&self) -> MessageType {
        self.body.message_type()
    }
}
