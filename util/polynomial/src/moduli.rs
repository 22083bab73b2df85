// Copyright (c) 2024 Botho Foundation

//! Fixed moduli used across the overlay.

/// Packet checksum modulus, `x^16 + x^3 + 1`.
///
/// Written with 17 bits, so every remainder fits the 16-bit checksum field.
pub const MODULUS_PACKET_CHECKSUM: u32 = 0b1_0000_0000_0000_1001;

/// Peer fingerprint modulus, `x^23 + x^5 + 1`.
pub const MODULUS_PEER_IDENTIFICATION: u32 = 0b1000_0000_0000_0000_0010_0001;

/// Shared-secret modulus, `x^64 + x^38 + x^18 + x^10 + 1`, most significant
/// byte first.
pub const MODULUS_SHARED_SECRET: [u8; 9] = [
    0b0000_0001,
    0b0000_0000,
    0b0000_0000,
    0b0000_0000,
    0b0100_0000,
    0b0000_0000,
    0b0000_0100,
    0b0000_0100,
    0b0000_0001,
];

/// Number of bits in a peer fingerprint.
pub const FINGERPRINT_BITS: u32 = 23;
