// Copyright (c) 2024 Botho Foundation

//! Wire lengths and header offsets. All multi-byte integers are big-endian.

/// Length of the coordination header.
pub const HEADER_LENGTH: usize = 256;
/// Length of an ElGamal key carried in a frame.
pub const COORDINATION_KEY_LENGTH: usize = 256;
/// Length of a symmetric (Twofish) key.
pub const SYMMETRIC_KEY_LENGTH: usize = 16;
/// Length of a session token.
pub const SESSION_TOKEN_LENGTH: usize = 8;
/// Length of a host field; IPv4 hosts use the first four bytes.
pub const HOST_LENGTH: usize = 16;

/// Offset of the sender key in a frame.
pub const SENDER_KEY_OFFSET: usize = HEADER_LENGTH;
/// Offset of the payload in a frame.
pub const DATA_OFFSET: usize = HEADER_LENGTH + COORDINATION_KEY_LENGTH;

pub(crate) const OFFSET_CHECKSUM: usize = 0;
/// First byte covered by the checksum.
pub(crate) const OFFSET_POLYNOMIAL: usize = 2;
pub(crate) const OFFSET_TYPE: usize = 2;
pub(crate) const OFFSET_ADDRESS_TYPES: usize = 3;
pub(crate) const OFFSET_SHIFT_TIME_IDLE: usize = 4;
pub(crate) const OFFSET_SHIFT_TIME_TOTAL: usize = 5;
pub(crate) const OFFSET_SHIFT_DATA_AVERAGE: usize = 6;
pub(crate) const OFFSET_SHIFT_DATA_TOTAL: usize = 7;
pub(crate) const OFFSET_FLAGS: usize = 8;
pub(crate) const OFFSET_TARGET_PORT: usize = 12;
pub(crate) const OFFSET_REPLY_PORT: usize = 14;
pub(crate) const OFFSET_TARGET_HOST: usize = 16;
pub(crate) const OFFSET_REPLY_HOST: usize = 32;
pub(crate) const OFFSET_SHARED_SECRET_DECRYPTION: usize = 48;
pub(crate) const OFFSET_SHARED_SECRET_ENCRYPTION: usize = 64;
pub(crate) const OFFSET_REMAINDER_DECRYPTION: usize = 80;
pub(crate) const OFFSET_REMAINDER_ENCRYPTION: usize = 88;
pub(crate) const OFFSET_KEY_COLOR_CHANGE: usize = 96;
pub(crate) const OFFSET_SESSION_TOKEN: usize = 224;
pub(crate) const OFFSET_LENGTH_REAL: usize = 236;
pub(crate) const OFFSET_LENGTH_NEXT: usize = 238;
/// Offset of the payload decryption key inside the header.
pub const OFFSET_KEY_DECRYPTION: usize = 240;
