// Copyright (c) 2024 Botho Foundation

//! Transport frames.
//!
//! ```text
//!   0        256          512
//!   +--------+------------+------------------------+
//!   | header | sender key | payload ...            |
//!   +--------+------------+------------------------+
//! ```
//!
//! The header is ElGamal-encrypted as one 256-byte block, the sender key is
//! the matching ephemeral public key, and the payload is chain-encrypted
//! under the key carried in the header.

use crate::{
    constants::{COORDINATION_KEY_LENGTH, DATA_OFFSET, HEADER_LENGTH, SENDER_KEY_OFFSET},
    PacketError, PacketResult,
};

/// An owned transport frame of at least [`DATA_OFFSET`] bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoordinationFrame {
    bytes: Vec<u8>,
}

impl CoordinationFrame {
    /// A zeroed frame with room for `payload_length` payload bytes.
    pub fn new(payload_length: usize) -> Self {
        Self {
            bytes: vec![0u8; DATA_OFFSET + payload_length],
        }
    }

    /// Wrap received bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> PacketResult<Self> {
        if bytes.len() < DATA_OFFSET {
            return Err(PacketError::TooShort {
                needed: DATA_OFFSET,
                got: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    /// Header block.
    pub fn header(&self) -> &[u8; HEADER_LENGTH] {
        self.split().0
    }

    /// Sender key block.
    pub fn sender_key(&self) -> &[u8; COORDINATION_KEY_LENGTH] {
        self.split().1
    }

    /// Payload after the sender key.
    pub fn payload(&self) -> &[u8] {
        self.split().2
    }

    /// Mutable views of header, sender key and payload.
    pub fn parts_mut(
        &mut self,
    ) -> (
        &mut [u8; HEADER_LENGTH],
        &mut [u8; COORDINATION_KEY_LENGTH],
        &mut [u8],
    ) {
        let (header, rest) = self.bytes.split_at_mut(SENDER_KEY_OFFSET);
        let (sender_key, payload) = rest.split_at_mut(DATA_OFFSET - SENDER_KEY_OFFSET);
        let header: Result<&mut [u8; HEADER_LENGTH], _> = header.try_into();
        let sender_key: Result<&mut [u8; COORDINATION_KEY_LENGTH], _> = sender_key.try_into();
        match (header, sender_key) {
            (Ok(header), Ok(sender_key)) => (header, sender_key, payload),
            _ => unreachable!("frame shorter than {DATA_OFFSET} bytes"),
        }
    }

    /// Whole frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a frame carries at least header and sender key.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Unwrap into the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn split(&self) -> (&[u8; HEADER_LENGTH], &[u8; COORDINATION_KEY_LENGTH], &[u8]) {
        let (header, rest) = self.bytes.split_at(SENDER_KEY_OFFSET);
        let (sender_key, payload) = rest.split_at(DATA_OFFSET - SENDER_KEY_OFFSET);
        let header: Result<&[u8; HEADER_LENGTH], _> = header.try_into();
        let sender_key: Result<&[u8; COORDINATION_KEY_LENGTH], _> = sender_key.try_into();
        match (header, sender_key) {
            (Ok(header), Ok(sender_key)) => (header, sender_key, payload),
            _ => unreachable!("frame shorter than {DATA_OFFSET} bytes"),
        }
    }
}

impl AsRef<[u8]> for CoordinationFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_layout() {
        let frame = CoordinationFrame::new(32);
        assert_eq!(frame.len(), DATA_OFFSET + 32);
        assert_eq!(frame.header().len(), HEADER_LENGTH);
        assert_eq!(frame.sender_key().len(), COORDINATION_KEY_LENGTH);
        assert_eq!(frame.payload().len(), 32);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_parts_land_at_offsets() {
        let mut frame = CoordinationFrame::new(4);
        {
            let (header, sender_key, payload) = frame.parts_mut();
            header.fill(1);
            sender_key.fill(2);
            payload.fill(3);
        }
        let bytes = frame.into_bytes();
        assert!(bytes[..256].iter().all(|&b| b == 1));
        assert!(bytes[256..512].iter().all(|&b| b == 2));
        assert_eq!(&bytes[512..], &[3, 3, 3, 3]);
    }

    #[test]
    fn test_from_bytes_rejects_short() {
        assert_eq!(
            CoordinationFrame::from_bytes(vec![0; 511]),
            Err(PacketError::TooShort {
                needed: DATA_OFFSET,
                got: 511
            })
        );
        let frame = CoordinationFrame::from_bytes(vec![0; 512]).unwrap();
        assert!(frame.payload().is_empty());
    }
}
