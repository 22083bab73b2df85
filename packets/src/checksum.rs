// Copyright (c) 2024 Botho Foundation

//! Header checksum.
//!
//! Bytes `2..256` of the header are folded into a GF(2) remainder modulo
//! `x^16 + x^3 + 1`, one byte per step. The 16-bit result is stored
//! big-endian in bytes `0..2`.

use crate::{
    constants::{HEADER_LENGTH, OFFSET_CHECKSUM, OFFSET_POLYNOMIAL},
    PacketError, PacketResult,
};
use anla_util_polynomial::{moduli::MODULUS_PACKET_CHECKSUM, reduce_bytes};

/// Checksum of a header, ignoring whatever is stored in the checksum field.
pub fn checksum(header: &[u8; HEADER_LENGTH]) -> u16 {
    // Degree 16 modulus: the remainder always fits.
    reduce_bytes(&header[OFFSET_POLYNOMIAL..], MODULUS_PACKET_CHECKSUM) as u16
}

/// Compute and store the checksum. Must run after every other field is set.
pub fn write_checksum(header: &mut [u8; HEADER_LENGTH]) {
    let value = checksum(header);
    header[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 2].copy_from_slice(&value.to_be_bytes());
}

/// Check the stored checksum against the header contents.
pub fn verify_checksum(header: &[u8; HEADER_LENGTH]) -> PacketResult<()> {
    let stored = u16::from_be_bytes([header[OFFSET_CHECKSUM], header[OFFSET_CHECKSUM + 1]]);
    let computed = checksum(header);
    if stored == computed {
        Ok(())
    } else {
        Err(PacketError::ChecksumMismatch { stored, computed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned() -> [u8; HEADER_LENGTH] {
        let mut header = [0u8; HEADER_LENGTH];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(73).wrapping_add(11);
        }
        header
    }

    #[test]
    fn test_zero_header_checksum_is_zero() {
        let header = [0u8; HEADER_LENGTH];
        assert_eq!(checksum(&header), 0);
        assert!(verify_checksum(&header).is_ok());
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut header = patterned();
        let before = checksum(&header);
        header[0] ^= 0xff;
        header[1] ^= 0x0f;
        assert_eq!(checksum(&header), before);
    }

    #[test]
    fn test_last_byte_is_its_own_remainder() {
        let mut header = [0u8; HEADER_LENGTH];
        header[HEADER_LENGTH - 1] = 0xa7;
        assert_eq!(checksum(&header), 0xa7);
    }

    #[test]
    fn test_write_then_verify() {
        let mut header = patterned();
        assert!(verify_checksum(&header).is_err());
        write_checksum(&mut header);
        assert_eq!(verify_checksum(&header), Ok(()));
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let mut header = patterned();
        write_checksum(&mut header);

        for bit in OFFSET_POLYNOMIAL * 8..HEADER_LENGTH * 8 {
            let mut damaged = header;
            damaged[bit / 8] ^= 1 << (bit % 8);
            assert!(
                matches!(
                    verify_checksum(&damaged),
                    Err(PacketError::ChecksumMismatch { .. })
                ),
                "bit {bit}"
            );
        }
    }

    #[test]
    fn test_damaged_checksum_field_is_detected() {
        let mut header = patterned();
        write_checksum(&mut header);
        header[1] ^= 0x01;
        assert!(verify_checksum(&header).is_err());
    }
}
