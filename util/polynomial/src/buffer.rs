// Copyright (c) 2024 Botho Foundation

//! Long division over byte buffers.
//!
//! The dividend streams through a window twice the (trimmed) modulus length.
//! Each incoming byte shifts the window left by eight bits; the window is
//! then reduced by XOR-ing in copies of the modulus shifted by whole bytes
//! plus a sub-byte bit offset until its degree drops below the modulus
//! degree.
//!
//! ```text
//!   window (2 * m bytes)
//!   +-----------------+-----------------+
//!   | free headroom   | reduced value   | <- next dividend byte
//!   +-----------------+-----------------+
//!                      \_ remainder: trailing bytes of the window
//! ```

use crate::error::{PolynomialError, PolynomialResult};

/// Degree of a polynomial stored most significant byte first.
pub fn buffer_degree(polynomial: &[u8]) -> Option<usize> {
    let (index, byte) = polynomial
        .iter()
        .enumerate()
        .find(|(_, &byte)| byte != 0)?;
    Some((polynomial.len() - 1 - index) * 8 + 7 - byte.leading_zeros() as usize)
}

/// Reduce `dividend` modulo `modulus`, writing the trailing
/// `remainder.len()` bytes of the result into `remainder`.
///
/// Both inputs are read most significant byte first. Leading zero bytes of
/// the modulus are ignored. `remainder` must be able to hold every
/// possible remainder, i.e. at least `ceil(degree(modulus) / 8)` bytes;
/// any extra leading bytes are zeroed.
pub fn reduce_buffer(
    dividend: &[u8],
    modulus: &[u8],
    remainder: &mut [u8],
) -> PolynomialResult<()> {
    let degree_modulus = buffer_degree(modulus).ok_or(PolynomialError::ZeroModulus)?;

    let needed = degree_modulus.div_ceil(8);
    if remainder.len() < needed {
        return Err(PolynomialError::RemainderTooSmall {
            needed,
            got: remainder.len(),
        });
    }

    let modulus = &modulus[modulus.len() - (degree_modulus / 8 + 1)..];
    let mut window = vec![0u8; 2 * modulus.len()];
    let last = window.len() - 1;

    for &byte in dividend {
        window.copy_within(1.., 0);
        window[last] = byte;

        while let Some(degree_window) = buffer_degree(&window) {
            if degree_window < degree_modulus {
                break;
            }
            xor_shifted(&mut window, modulus, degree_window - degree_modulus);
        }
    }

    let take = remainder.len().min(window.len());
    let (padding, tail) = remainder.split_at_mut(remainder.len() - take);
    padding.fill(0);
    tail.copy_from_slice(&window[window.len() - take..]);

    Ok(())
}

/// XOR `modulus * x^shift` into `window`.
///
/// The caller guarantees the shifted modulus fits the window.
fn xor_shifted(window: &mut [u8], modulus: &[u8], shift: usize) {
    let bit_shift = (shift % 8) as u32;
    let lowest = window.len() - 1 - shift / 8;

    for (position, &byte) in modulus.iter().rev().enumerate() {
        let spread = (byte as u16) << bit_shift;
        let index = lowest - position;
        window[index] ^= spread as u8;

        let carried = (spread >> 8) as u8;
        if carried != 0 {
            window[index - 1] ^= carried;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixed::reduce_bytes,
        moduli::{MODULUS_PACKET_CHECKSUM, MODULUS_SHARED_SECRET},
    };

    #[test]
    fn test_buffer_degree() {
        assert_eq!(buffer_degree(&[]), None);
        assert_eq!(buffer_degree(&[0, 0, 0]), None);
        assert_eq!(buffer_degree(&[0, 0, 1]), Some(0));
        assert_eq!(buffer_degree(&[0, 0x80, 0]), Some(15));
        assert_eq!(buffer_degree(&MODULUS_SHARED_SECRET), Some(64));
    }

    #[test]
    fn test_zero_modulus_is_rejected() {
        let mut remainder = [0u8; 4];
        assert_eq!(
            reduce_buffer(&[1, 2, 3], &[0, 0], &mut remainder),
            Err(PolynomialError::ZeroModulus)
        );
    }

    #[test]
    fn test_short_remainder_is_rejected() {
        let mut remainder = [0u8; 7];
        assert_eq!(
            reduce_buffer(&[1, 2, 3], &MODULUS_SHARED_SECRET, &mut remainder),
            Err(PolynomialError::RemainderTooSmall { needed: 8, got: 7 })
        );
    }

    #[test]
    fn test_matches_word_reduction() {
        let modulus = MODULUS_PACKET_CHECKSUM.to_be_bytes();
        let dividend: Vec<u8> = (0u8..=200).map(|b| b.wrapping_mul(37)).collect();

        let mut remainder = [0u8; 2];
        reduce_buffer(&dividend, &modulus, &mut remainder).unwrap();

        assert_eq!(
            u16::from_be_bytes(remainder) as u32,
            reduce_bytes(&dividend, MODULUS_PACKET_CHECKSUM)
        );
    }

    #[test]
    fn test_shifted_moduli_reduce_to_zero() {
        let mut remainder = [0xffu8; 8];
        for offset in 0..8 {
            let mut dividend = [0u8; 16];
            dividend[offset..offset + 9].copy_from_slice(&MODULUS_SHARED_SECRET);
            reduce_buffer(&dividend, &MODULUS_SHARED_SECRET, &mut remainder).unwrap();
            assert_eq!(remainder, [0u8; 8], "offset {offset}");
        }
    }

    #[test]
    fn test_short_dividend_is_its_own_remainder() {
        let dividend = [0x12u8, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0];
        let mut remainder = [0u8; 8];
        reduce_buffer(&dividend, &MODULUS_SHARED_SECRET, &mut remainder).unwrap();
        assert_eq!(remainder, dividend);
    }

    #[test]
    fn test_oversized_remainder_is_zero_padded() {
        let mut remainder = [0xaau8; 24];
        reduce_buffer(&[0x01, 0x02], &MODULUS_SHARED_SECRET, &mut remainder).unwrap();
        assert!(remainder[..22].iter().all(|&b| b == 0));
        assert_eq!(&remainder[22..], &[0x01, 0x02]);
    }

    #[test]
    fn test_modulus_leading_zeros_are_ignored() {
        let dividend = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x23];
        let mut a = [0u8; 2];
        let mut b = [0u8; 2];
        reduce_buffer(&dividend, &[0x01, 0x00, 0x09], &mut a).unwrap();
        reduce_buffer(&dividend, &[0x00, 0x00, 0x01, 0x00, 0x09], &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_degree_zero_modulus_leaves_nothing() {
        let mut remainder = [0xffu8; 1];
        reduce_buffer(&[0xff, 0x13], &[0x01], &mut remainder).unwrap();
        assert_eq!(remainder, [0]);
    }
}
