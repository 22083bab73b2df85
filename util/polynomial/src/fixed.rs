// Copyright (c) 2024 Botho Foundation

//! Word-sized GF(2) polynomial operations.

/// Degree of `polynomial`, i.e. the index of its highest set bit.
///
/// The zero polynomial has no degree.
#[inline]
pub const fn degree(polynomial: u64) -> Option<u32> {
    if polynomial == 0 {
        None
    } else {
        Some(63 - polynomial.leading_zeros())
    }
}

/// Carry-less (schoolbook) product of two polynomials.
pub const fn multiply(a: u32, b: u32) -> u64 {
    let mut a = a;
    let mut b = b as u64;
    let mut accumulator = 0u64;
    while a != 0 {
        if a & 1 != 0 {
            accumulator ^= b;
        }
        a >>= 1;
        b <<= 1;
    }
    accumulator
}

/// Remainder of `dividend` modulo `modulus`.
///
/// Each step cancels the leading term of the dividend, so the degree
/// strictly decreases until it drops below the modulus degree. A zero
/// modulus leaves the dividend unchanged.
pub const fn reduce(dividend: u64, modulus: u64) -> u64 {
    let degree_modulus = match degree(modulus) {
        Some(d) => d,
        None => return dividend,
    };

    let mut dividend = dividend;
    while let Some(degree_dividend) = degree(dividend) {
        if degree_dividend < degree_modulus {
            break;
        }
        dividend ^= modulus << (degree_dividend - degree_modulus);
    }
    dividend
}

/// Remainder of a byte string modulo a word-sized modulus.
///
/// Bytes are injected into the accumulator one at a time, most significant
/// first, and reduced after every step. Moduli up to degree 32 are
/// supported; the result is the remainder.
pub fn reduce_bytes(bytes: &[u8], modulus: u32) -> u32 {
    debug_assert!(modulus != 0, "zero modulus");

    bytes.iter().fold(0u64, |accumulator, &byte| {
        reduce((accumulator << 8) | byte as u64, modulus as u64)
    }) as u32
}
