// Copyright (c) 2024 Botho Foundation

//! Arithmetic modulo `p = 2^2048 - 1942289`.
//!
//! Residues are 32 little-endian 64-bit limbs. Products are folded back
//! using `2^2048 = DELTA (mod p)`, so a 4096-bit product `hi * 2^2048 + lo`
//! reduces to `lo + hi * DELTA` and a couple of small carry folds.

use zeroize::Zeroize;

/// Length in bytes of every residue, key and ciphertext.
pub const KEY_LENGTH: usize = 256;

pub(crate) const LIMBS: usize = KEY_LENGTH / 8;

/// `2^2048 - p`.
pub(crate) const DELTA: u64 = 1_942_289;

/// Group order `q = p - 1`, as limbs.
pub(crate) const ORDER: [u64; LIMBS] = {
    let mut limbs = [u64::MAX; LIMBS];
    limbs[0] = u64::MAX - DELTA;
    limbs
};

/// A residue modulo `p`, always fully reduced.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Zeroize)]
pub(crate) struct Residue([u64; LIMBS]);

impl Residue {
    pub const ONE: Self = {
        let mut limbs = [0u64; LIMBS];
        limbs[0] = 1;
        Self(limbs)
    };

    pub const GENERATOR: Self = {
        let mut limbs = [0u64; LIMBS];
        limbs[0] = 2;
        Self(limbs)
    };

    /// Interpret 256 little-endian bytes, reducing values at or above `p`.
    pub fn from_le_bytes(bytes: &[u8; KEY_LENGTH]) -> Self {
        let mut residue = Self(limbs_from_le_bytes(bytes));
        residue.normalize();
        residue
    }

    pub fn to_le_bytes(self) -> [u8; KEY_LENGTH] {
        limbs_to_le_bytes(&self.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut wide = [0u64; 2 * LIMBS];
        for (i, &a) in self.0.iter().enumerate() {
            if a == 0 {
                continue;
            }
            let mut carry = 0u128;
            for (j, &b) in other.0.iter().enumerate() {
                let t = wide[i + j] as u128 + a as u128 * b as u128 + carry;
                wide[i + j] = t as u64;
                carry = t >> 64;
            }
            wide[i + LIMBS] = carry as u64;
        }
        Self::reduce_wide(&wide)
    }

    /// `self^exponent` by left-to-right square-and-multiply.
    pub fn pow(&self, exponent: &[u8; KEY_LENGTH]) -> Self {
        let mut result = Self::ONE;
        for &byte in exponent.iter().rev() {
            for bit in (0..8).rev() {
                result = result.mul(&result);
                if (byte >> bit) & 1 == 1 {
                    result = result.mul(self);
                }
            }
        }
        result
    }

    fn reduce_wide(wide: &[u64; 2 * LIMBS]) -> Self {
        let mut low = [0u64; LIMBS];
        let mut carry = 0u128;
        for i in 0..LIMBS {
            let t = wide[i] as u128 + wide[LIMBS + i] as u128 * DELTA as u128 + carry;
            low[i] = t as u64;
            carry = t >> 64;
        }

        while carry != 0 {
            carry = add_small(&mut low, carry * DELTA as u128) as u128;
        }

        let mut residue = Self(low);
        residue.normalize();
        residue
    }

    /// Subtract `p` once if `self >= p`.
    ///
    /// `x >= p` exactly when `x + DELTA` overflows 2048 bits, and then the
    /// truncated sum is `x - p`.
    fn normalize(&mut self) {
        let mut candidate = self.0;
        if add_small(&mut candidate, DELTA as u128) != 0 {
            self.0 = candidate;
        }
    }
}

/// `q - (exponent mod q)`, the exponent of a Fermat inverse.
pub(crate) fn order_complement(exponent: &[u8; KEY_LENGTH]) -> [u8; KEY_LENGTH] {
    let value = limbs_from_le_bytes(exponent);
    let (mut difference, borrow) = sub_limbs(&ORDER, &value);
    if borrow {
        // exponent > q: q - (x - q) = 2q - x, which wraps back into range.
        add_limbs(&mut difference, &ORDER);
    }
    limbs_to_le_bytes(&difference)
}

fn limbs_from_le_bytes(bytes: &[u8; KEY_LENGTH]) -> [u64; LIMBS] {
    let mut limbs = [0u64; LIMBS];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(word);
    }
    limbs
}

fn limbs_to_le_bytes(limbs: &[u64; LIMBS]) -> [u8; KEY_LENGTH] {
    let mut bytes = [0u8; KEY_LENGTH];
    for (chunk, limb) in bytes.chunks_exact_mut(8).zip(limbs.iter()) {
        chunk.copy_from_slice(&limb.to_le_bytes());
    }
    bytes
}

/// Add a value below `2^127` into the limbs, returning the carry out of the
/// top limb.
fn add_small(limbs: &mut [u64; LIMBS], value: u128) -> u64 {
    let mut carry = value;
    for limb in limbs.iter_mut() {
        if carry == 0 {
            break;
        }
        let sum = *limb as u128 + carry;
        *limb = sum as u64;
        carry = sum >> 64;
    }
    carry as u64
}

/// `a - b` modulo `2^2048`, with the final borrow.
fn sub_limbs(a: &[u64; LIMBS], b: &[u64; LIMBS]) -> ([u64; LIMBS], bool) {
    let mut difference = [0u64; LIMBS];
    let mut borrow = false;
    for i in 0..LIMBS {
        let (d, b1) = a[i].overflowing_sub(b[i]);
        let (d, b2) = d.overflowing_sub(borrow as u64);
        difference[i] = d;
        borrow = b1 || b2;
    }
    (difference, borrow)
}

/// `a += b` modulo `2^2048`.
fn add_limbs(a: &mut [u64; LIMBS], b: &[u64; LIMBS]) {
    let mut carry = false;
    for i in 0..LIMBS {
        let (s, c1) = a[i].overflowing_add(b[i]);
        let (s, c2) = s.overflowing_add(carry as u64);
        a[i] = s;
        carry = c1 || c2;
    }
}
