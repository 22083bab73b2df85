// Copyright (c) 2024 Botho Foundation

//! Handshake multiplexing.
//!
//! A listener that shares a 16-byte secret and an 8-byte remainder with a
//! peer recognises that peer's handshakes among unrelated traffic on the
//! same channel, without any plaintext marker:
//!
//! ```text
//!   match:     (secret XOR handshake) mod M  ==  remainder
//!   generate:  h = random
//!              h[8..16] ^= ((secret XOR h) mod M) XOR remainder
//! ```
//!
//! `M` is the degree-64 shared-secret modulus. Any polynomial below degree
//! 64 is its own remainder, so XOR-ing a difference into the trailing eight
//! bytes shifts the remainder by exactly that difference. That holds for
//! this modulus and these lengths only.
//!
//! Unrelated handshakes match with probability about `2^-64`.

use anla_util_polynomial::{moduli::MODULUS_SHARED_SECRET, reduce_buffer};
use rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a shared secret in bytes.
pub const SHARED_SECRET_LENGTH: usize = 16;

/// Length of a shared remainder in bytes.
pub const REMAINDER_LENGTH: usize = 8;

/// Length of a handshake in bytes.
pub const HANDSHAKE_LENGTH: usize = SHARED_SECRET_LENGTH;

/// Whether `handshake` was produced for `shared_secret` and `remainder`.
pub fn matches(
    shared_secret: &[u8; SHARED_SECRET_LENGTH],
    remainder: &[u8; REMAINDER_LENGTH],
    handshake: &[u8; HANDSHAKE_LENGTH],
) -> bool {
    remainder_of(shared_secret, handshake) == *remainder
}

/// A fresh random handshake that [`matches`] the given material.
pub fn generate<R: RngCore + ?Sized>(
    shared_secret: &[u8; SHARED_SECRET_LENGTH],
    remainder: &[u8; REMAINDER_LENGTH],
    rng: &mut R,
) -> [u8; HANDSHAKE_LENGTH] {
    let mut handshake = [0u8; HANDSHAKE_LENGTH];
    rng.fill_bytes(&mut handshake);

    let current = remainder_of(shared_secret, &handshake);
    let tail = &mut handshake[HANDSHAKE_LENGTH - REMAINDER_LENGTH..];
    for ((byte, have), want) in tail.iter_mut().zip(current).zip(remainder) {
        *byte ^= have ^ want;
    }
    handshake
}

fn remainder_of(
    shared_secret: &[u8; SHARED_SECRET_LENGTH],
    handshake: &[u8; HANDSHAKE_LENGTH],
) -> [u8; REMAINDER_LENGTH] {
    let mut sum = [0u8; SHARED_SECRET_LENGTH];
    for ((s, a), b) in sum.iter_mut().zip(shared_secret).zip(handshake) {
        *s = a ^ b;
    }

    let mut remainder = [0u8; REMAINDER_LENGTH];
    let reduced = reduce_buffer(&sum, &MODULUS_SHARED_SECRET, &mut remainder);
    debug_assert!(reduced.is_ok(), "a degree-64 remainder fits eight bytes");
    sum.zeroize();
    remainder
}

/// One direction's shared secret and remainder.
#[derive(Clone, Debug, Default, Eq, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct MultiplexingMaterial {
    /// Secret mixed into every handshake
    pub shared_secret: [u8; SHARED_SECRET_LENGTH],
    /// Remainder a matching handshake reduces to
    pub remainder: [u8; REMAINDER_LENGTH],
}

impl MultiplexingMaterial {
    /// Wrap existing material.
    pub fn new(
        shared_secret: [u8; SHARED_SECRET_LENGTH],
        remainder: [u8; REMAINDER_LENGTH],
    ) -> Self {
        Self {
            shared_secret,
            remainder,
        }
    }

    /// Draw fresh material.
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut material = Self::default();
        rng.fill_bytes(&mut material.shared_secret);
        rng.fill_bytes(&mut material.remainder);
        material
    }

    /// A fresh handshake for this material.
    pub fn handshake<R: RngCore + ?Sized>(&self, rng: &mut R) -> [u8; HANDSHAKE_LENGTH] {
        generate(&self.shared_secret, &self.remainder, rng)
    }

    /// Whether `handshake` belongs to this material.
    pub fn matches(&self, handshake: &[u8; HANDSHAKE_LENGTH]) -> bool {
        matches(&self.shared_secret, &self.remainder, handshake)
    }
}
