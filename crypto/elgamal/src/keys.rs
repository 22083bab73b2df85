// Copyright (c) 2024 Botho Foundation

//! Exponents, public keys and the encrypt/decrypt operations.

use crate::{
    error::{ElGamalError, ElGamalResult},
    field::{order_complement, Residue, KEY_LENGTH},
};
use core::fmt;
use rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret exponent. Zeroized on drop and redacted in debug output.
#[derive(Clone, Eq, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct Exponent([u8; KEY_LENGTH]);

impl Exponent {
    /// Wrap raw little-endian exponent bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh exponent.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Decode 512 hex characters.
    pub fn from_hex(text: &str) -> ElGamalResult<Self> {
        Ok(Self(decode_hex(text)?))
    }

    /// Raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Hex encoding, suitable for a configuration file.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Exponent(<redacted>)")
    }
}

/// A public key `g^x mod p`.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct PublicKey([u8; KEY_LENGTH]);

impl PublicKey {
    /// Wrap raw little-endian key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Copy a key out of a slice.
    pub fn from_slice(bytes: &[u8]) -> ElGamalResult<Self> {
        let array: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| ElGamalError::InvalidLength {
                    expected: KEY_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Decode 512 hex characters.
    pub fn from_hex(text: &str) -> ElGamalResult<Self> {
        Ok(Self(decode_hex(text)?))
    }

    /// Raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..8]))
    }
}

/// A node's long-lived key material.
#[derive(Clone, Debug)]
pub struct KeyPair {
    exponent: Exponent,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derive the public half of `exponent`.
    pub fn from_exponent(exponent: Exponent) -> Self {
        let public_key = public_key(&exponent);
        Self {
            exponent,
            public_key,
        }
    }

    /// Draw a fresh exponent and derive its public key.
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self::from_exponent(Exponent::random(rng))
    }

    /// The secret exponent.
    pub fn exponent(&self) -> &Exponent {
        &self.exponent
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// Output of [`encrypt`].
#[derive(Clone, Debug)]
pub struct Encrypted {
    /// `plaintext * shared mod p`
    pub ciphertext: [u8; KEY_LENGTH],
    /// `g^sender_exponent`, sent alongside the ciphertext
    pub sender_key: PublicKey,
}

/// `g^exponent mod p`.
pub fn public_key(exponent: &Exponent) -> PublicKey {
    PublicKey(Residue::GENERATOR.pow(&exponent.0).to_le_bytes())
}

/// Encrypt one 256-byte block to `recipient` under a fresh sender exponent.
///
/// Plaintexts at or above `p` are reduced and will not decrypt to the
/// original bytes.
pub fn encrypt(
    plaintext: &[u8; KEY_LENGTH],
    recipient: &PublicKey,
    sender_exponent: &Exponent,
) -> Encrypted {
    let sender_key = public_key(sender_exponent);
    let mut shared = Residue::from_le_bytes(&recipient.0).pow(&sender_exponent.0);
    let ciphertext = Residue::from_le_bytes(plaintext).mul(&shared).to_le_bytes();
    shared.zeroize();

    Encrypted {
        ciphertext,
        sender_key,
    }
}

/// Decrypt one block with the recipient's exponent.
///
/// A wrong exponent or sender key yields unrelated bytes; callers detect
/// that through the packet checksum.
pub fn decrypt(
    ciphertext: &[u8; KEY_LENGTH],
    sender_key: &PublicKey,
    exponent: &Exponent,
) -> [u8; KEY_LENGTH] {
    let mut complement = order_complement(&exponent.0);
    let mut inverse = Residue::from_le_bytes(&sender_key.0).pow(&complement);
    let plaintext = Residue::from_le_bytes(ciphertext).mul(&inverse).to_le_bytes();
    complement.zeroize();
    inverse.zeroize();
    plaintext
}

fn decode_hex(text: &str) -> ElGamalResult<[u8; KEY_LENGTH]> {
    let text = text.trim();
    if text.len() != 2 * KEY_LENGTH {
        return Err(ElGamalError::InvalidLength {
            expected: KEY_LENGTH,
            got: text.len() / 2,
        });
    }
    let mut bytes = [0u8; KEY_LENGTH];
    hex::decode_to_slice(text, &mut bytes)?;
    Ok(bytes)
}
