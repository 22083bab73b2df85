// Copyright (c) 2024 Botho Foundation

//! ElGamal over the 2048-bit safe prime `p = 2^2048 - 1942289`, `g = 2`.
//!
//! Every value on the wire is 256 bytes, little-endian.
//!
//! ```text
//! sender (fresh s)                     recipient (x, Y = g^x)
//!   S      = g^s
//!   shared = Y^s
//!   c      = m * shared      -- c, S -->   m = c * S^(q - x)
//! ```
//!
//! `S^q = 1` for every non-zero `S`, so `S^(q - x)` is the inverse of the
//! shared value. A sender exponent must never be reused: the ciphertexts
//! of one broadcast would become linkable across recipients.

mod error;
mod field;
mod keys;

pub use error::{ElGamalError, ElGamalResult};
pub use field::KEY_LENGTH;
pub use keys::{decrypt, encrypt, public_key, Encrypted, Exponent, KeyPair, PublicKey};
