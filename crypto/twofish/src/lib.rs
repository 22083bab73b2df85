// Copyright (c) 2024 Botho Foundation

//! Twofish with 128-bit keys, and the chain mode used for packet payloads.
//!
//! Every call builds its own key schedule on the stack, so the cipher can
//! be used from any number of tasks at once.
//!
//! Chain mode is not CBC: each 16-byte block is encrypted independently
//! under `key XOR counter`, where the counter is a 16-byte little-endian
//! integer starting at zero and incremented after every block.
//!
//! ```text
//!   | p0              | p1              | ... | tail (< 16) |
//!     E(key ^ 0, p0)    E(key ^ 1, p1)          untouched
//! ```

#![deny(missing_docs)]

mod chain;
mod cipher;
mod tables;

pub use chain::{decrypt128_chain, encrypt128_chain};
pub use cipher::{decrypt128, encrypt128, Twofish128, BLOCK_LENGTH, KEY_LENGTH};
