// Copyright (c) 2024 Botho Foundation

//! Polynomial arithmetic over GF(2).
//!
//! Integers and byte strings are read as polynomials whose coefficients are
//! their bits, most significant first. Addition is XOR and multiplication
//! never carries. Two flavours are provided:
//!
//! - [`fixed`]: word-sized operands, used for the packet checksum, the peer
//!   fingerprint and the random generator.
//! - [`buffer`]: arbitrary-length dividends and moduli, used by the
//!   handshake multiplexer.
//!
//! The fixed moduli shared across the overlay live in [`moduli`].

#![deny(missing_docs)]

pub mod buffer;
pub mod fixed;
pub mod moduli;

mod error;

pub use buffer::{buffer_degree, reduce_buffer};
pub use error::{PolynomialError, PolynomialResult};
pub use fixed::{degree, multiply, reduce, reduce_bytes};
