// Copyright (c) 2024 Botho Foundation

//! Error types for polynomial reduction.

use displaydoc::Display;
use thiserror::Error;

/// Errors raised by the buffer-oriented reduction.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum PolynomialError {
    /// Modulus has no set bits
    ZeroModulus,

    /// Remainder buffer holds {got} bytes but the modulus needs {needed}
    RemainderTooSmall {
        /// Bytes required to hold any remainder of the modulus
        needed: usize,
        /// Bytes supplied by the caller
        got: usize,
    },
}

/// Result type for polynomial operations.
pub type PolynomialResult<T> = Result<T, PolynomialError>;
