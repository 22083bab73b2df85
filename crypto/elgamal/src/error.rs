// Copyright (c) 2024 Botho Foundation

//! Error types for ElGamal key handling.

use displaydoc::Display;
use thiserror::Error;

/// Errors that can occur when decoding ElGamal keys.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ElGamalError {
    /// Invalid hex encoding: {0}
    InvalidHex(String),

    /// Invalid key length: expected {expected} bytes, got {got}
    InvalidLength {
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        got: usize,
    },
}

impl From<hex::FromHexError> for ElGamalError {
    fn from(err: hex::FromHexError) -> Self {
        ElGamalError::InvalidHex(err.to_string())
    }
}

/// Result type for ElGamal operations.
pub type ElGamalResult<T> = Result<T, ElGamalError>;
