//! Error types for encoding and grid reading

use thiserror::Error;

use crate::models::ECLevel;

/// Errors returned by [`crate::encode`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Data cannot be represented as requested (empty input, forced mode
    /// mismatch, out-of-range option)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No version up to 40 holds the data at the requested level
    #[error(
        "data needs {required_bits} bits but the largest symbol at level {ec_level:?} holds {max_bits}"
    )]
    CapacityExceeded {
        /// Requested error correction level
        ec_level: ECLevel,
        /// Smallest encoded length found for the data
        required_bits: usize,
        /// Data capacity of version 40 at `ec_level`
        max_bits: usize,
    },

    /// Codeword or module bookkeeping went wrong; a table or algorithm bug
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Errors returned by [`crate::decoder::read`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Grid is not square or its size is not 17 + 4v
    #[error("grid of {width}x{height} modules is not a QR symbol size")]
    InvalidSize {
        /// Grid width
        width: usize,
        /// Grid height
        height: usize,
    },

    /// Neither format information copy is within correction distance
    #[error("format information is unreadable")]
    FormatInfo,

    /// Version information is unreadable or disagrees with the grid size
    #[error("version information is unreadable or inconsistent")]
    VersionInfo,

    /// A Reed-Solomon block has more errors than it can correct
    #[error("block {block} has too many errors to correct")]
    Uncorrectable {
        /// Block index in table order
        block: usize,
    },

    /// Corrected data does not parse as a segment stream
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
