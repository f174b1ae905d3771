//! qrcodeine - QR code symbol encoder in pure Rust
//!
//! Turns bytes into a QR Model 2 symbol (versions 1-40, levels L/M/Q/H):
//! optimal mode segmentation, Reed-Solomon error correction, module placement
//! and penalty-based mask selection. The output is the module grid only;
//! rendering is left to the caller.
//!
//! ```
//! use qrcodeine::{ECLevel, encode};
//!
//! let symbol = encode("HELLO WORLD", ECLevel::Q).unwrap();
//! assert_eq!(symbol.size(), 21);
//! let top_left_dark = symbol.is_dark(0, 0);
//! assert!(top_left_dark);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Grid reader (format/version info, unmasking, error correction, payload)
pub mod decoder;
/// Encoding pipeline (analysis, bit stream, error correction, placement, masking)
pub mod encoder;
/// Error types
pub mod error;
/// Core data structures (Symbol, BitMatrix, Segment, Version, etc.)
pub mod models;

pub use decoder::{DecodedSymbol, read};
pub use encoder::EncodeOptions;
pub use error::{DecodeError, EncodeError};
pub use models::{BitMatrix, ECLevel, MaskPattern, Mode, Segment, Symbol, Version};

/// Encode `data` at `ec_level` with automatic mode, version and mask
///
/// # Arguments
/// * `data` - Text or raw bytes
/// * `ec_level` - Error correction level
///
/// # Returns
/// The smallest symbol holding the data, or
/// [`EncodeError::CapacityExceeded`] when version 40 is too small
pub fn encode(data: impl AsRef<[u8]>, ec_level: ECLevel) -> Result<Symbol, EncodeError> {
    encode_with_options(data, ec_level, &EncodeOptions::default())
}

/// Encode `data` at `ec_level` with caller-supplied options
///
/// Out-of-range `min_version` or `mask` values and data the forced mode
/// cannot represent fail with [`EncodeError::InvalidInput`].
pub fn encode_with_options(
    data: impl AsRef<[u8]>,
    ec_level: ECLevel,
    options: &EncodeOptions,
) -> Result<Symbol, EncodeError> {
    encoder::encode_symbol(data.as_ref(), ec_level, options)
}

/// Reusable encoder with a fixed level and option set
///
/// # Example
/// ```
/// use qrcodeine::{ECLevel, EncodeOptions, Encoder};
///
/// let encoder = Encoder::with_options(ECLevel::H, EncodeOptions::new().min_version(4));
/// let symbol = encoder.encode(b"batch item 1").unwrap();
/// assert_eq!(symbol.version().number(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    ec_level: ECLevel,
    options: EncodeOptions,
}

impl Encoder {
    /// Create an encoder with default options
    pub fn new(ec_level: ECLevel) -> Self {
        Self {
            ec_level,
            options: EncodeOptions::default(),
        }
    }

    /// Create an encoder with specific options
    pub fn with_options(ec_level: ECLevel, options: EncodeOptions) -> Self {
        Self { ec_level, options }
    }

    /// Error correction level used for every symbol
    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    /// Options used for every symbol
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encode one input
    pub fn encode(&self, data: impl AsRef<[u8]>) -> Result<Symbol, EncodeError> {
        encode_with_options(data, self.ec_level, &self.options)
    }
}

/// Level L, the lowest-overhead level
impl Default for Encoder {
    fn default() -> Self {
        Self::new(ECLevel::L)
    }
}
