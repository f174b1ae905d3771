//! QR symbol grid reading
//!
//! Reads a module grid (as produced by the encoder, or sampled by any other
//! means) back into its payload:
//! - Version from the size and, for versions 7+, the version blocks
//! - Format information (EC level, mask pattern)
//! - Unmasking, codeword extraction and block de-interleaving
//! - Reed-Solomon correction and segment parsing

use log::debug;

use crate::encoder::function_mask::FunctionMask;
use crate::encoder::mask::apply_mask;
use crate::encoder::tables::ec_block_info;
use crate::error::DecodeError;
use crate::models::{BitMatrix, ECLevel, MaskPattern, Segment, Version};

/// Codeword extraction and block de-interleaving
pub mod bitstream;
/// Format information extraction (mask pattern, EC level)
pub mod format;
/// Segment stream parsing (numeric, alphanumeric, byte, kanji)
pub mod payload;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Version information extraction (versions 7-40)
pub mod version;

use format::FormatInfo;
use version::VersionInfo;

/// Contents recovered from a symbol grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Symbol version
    pub version: Version,
    /// Error correction level from the format information
    pub ec_level: ECLevel,
    /// Mask pattern from the format information
    pub mask_pattern: MaskPattern,
    /// Segments in stream order
    pub segments: Vec<Segment>,
    /// Concatenated segment bytes
    pub data: Vec<u8>,
    /// Codewords repaired by error correction
    pub corrected: usize,
}

/// Read a square module grid (`true` = dark, `(x, y)` = `(column, row)`)
pub fn read(matrix: &BitMatrix) -> Result<DecodedSymbol, DecodeError> {
    let version = VersionInfo::extract(matrix)?;
    let format = FormatInfo::extract(matrix)?;

    let func = FunctionMask::new(version);
    let mut unmasked = matrix.clone();
    apply_mask(&mut unmasked, format.mask_pattern, &func);

    let codewords = bitstream::extract_codewords(&unmasked, &func);
    let info = ec_block_info(version, format.ec_level);
    let (data_codewords, corrected) = bitstream::deinterleave_and_correct(&codewords, &info)?;

    let segments = payload::parse_segments(&data_codewords, version)?;
    let data: Vec<u8> = segments.iter().flat_map(|s| s.data().iter().copied()).collect();
    debug!(
        "read version {} {:?} mask {}: {} segments, {} bytes, {} corrected codewords",
        version.number(),
        format.ec_level,
        format.mask_pattern.id(),
        segments.len(),
        data.len(),
        corrected
    );

    Ok(DecodedSymbol {
        version,
        ec_level: format.ec_level,
        mask_pattern: format.mask_pattern,
        segments,
        data,
        corrected,
    })
}
