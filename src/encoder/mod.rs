//! QR code encoding modules
//!
//! The pipeline runs in fixed stages:
//! - Input analysis into mode segments
//! - Version selection and bit stream construction
//! - Reed-Solomon error correction and interleaving
//! - Function patterns, codeword placement, masking and format/version info

use log::debug;

use crate::error::EncodeError;
use crate::models::{ECLevel, Symbol};

/// Segmentation of raw input into modes
pub mod analyzer;
/// BCH codes for format and version info
pub mod bch;
/// Segment serialization, terminator and padding
pub mod bitstream;
/// Encode options and environment tunables
pub mod config;
/// Format information encoding and placement
pub mod format;
/// Function pattern drawing and reserved-module mask
pub mod function_mask;
/// Mask patterns and penalty scoring
pub mod mask;
/// Zig-zag codeword placement
pub mod placement;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// QR specification tables (EC blocks, capacities, alignment positions)
pub mod tables;
/// Version selection and version information
pub mod version;

pub use config::EncodeOptions;

/// Run the full encoding pipeline
pub fn encode_symbol(
    data: &[u8],
    ec_level: ECLevel,
    options: &EncodeOptions,
) -> Result<Symbol, EncodeError> {
    let min_version = options.validated_min_version()?;
    let forced_mask = options.validated_mask()?;

    let choice = version::select_version(
        data,
        ec_level,
        min_version,
        options.forced_mode(),
        options.kanji_enabled(),
    )?;
    let version = choice.version;

    let capacity = tables::data_capacity_bits(version, ec_level);
    let data_codewords = bitstream::build_data_codewords(&choice.segments, version, capacity)?;
    let codewords = reed_solomon::add_ecc_and_interleave(&data_codewords, version, ec_level)?;

    let (mut modules, func) = function_mask::draw_function_patterns(version);
    placement::place_codewords(
        &mut modules,
        &func,
        &codewords,
        tables::remainder_bits(version),
    )?;

    let (mask, modules) = match forced_mask {
        Some(mask) => {
            debug!("using requested mask {}", mask.id());
            (mask, mask::finish_candidate(&modules, &func, ec_level, mask))
        }
        None => mask::select_mask(&modules, &func, version, ec_level),
    };

    debug!(
        "encoded {} bytes as version {} {:?} mask {} ({} codewords)",
        data.len(),
        version.number(),
        ec_level,
        mask.id(),
        codewords.len()
    );
    Ok(Symbol::new(version, ec_level, mask, modules))
}
