/// Format information extraction from a module grid
use crate::encoder::bch::FORMAT_CODE;
use crate::encoder::format::read_format_copies;
use crate::error::DecodeError;
use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// Format info is 15 bits (5 data + 10 ECC), stored twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Mask applied to the data modules
    pub mask_pattern: MaskPattern,
}

impl FormatInfo {
    /// Decode whichever copy is closer to a valid codeword
    pub fn extract(matrix: &BitMatrix) -> Result<Self, DecodeError> {
        let (first, second) = read_format_copies(matrix);
        let candidates = [first, second]
            .into_iter()
            .filter_map(|bits| FORMAT_CODE.decode(bits as u32, 0..=31));
        let mut best: Option<(u32, u32)> = None;
        for (data, distance) in candidates {
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((data, distance));
            }
        }
        let (data, _) = best.ok_or(DecodeError::FormatInfo)?;
        Self::from_data(data)
    }

    fn from_data(data: u32) -> Result<Self, DecodeError> {
        let ec_level = ECLevel::from_format_bits((data >> 3) as u8);
        let mask_pattern =
            MaskPattern::from_bits((data & 0x07) as u8).ok_or(DecodeError::FormatInfo)?;
        Ok(Self {
            ec_level,
            mask_pattern,
        })
    }
}
