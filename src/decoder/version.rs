/// Version information extraction for versions 7+
use crate::encoder::bch::VERSION_CODE;
use crate::encoder::version::read_version_copies;
use crate::error::DecodeError;
use crate::models::{BitMatrix, Version};

/// Version info is 18 bits (6 data + 12 ECC) for versions 7-40
pub struct VersionInfo;

impl VersionInfo {
    /// Version of a square grid; from 7 upward the stored version blocks must
    /// decode to the size-derived version
    pub fn extract(matrix: &BitMatrix) -> Result<Version, DecodeError> {
        let (width, height) = (matrix.width(), matrix.height());
        let version = Version::from_size(width)
            .filter(|_| width == height)
            .ok_or(DecodeError::InvalidSize { width, height })?;
        if version.number() < 7 {
            return Ok(version);
        }

        let (top_right, bottom_left) = read_version_copies(matrix);
        let mut best: Option<(u32, u32)> = None;
        for (number, distance) in [top_right, bottom_left]
            .into_iter()
            .filter_map(|bits| VERSION_CODE.decode(bits, 7..=40))
        {
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((number, distance));
            }
        }
        match best {
            Some((number, _)) if number == version.number() as u32 => Ok(version),
            _ => Err(DecodeError::VersionInfo),
        }
    }
}
