/// Version selection and version information placement (versions 7-40)
use log::debug;

use crate::error::EncodeError;
use crate::models::segment::total_bit_length;
use crate::models::{BitMatrix, ECLevel, Mode, Segment, Version, VersionClass};

use super::analyzer::analyze;
use super::bch::VERSION_CODE;
use super::tables::data_capacity_bits;

/// Smallest fitting version together with the segments encoded for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChoice {
    /// Selected version
    pub version: Version,
    /// Segments analyzed for the version's class
    pub segments: Vec<Segment>,
    /// Encoded length before terminator and padding
    pub data_bits: usize,
}

/// Pick the smallest version not below `min_version` that holds `data`
///
/// Count-indicator widths change between classes, so the data is analyzed
/// once per class, starting with the class of `min_version`.
pub fn select_version(
    data: &[u8],
    ec_level: ECLevel,
    min_version: Version,
    forced_mode: Option<Mode>,
    kanji: bool,
) -> Result<VersionChoice, EncodeError> {
    let mut required_bits = None;
    for class in VersionClass::ALL {
        if class.last() < min_version {
            continue;
        }
        let segments = analyze(data, class, forced_mode, kanji)?;
        let first = class.first().max(min_version);
        let Some(bits) = total_bit_length(&segments, class.last()) else {
            debug!("{:?} versions: a segment overflows its count indicator", class);
            required_bits = Some(unbounded_bit_length(&segments, class));
            continue;
        };
        required_bits = Some(bits);
        let fitting = first
            .up_to_max()
            .take_while(|v| *v <= class.last())
            .find(|&v| data_capacity_bits(v, ec_level) >= bits);
        if let Some(version) = fitting {
            debug!(
                "selected version {} at {:?}: {} data bits of {}",
                version.number(),
                ec_level,
                bits,
                data_capacity_bits(version, ec_level)
            );
            return Ok(VersionChoice {
                version,
                segments,
                data_bits: bits,
            });
        }
        debug!("{:?} versions cannot hold {} bits at {:?}", class, bits, ec_level);
    }
    Err(EncodeError::CapacityExceeded {
        ec_level,
        required_bits: required_bits.unwrap_or_default(),
        max_bits: data_capacity_bits(Version::MAX, ec_level),
    })
}

/// Encoded length ignoring character-count limits
fn unbounded_bit_length(segments: &[Segment], class: VersionClass) -> usize {
    segments
        .iter()
        .map(|s| 4 + s.mode().char_count_bits(class) + s.mode().payload_bits(s.char_count()))
        .sum()
}

/// 18-bit version codeword, `None` below version 7
pub fn version_bits(version: Version) -> Option<u32> {
    (version.number() >= 7).then(|| VERSION_CODE.encode(version.number() as u32))
}

/// (a, b) for bit `i` in 0..18: the top-right copy sits at (x=a, y=b), the
/// bottom-left copy at (x=b, y=a)
pub(crate) fn version_info_positions(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..18).map(move |i| (size - 11 + i % 3, i / 3))
}

/// Write both version blocks; a no-op below version 7
pub fn draw_version_info(matrix: &mut BitMatrix, version: Version) {
    let Some(bits) = version_bits(version) else {
        return;
    };
    for (i, (a, b)) in version_info_positions(version.size()).enumerate() {
        let dark = (bits >> i) & 1 == 1;
        matrix.set(a, b, dark);
        matrix.set(b, a, dark);
    }
}

/// Read the top-right and bottom-left raw version copies
pub fn read_version_copies(matrix: &BitMatrix) -> (u32, u32) {
    let mut top_right = 0u32;
    let mut bottom_left = 0u32;
    for (i, (a, b)) in version_info_positions(matrix.width()).enumerate() {
        top_right |= (matrix.get(a, b) as u32) << i;
        bottom_left |= (matrix.get(b, a) as u32) << i;
    }
    (top_right, bottom_left)
}
