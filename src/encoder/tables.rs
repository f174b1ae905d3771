//! Static QR Model 2 tables: error correction layout, capacities, alignment
//! pattern centers.

use crate::models::{ECLevel, Version};

// Index: [ec_level][version], column 0 unused.
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

// Alignment pattern center coordinates, indexed by version.
const ALIGNMENT_PATTERN_POSITIONS: [&[u8]; 41] = [
    &[],
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

/// Blocks of one size within a version/EC-level layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGroup {
    /// Number of blocks in the group (may be 0 for the second group)
    pub count: usize,
    /// Data codewords in each block of the group
    pub data_per_block: usize,
}

/// Error correction block layout for one version and level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlockInfo {
    /// EC codewords appended to every block
    pub ecc_per_block: usize,
    /// Short blocks first, then blocks with one extra data codeword
    pub groups: [BlockGroup; 2],
}

impl EcBlockInfo {
    /// Total number of blocks
    pub fn num_blocks(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Data codewords over all blocks
    pub fn data_codewords(&self) -> usize {
        self.groups.iter().map(|g| g.count * g.data_per_block).sum()
    }

    /// EC codewords over all blocks
    pub fn ecc_codewords(&self) -> usize {
        self.num_blocks() * self.ecc_per_block
    }

    /// Data + EC codewords
    pub fn total_codewords(&self) -> usize {
        self.data_codewords() + self.ecc_codewords()
    }

    /// Data codeword count of every block, in table order
    pub fn block_data_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups
            .iter()
            .flat_map(|g| std::iter::repeat_n(g.data_per_block, g.count))
    }
}

/// Block layout for `version` at `ec_level`
pub fn ec_block_info(version: Version, ec_level: ECLevel) -> EcBlockInfo {
    let v = version.number() as usize;
    let idx = ec_level.ordinal();
    let ecc = ECC_CODEWORDS_PER_BLOCK[idx][v] as usize;
    let blocks = NUM_ERROR_CORRECTION_BLOCKS[idx][v] as usize;

    let total = total_codewords(version);
    let long_blocks = total % blocks;
    let short_data = total / blocks - ecc;
    EcBlockInfo {
        ecc_per_block: ecc,
        groups: [
            BlockGroup {
                count: blocks - long_blocks,
                data_per_block: short_data,
            },
            BlockGroup {
                count: long_blocks,
                data_per_block: short_data + 1,
            },
        ],
    }
}

/// Modules available for codewords and remainder bits, after all function
/// patterns and format/version areas are excluded
pub fn raw_data_modules(version: Version) -> usize {
    let v = version.number() as usize;
    let mut result = (16 * v + 128) * v + 64;
    if v >= 2 {
        let num_align = v / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if v >= 7 {
            result -= 36;
        }
    }
    result
}

/// Total codewords (data + EC) of `version`
pub fn total_codewords(version: Version) -> usize {
    raw_data_modules(version) / 8
}

/// Zero bits placed after the last codeword (0, 3, 4 or 7)
pub fn remainder_bits(version: Version) -> usize {
    raw_data_modules(version) % 8
}

/// Data codewords of `version` at `ec_level`
pub fn data_codewords(version: Version, ec_level: ECLevel) -> usize {
    let v = version.number() as usize;
    let idx = ec_level.ordinal();
    total_codewords(version)
        - ECC_CODEWORDS_PER_BLOCK[idx][v] as usize * NUM_ERROR_CORRECTION_BLOCKS[idx][v] as usize
}

/// Data capacity in bits of `version` at `ec_level`
pub fn data_capacity_bits(version: Version, ec_level: ECLevel) -> usize {
    data_codewords(version, ec_level) * 8
}

/// Alignment pattern center coordinates for `version`
pub fn alignment_pattern_positions(version: Version) -> &'static [u8] {
    ALIGNMENT_PATTERN_POSITIONS[version.number() as usize]
}
