/// Format information placement (EC level + mask pattern)
use crate::models::{BitMatrix, ECLevel, MaskPattern};

use super::bch::FORMAT_CODE;

/// 15-bit masked format codeword for `ec_level` and `mask`
pub fn format_bits(ec_level: ECLevel, mask: MaskPattern) -> u16 {
    let data = (ec_level.format_bits() << 3) | mask.id();
    FORMAT_CODE.encode(data as u32) as u16
}

/// Module (x, y) holding bit `i` of the copy around the top-left finder
pub(crate) fn first_copy_position(i: usize) -> (usize, usize) {
    match i {
        0..=5 => (8, i),
        6 => (8, 7),
        7 => (8, 8),
        8 => (7, 8),
        _ => (14 - i, 8),
    }
}

/// Module (x, y) holding bit `i` of the copy split between the other finders
pub(crate) fn second_copy_position(i: usize, size: usize) -> (usize, usize) {
    if i < 8 {
        (size - 1 - i, 8)
    } else {
        (8, size - 15 + i)
    }
}

/// Write both format copies and the dark module
pub fn draw_format_info(matrix: &mut BitMatrix, ec_level: ECLevel, mask: MaskPattern) {
    let size = matrix.width();
    let bits = format_bits(ec_level, mask);
    for i in 0..15 {
        let dark = (bits >> i) & 1 == 1;
        let (x, y) = first_copy_position(i);
        matrix.set(x, y, dark);
        let (x, y) = second_copy_position(i, size);
        matrix.set(x, y, dark);
    }
    matrix.set(8, size - 8, true);
}

/// Read the two raw 15-bit format copies
pub fn read_format_copies(matrix: &BitMatrix) -> (u16, u16) {
    let size = matrix.width();
    let mut first = 0u16;
    let mut second = 0u16;
    for i in 0..15 {
        let (x, y) = first_copy_position(i);
        first |= (matrix.get(x, y) as u16) << i;
        let (x, y) = second_copy_position(i, size);
        second |= (matrix.get(x, y) as u16) << i;
    }
    (first, second)
}
