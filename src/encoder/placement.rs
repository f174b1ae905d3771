//! Zig-zag placement of codeword bits into the data modules

use crate::error::EncodeError;
use crate::models::BitMatrix;

use super::function_mask::FunctionMask;

/// Data module coordinates (x, y) in bit placement order
///
/// Column pairs are walked right to left starting at the bottom-right
/// corner, alternating upward and downward; column 6 (vertical timing) is
/// skipped entirely.
pub fn data_module_positions(func: &FunctionMask) -> Vec<(usize, usize)> {
    let size = func.size();
    let mut positions = Vec::with_capacity(func.data_modules_count());
    let mut right = size as isize - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let upward = ((right + 1) & 2) == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let x = (right - j) as usize;
                if !func.is_function(x, y) {
                    positions.push((x, y));
                }
            }
        }
        right -= 2;
    }
    positions
}

/// Write `codewords` (MSB first) followed by `remainder_bits` zero bits
///
/// The bit count must equal the number of data modules exactly.
pub fn place_codewords(
    modules: &mut BitMatrix,
    func: &FunctionMask,
    codewords: &[u8],
    remainder_bits: usize,
) -> Result<(), EncodeError> {
    let positions = data_module_positions(func);
    let bits = codewords.len() * 8 + remainder_bits;
    if positions.len() != bits {
        return Err(EncodeError::InternalError(format!(
            "{} codeword bits for {} data modules",
            bits,
            positions.len()
        )));
    }
    for (k, &(x, y)) in positions.iter().enumerate() {
        let dark = codewords
            .get(k / 8)
            .is_some_and(|&cw| (cw >> (7 - k % 8)) & 1 == 1);
        modules.set(x, y, dark);
    }
    Ok(())
}
