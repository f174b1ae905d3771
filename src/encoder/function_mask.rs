use crate::models::{BitMatrix, Version};

use super::format::{first_copy_position, second_copy_position};
use super::tables::alignment_pattern_positions;
use super::version::version_info_positions;

/// Function module mask for a specific QR version.
/// true = function module (not data), false = data module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMask {
    mask: BitMatrix,
    version: Version,
}

impl FunctionMask {
    /// Reserved modules of `version`
    pub fn new(version: Version) -> Self {
        draw_function_patterns(version).1
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// Version the mask was built for
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether (x, y) holds a function pattern or format/version area
    #[inline]
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Modules left for codewords and remainder bits
    pub fn data_modules_count(&self) -> usize {
        let size = self.size();
        size * size - self.mask.count_dark()
    }
}

/// Canvas that refuses to overwrite modules an earlier pattern reserved
struct PatternCanvas {
    modules: BitMatrix,
    reserved: BitMatrix,
}

impl PatternCanvas {
    fn put(&mut self, x: usize, y: usize, dark: bool) {
        let size = self.modules.width();
        if x >= size || y >= size || self.reserved.get(x, y) {
            return;
        }
        self.modules.set(x, y, dark);
        self.reserved.set(x, y, true);
    }

    /// 7x7 finder plus its light separator, clipped at the edges
    fn finder(&mut self, cx: usize, cy: usize) {
        for dy in -4isize..=4 {
            for dx in -4isize..=4 {
                let (Some(x), Some(y)) = (cx.checked_add_signed(dx), cy.checked_add_signed(dy))
                else {
                    continue;
                };
                let ring = dx.unsigned_abs().max(dy.unsigned_abs());
                self.put(x, y, ring != 2 && ring != 4);
            }
        }
    }

    fn alignment(&mut self, cx: usize, cy: usize) {
        for dy in -2isize..=2 {
            for dx in -2isize..=2 {
                let ring = dx.unsigned_abs().max(dy.unsigned_abs());
                self.put(cx.wrapping_add_signed(dx), cy.wrapping_add_signed(dy), ring != 1);
            }
        }
    }
}

/// Draw finder, timing and alignment patterns plus the dark module, and
/// reserve the format and version areas
///
/// Returns the partially drawn symbol and the mask of reserved modules.
pub fn draw_function_patterns(version: Version) -> (BitMatrix, FunctionMask) {
    let size = version.size();
    let mut canvas = PatternCanvas {
        modules: BitMatrix::square(size),
        reserved: BitMatrix::square(size),
    };

    // Finder patterns + separators
    canvas.finder(3, 3);
    canvas.finder(size - 4, 3);
    canvas.finder(3, size - 4);

    // Timing patterns (row 6 and column 6)
    for i in 0..size {
        canvas.put(6, i, i % 2 == 0);
        canvas.put(i, 6, i % 2 == 0);
    }

    // Alignment patterns, skipping the three finder corners
    let align = alignment_pattern_positions(version);
    let last = align.len().saturating_sub(1);
    for (i, &cx) in align.iter().enumerate() {
        for (j, &cy) in align.iter().enumerate() {
            if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                continue;
            }
            canvas.alignment(cx as usize, cy as usize);
        }
    }

    // Dark module
    canvas.put(8, size - 8, true);

    // Format info areas, written later
    for i in 0..15 {
        let (x, y) = first_copy_position(i);
        canvas.put(x, y, false);
        let (x, y) = second_copy_position(i, size);
        canvas.put(x, y, false);
    }

    // Version info (v7+)
    if version.number() >= 7 {
        for (a, b) in version_info_positions(size) {
            canvas.put(a, b, false);
            canvas.put(b, a, false);
        }
    }

    let mask = FunctionMask {
        mask: canvas.reserved,
        version,
    };
    (canvas.modules, mask)
}
