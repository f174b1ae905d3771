//! Mask application, penalty scoring and mask selection

use log::{debug, trace};
use rayon::prelude::*;

use crate::models::{BitMatrix, ECLevel, MaskPattern, Version};

use super::config::{parallel_mask_min_version, parallel_masks};
use super::format::draw_format_info;
use super::function_mask::FunctionMask;
use super::version::draw_version_info;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

const FINDER_LIKE: [bool; 11] = [
    true, false, true, true, true, false, true, false, false, false, false,
];

/// XOR `mask_pattern` into every data module; applying it twice restores the grid
pub fn apply_mask(matrix: &mut BitMatrix, mask_pattern: MaskPattern, func: &FunctionMask) {
    let width = matrix.width();
    let height = matrix.height();

    for y in 0..height {
        for x in 0..width {
            if !func.is_function(x, y) && mask_pattern.is_masked(y, x) {
                matrix.toggle(x, y);
            }
        }
    }
}

/// Runs of five or more same-colour modules: 3 + (length - 5) each
fn run_penalty(line: &[bool]) -> u32 {
    let mut score = 0;
    let mut run = 0u32;
    let mut previous = None;
    for &module in line {
        if previous == Some(module) {
            run += 1;
        } else {
            if run >= 5 {
                score += PENALTY_N1 + run - 5;
            }
            run = 1;
            previous = Some(module);
        }
    }
    if run >= 5 {
        score += PENALTY_N1 + run - 5;
    }
    score
}

/// 1:1:3:1:1 finder-like windows with four light modules on one side
fn finder_penalty(line: &[bool]) -> u32 {
    line.windows(FINDER_LIKE.len())
        .filter(|w| w.iter().eq(FINDER_LIKE.iter()) || w.iter().eq(FINDER_LIKE.iter().rev()))
        .count() as u32
        * PENALTY_N3
}

/// Total penalty of a finished candidate symbol
pub fn penalty_score(matrix: &BitMatrix) -> u32 {
    let size = matrix.width();
    let lines: Vec<Vec<bool>> = (0..size)
        .map(|y| matrix.row(y))
        .chain((0..size).map(|x| matrix.column(x)))
        .collect();

    let runs: u32 = lines.iter().map(|l| run_penalty(l)).sum();
    let finders: u32 = lines.iter().map(|l| finder_penalty(l)).sum();

    let mut blocks = 0;
    for y in 0..size.saturating_sub(1) {
        for x in 0..size.saturating_sub(1) {
            let c = matrix.get(x, y);
            if c == matrix.get(x + 1, y) && c == matrix.get(x, y + 1) && c == matrix.get(x + 1, y + 1)
            {
                blocks += PENALTY_N2;
            }
        }
    }

    let total = size * size;
    let balance = if total == 0 {
        0
    } else {
        let dark = matrix.count_dark();
        ((dark * 20).abs_diff(total * 10) / total) as u32 * PENALTY_N4
    };

    runs + blocks + finders + balance
}

/// Masked copy of `modules` with format and version info drawn
pub fn finish_candidate(
    modules: &BitMatrix,
    func: &FunctionMask,
    ec_level: ECLevel,
    mask: MaskPattern,
) -> BitMatrix {
    let mut candidate = modules.clone();
    apply_mask(&mut candidate, mask, func);
    draw_format_info(&mut candidate, ec_level, mask);
    draw_version_info(&mut candidate, func.version());
    candidate
}

fn score_candidate(
    modules: &BitMatrix,
    func: &FunctionMask,
    ec_level: ECLevel,
    mask: MaskPattern,
) -> (MaskPattern, u32, BitMatrix) {
    let candidate = finish_candidate(modules, func, ec_level, mask);
    let score = penalty_score(&candidate);
    trace!("mask {} penalty {}", mask.id(), score);
    (mask, score, candidate)
}

/// Evaluate all eight masks and keep the lowest penalty
///
/// Ties keep the lower mask id. Scoring may run on the rayon pool for larger
/// versions; the comparison is always an ascending sequential fold.
pub fn select_mask(
    modules: &BitMatrix,
    func: &FunctionMask,
    version: Version,
    ec_level: ECLevel,
) -> (MaskPattern, BitMatrix) {
    let parallel =
        parallel_masks() && version.number() as usize >= parallel_mask_min_version();
    select_mask_with(modules, func, ec_level, parallel)
}

/// Mask selection with the scoring strategy fixed by the caller
pub(crate) fn select_mask_with(
    modules: &BitMatrix,
    func: &FunctionMask,
    ec_level: ECLevel,
    parallel: bool,
) -> (MaskPattern, BitMatrix) {
    let scored: Vec<(MaskPattern, u32, BitMatrix)> = if parallel {
        MaskPattern::ALL
            .par_iter()
            .map(|&mask| score_candidate(modules, func, ec_level, mask))
            .collect()
    } else {
        MaskPattern::ALL
            .iter()
            .map(|&mask| score_candidate(modules, func, ec_level, mask))
            .collect()
    };

    let mut best: Option<(MaskPattern, u32, BitMatrix)> = None;
    for entry in scored {
        if best.as_ref().is_none_or(|(_, score, _)| entry.1 < *score) {
            best = Some(entry);
        }
    }
    match best {
        Some((mask, score, matrix)) => {
            debug!("selected mask {} with penalty {}", mask.id(), score);
            (mask, matrix)
        }
        // MaskPattern::ALL is never empty
        None => (
            MaskPattern::Pattern0,
            finish_candidate(modules, func, ec_level, MaskPattern::Pattern0),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::function_mask::draw_function_patterns;
    use crate::encoder::placement::place_codewords;
    use crate::encoder::tables::{remainder_bits, total_codewords};

    fn line(s: &str) -> Vec<bool> {
        s.bytes().map(|b| b == b'1').collect()
    }

    #[test]
    fn test_apply_mask_skips_function_modules() {
        let func = FunctionMask::new(Version::MIN);
        let mut matrix = BitMatrix::square(21);
        apply_mask(&mut matrix, MaskPattern::Pattern0, &func);
        // (10, 10): data module, (10 + 10) % 2 == 0
        assert!(matrix.get(10, 10));
        assert!(!matrix.get(11, 10));
        // Finder corner untouched
        assert!(!matrix.get(0, 0));

        apply_mask(&mut matrix, MaskPattern::Pattern0, &func);
        assert_eq!(matrix.count_dark(), 0);
    }

    #[test]
    fn test_run_penalty() {
        assert_eq!(run_penalty(&line("1111")), 0);
        assert_eq!(run_penalty(&line("11111")), 3);
        assert_eq!(run_penalty(&line("0000000")), 5);
        assert_eq!(run_penalty(&line("111110000001")), 3 + 4);
    }

    #[test]
    fn test_finder_penalty() {
        assert_eq!(finder_penalty(&line("10111010000")), 40);
        assert_eq!(finder_penalty(&line("00001011101")), 40);
        assert_eq!(finder_penalty(&line("000010111010000")), 80);
        assert_eq!(finder_penalty(&line("1011101")), 0);
    }

    #[test]
    fn test_balance_penalty() {
        // All light 21x21: rule 4 gives 100, plus runs and blocks
        let matrix = BitMatrix::square(21);
        let runs = 42 * (3 + 16);
        let blocks = 20 * 20 * 3;
        assert_eq!(penalty_score(&matrix), runs + blocks + 100);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let (modules, func) = draw_function_patterns(Version::MIN);
        let (a, grid_a) = select_mask(&modules, &func, Version::MIN, ECLevel::M);
        let (b, grid_b) = select_mask(&modules, &func, Version::MIN, ECLevel::M);
        assert_eq!(a, b);
        assert_eq!(grid_a, grid_b);

        // The winner scores no worse than any other candidate
        let best = penalty_score(&grid_a);
        for mask in MaskPattern::ALL {
            let other = penalty_score(&finish_candidate(&modules, &func, ECLevel::M, mask));
            assert!(best <= other);
            if other == best {
                assert!(a <= mask);
            }
        }
    }

    #[test]
    fn test_parallel_and_sequential_scoring_agree() {
        for number in [10u8, 23, 40] {
            let version = Version::new(number).unwrap();
            let (mut modules, func) = draw_function_patterns(version);
            let codewords: Vec<u8> = (0..total_codewords(version))
                .map(|i| (i as u32).wrapping_mul(2_654_435_761).rotate_left(11) as u8)
                .collect();
            place_codewords(&mut modules, &func, &codewords, remainder_bits(version)).unwrap();

            for ec_level in [ECLevel::L, ECLevel::H] {
                let sequential = select_mask_with(&modules, &func, ec_level, false);
                let parallel = select_mask_with(&modules, &func, ec_level, true);
                assert_eq!(sequential.0, parallel.0, "version {}", number);
                assert_eq!(sequential.1, parallel.1, "version {}", number);
                assert_eq!(select_mask(&modules, &func, version, ec_level), sequential);
            }
        }

        // Empty data area: many masks tie, both paths keep the same one
        let version = Version::new(12).unwrap();
        let (modules, func) = draw_function_patterns(version);
        assert_eq!(
            select_mask_with(&modules, &func, ECLevel::Q, true),
            select_mask_with(&modules, &func, ECLevel::Q, false)
        );
    }
}
