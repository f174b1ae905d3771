//! Reed-Solomon error correction coding over GF(256)
//!
//! QR codes use the field with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//! (0x11D) and generator polynomials with roots alpha^0 .. alpha^(n-1).

use std::sync::OnceLock;

use crate::error::EncodeError;
use crate::models::{ECLevel, Version};

use super::tables::{EcBlockInfo, ec_block_info, total_codewords};

/// GF(256) field operations using log/exp tables
pub struct Gf256;

static LOG_TABLE: [u8; 256] = [
    0, 0, 1, 25, 2, 50, 26, 198, 3, 223, 51, 238, 27, 104, 199, 75, 4, 100, 224, 14, 52, 141, 239,
    129, 28, 193, 105, 248, 200, 8, 76, 113, 5, 138, 101, 47, 225, 36, 15, 33, 53, 147, 142, 218,
    240, 18, 130, 69, 29, 181, 194, 125, 106, 39, 249, 185, 201, 154, 9, 120, 77, 228, 114, 166, 6,
    191, 139, 98, 102, 221, 48, 253, 226, 152, 37, 179, 16, 145, 34, 136, 54, 208, 148, 206, 143,
    150, 219, 189, 241, 210, 19, 92, 131, 56, 70, 64, 30, 66, 182, 163, 195, 72, 126, 110, 107, 58,
    40, 84, 250, 133, 186, 61, 202, 94, 155, 159, 10, 21, 121, 43, 78, 212, 229, 172, 115, 243,
    167, 87, 7, 112, 192, 247, 140, 128, 99, 13, 103, 74, 222, 237, 49, 197, 254, 24, 227, 165,
    153, 119, 38, 184, 180, 124, 17, 68, 146, 217, 35, 32, 137, 46, 55, 63, 209, 91, 149, 188, 207,
    205, 144, 135, 151, 178, 220, 252, 190, 97, 242, 86, 211, 171, 20, 42, 93, 158, 132, 60, 57,
    83, 71, 109, 65, 162, 31, 45, 67, 216, 183, 123, 164, 118, 196, 23, 73, 236, 127, 12, 111, 246,
    108, 161, 59, 82, 41, 157, 85, 170, 251, 96, 134, 177, 187, 204, 62, 90, 203, 89, 95, 176, 156,
    169, 160, 81, 11, 245, 22, 235, 122, 117, 44, 215, 79, 174, 213, 233, 230, 231, 173, 232, 116,
    214, 244, 234, 168, 80, 88, 175,
];

static EXP_TABLE: [u8; 256] = [
    1, 2, 4, 8, 16, 32, 64, 128, 29, 58, 116, 232, 205, 135, 19, 38, 76, 152, 45, 90, 180, 117,
    234, 201, 143, 3, 6, 12, 24, 48, 96, 192, 157, 39, 78, 156, 37, 74, 148, 53, 106, 212, 181,
    119, 238, 193, 159, 35, 70, 140, 5, 10, 20, 40, 80, 160, 93, 186, 105, 210, 185, 111, 222, 161,
    95, 190, 97, 194, 153, 47, 94, 188, 101, 202, 137, 15, 30, 60, 120, 240, 253, 231, 211, 187,
    107, 214, 177, 127, 254, 225, 223, 163, 91, 182, 113, 226, 217, 175, 67, 134, 17, 34, 68, 136,
    13, 26, 52, 104, 208, 189, 103, 206, 129, 31, 62, 124, 248, 237, 199, 147, 59, 118, 236, 197,
    151, 51, 102, 204, 133, 23, 46, 92, 184, 109, 218, 169, 79, 158, 33, 66, 132, 21, 42, 84, 168,
    77, 154, 41, 82, 164, 85, 170, 73, 146, 57, 114, 228, 213, 183, 115, 230, 209, 191, 99, 198,
    145, 63, 126, 252, 229, 215, 179, 123, 246, 241, 255, 227, 219, 171, 75, 150, 49, 98, 196, 149,
    55, 110, 220, 165, 87, 174, 65, 130, 25, 50, 100, 200, 141, 7, 14, 28, 56, 112, 224, 221, 167,
    83, 166, 81, 162, 89, 178, 121, 242, 249, 239, 195, 155, 43, 86, 172, 69, 138, 9, 18, 36, 72,
    144, 61, 122, 244, 245, 247, 243, 251, 235, 203, 139, 11, 22, 44, 88, 176, 125, 250, 233, 207,
    131, 27, 54, 108, 216, 173, 71, 142, 1,
];

impl Gf256 {
    /// Product of `a` and `b`
    #[inline]
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[(log_a + log_b) % 255]
    }

    /// Quotient `a / b`, `None` when `b` is zero
    #[inline]
    pub fn div(a: u8, b: u8) -> Option<u8> {
        if b == 0 {
            return None;
        }
        if a == 0 {
            return Some(0);
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        Some(EXP_TABLE[(log_a + 255 - log_b) % 255])
    }

    /// alpha^n for any exponent
    #[inline]
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// a^n
    pub fn pow(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        EXP_TABLE[(log_a * (n % 255)) % 255]
    }
}

/// Largest EC codewords-per-block value in the tables
pub const MAX_ECC_DEGREE: usize = 30;

static GENERATORS: OnceLock<[Vec<u8>; MAX_ECC_DEGREE + 1]> = OnceLock::new();

/// Generator polynomial of `degree`, highest coefficient first, leading 1 omitted
fn build_generator(degree: usize) -> Vec<u8> {
    if degree == 0 {
        return Vec::new();
    }
    let mut coefficients = vec![0u8; degree];
    coefficients[degree - 1] = 1;
    let mut root = 1u8;
    for _ in 0..degree {
        // Multiply by (x - root)
        for j in 0..degree {
            coefficients[j] = Gf256::mul(coefficients[j], root);
            if j + 1 < degree {
                coefficients[j] ^= coefficients[j + 1];
            }
        }
        root = Gf256::mul(root, 0x02);
    }
    coefficients
}

/// Reed-Solomon encoder for one EC codeword count
pub struct ReedSolomonEncoder {
    generator: &'static [u8],
}

impl ReedSolomonEncoder {
    /// Encoder producing `degree` EC codewords per block
    pub fn new(degree: usize) -> Result<Self, EncodeError> {
        let generators = GENERATORS.get_or_init(|| std::array::from_fn(build_generator));
        let generator = generators.get(degree).ok_or_else(|| {
            EncodeError::InternalError(format!("no generator polynomial of degree {degree}"))
        })?;
        Ok(Self { generator })
    }

    /// Number of EC codewords produced
    pub fn degree(&self) -> usize {
        self.generator.len()
    }

    /// Generator coefficients below the leading term, highest first
    pub fn generator(&self) -> &[u8] {
        self.generator
    }

    /// Remainder of `data * x^degree` divided by the generator
    pub fn remainder(&self, data: &[u8]) -> Vec<u8> {
        let degree = self.degree();
        let mut result = vec![0u8; degree];
        if degree == 0 {
            return result;
        }
        for &byte in data {
            let factor = byte ^ result[0];
            result.rotate_left(1);
            result[degree - 1] = 0;
            for (r, &g) in result.iter_mut().zip(self.generator) {
                *r ^= Gf256::mul(g, factor);
            }
        }
        result
    }
}

/// Data codewords of one block plus their EC codewords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodewordBlock {
    /// Data codewords
    pub data: Vec<u8>,
    /// Reed-Solomon EC codewords
    pub ecc: Vec<u8>,
}

/// Split padded data codewords into blocks and compute their EC codewords
pub fn encode_blocks(data: &[u8], info: &EcBlockInfo) -> Result<Vec<CodewordBlock>, EncodeError> {
    if data.len() != info.data_codewords() {
        return Err(EncodeError::InternalError(format!(
            "{} data codewords for a layout holding {}",
            data.len(),
            info.data_codewords()
        )));
    }
    let rs = ReedSolomonEncoder::new(info.ecc_per_block)?;
    let mut blocks = Vec::with_capacity(info.num_blocks());
    let mut rest = data;
    for len in info.block_data_lengths() {
        let (block, tail) = rest.split_at(len);
        rest = tail;
        blocks.push(CodewordBlock {
            data: block.to_vec(),
            ecc: rs.remainder(block),
        });
    }
    Ok(blocks)
}

/// Column-wise interleave: data codewords of all blocks, then EC codewords
pub fn interleave(blocks: &[CodewordBlock]) -> Vec<u8> {
    let total = blocks.iter().map(|b| b.data.len() + b.ecc.len()).sum();
    let mut out = Vec::with_capacity(total);
    let longest_data = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
    for i in 0..longest_data {
        out.extend(blocks.iter().filter_map(|b| b.data.get(i)));
    }
    let longest_ecc = blocks.iter().map(|b| b.ecc.len()).max().unwrap_or(0);
    for i in 0..longest_ecc {
        out.extend(blocks.iter().filter_map(|b| b.ecc.get(i)));
    }
    out
}

/// Full error correction stage: blocks, EC codewords, interleaving
pub fn add_ecc_and_interleave(
    data: &[u8],
    version: Version,
    ec_level: ECLevel,
) -> Result<Vec<u8>, EncodeError> {
    let info = ec_block_info(version, ec_level);
    let blocks = encode_blocks(data, &info)?;
    let codewords = interleave(&blocks);
    let expected = total_codewords(version);
    if codewords.len() != expected {
        return Err(EncodeError::InternalError(format!(
            "interleaved {} codewords, version {} holds {}",
            codewords.len(),
            version.number(),
            expected
        )));
    }
    Ok(codewords)
}
