/// Codeword extraction from an unmasked grid and block de-interleaving
use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::encoder::function_mask::FunctionMask;
use crate::encoder::placement::data_module_positions;
use crate::encoder::tables::{EcBlockInfo, total_codewords};
use crate::error::DecodeError;
use crate::models::BitMatrix;

/// Read codewords in placement order, dropping the remainder bits
pub fn extract_codewords(matrix: &BitMatrix, func: &FunctionMask) -> Vec<u8> {
    let total = total_codewords(func.version());
    let mut codewords = vec![0u8; total];
    for (k, (x, y)) in data_module_positions(func)
        .into_iter()
        .take(total * 8)
        .enumerate()
    {
        if matrix.get(x, y) {
            codewords[k / 8] |= 0x80 >> (k % 8);
        }
    }
    codewords
}

/// Undo interleaving, correct every block and return the data codewords
/// with the number of corrected codewords
pub fn deinterleave_and_correct(
    codewords: &[u8],
    info: &EcBlockInfo,
) -> Result<(Vec<u8>, usize), DecodeError> {
    if codewords.len() != info.total_codewords() {
        return Err(DecodeError::MalformedPayload(format!(
            "{} codewords for a layout of {}",
            codewords.len(),
            info.total_codewords()
        )));
    }

    let lengths: Vec<usize> = info.block_data_lengths().collect();
    let longest = lengths.iter().copied().max().unwrap_or(0);
    let mut blocks: Vec<Vec<u8>> = lengths
        .iter()
        .map(|&len| Vec::with_capacity(len + info.ecc_per_block))
        .collect();

    let mut stream = codewords.iter().copied();
    for i in 0..longest {
        for (block, &len) in blocks.iter_mut().zip(&lengths) {
            if i < len {
                block.extend(stream.next());
            }
        }
    }
    for _ in 0..info.ecc_per_block {
        for block in blocks.iter_mut() {
            block.extend(stream.next());
        }
    }

    let rs = ReedSolomonDecoder::new(info.ecc_per_block);
    let mut data = Vec::with_capacity(info.data_codewords());
    let mut corrected = 0;
    for (index, (block, &len)) in blocks.iter_mut().zip(&lengths).enumerate() {
        corrected += rs
            .decode(block)
            .ok_or(DecodeError::Uncorrectable { block: index })?;
        data.extend_from_slice(&block[..len]);
    }
    Ok((data, corrected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::reed_solomon::add_ecc_and_interleave;
    use crate::encoder::tables::ec_block_info;
    use crate::models::{ECLevel, Version};

    #[test]
    fn test_deinterleave_restores_data() {
        let version = Version::new(5).unwrap();
        let info = ec_block_info(version, ECLevel::Q);
        let data: Vec<u8> = (0..info.data_codewords() as u8).collect();
        let interleaved = add_ecc_and_interleave(&data, version, ECLevel::Q).unwrap();

        let (restored, corrected) = deinterleave_and_correct(&interleaved, &info).unwrap();
        assert_eq!(restored, data);
        assert_eq!(corrected, 0);
    }

    #[test]
    fn test_corrupted_codewords_are_corrected() {
        let version = Version::new(5).unwrap();
        let info = ec_block_info(version, ECLevel::Q);
        let data: Vec<u8> = (0..info.data_codewords() as u8).rev().collect();
        let mut interleaved = add_ecc_and_interleave(&data, version, ECLevel::Q).unwrap();
        // One error in each of the four blocks
        for pos in [0, 1, 2, 3] {
            interleaved[pos] ^= 0xFF;
        }
        let (restored, corrected) = deinterleave_and_correct(&interleaved, &info).unwrap();
        assert_eq!(restored, data);
        assert_eq!(corrected, 4);
    }

    #[test]
    fn test_uncorrectable_block_reported() {
        let info = ec_block_info(Version::MIN, ECLevel::L);
        let data = vec![0x42; info.data_codewords()];
        let mut interleaved = add_ecc_and_interleave(&data, Version::MIN, ECLevel::L).unwrap();
        // 1-L corrects 3 codewords
        for pos in 0..6 {
            interleaved[pos] ^= 0x0F;
        }
        assert_eq!(
            deinterleave_and_correct(&interleaved, &info),
            Err(DecodeError::Uncorrectable { block: 0 })
        );
    }
}
