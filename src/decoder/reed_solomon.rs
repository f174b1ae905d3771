/// Reed-Solomon error correction for received codeword blocks
use crate::encoder::reed_solomon::Gf256;

/// Corrects up to `num_ecc_codewords / 2` wrong codewords per block
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks carrying `num_ecc_codewords` EC codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `received` (data followed by EC codewords) in place
    ///
    /// Returns the number of corrected codewords, or `None` when the block has
    /// more errors than the code can correct.
    pub fn decode(&self, received: &mut [u8]) -> Option<usize> {
        let n = received.len();
        if n > 255 || n < self.num_ecc_codewords {
            return None;
        }

        // Calculate syndrome
        let syndrome = self.calculate_syndrome(received);
        if syndrome.iter().all(|&s| s == 0) {
            return Some(0);
        }

        // Find error locator polynomial using Berlekamp-Massey
        let (sigma, num_errors) = self.find_error_locator(&syndrome)?;

        // Find error positions (Chien search)
        let error_positions = Self::find_error_positions(&sigma, n);
        if error_positions.len() != num_errors {
            return None;
        }

        // Find error values (Forney algorithm)
        let omega = self.find_error_evaluator(&syndrome, &sigma);
        for &pos in &error_positions {
            let x = Gf256::exp(n - 1 - pos);
            let x_inv = Gf256::div(1, x)?;
            let numerator = Gf256::mul(x, eval_low_first(&omega, x_inv));
            let denominator = eval_derivative(&sigma, x_inv);
            received[pos] ^= Gf256::div(numerator, denominator)?;
        }

        // Verify syndrome is now zero
        if self.calculate_syndrome(received).iter().any(|&s| s != 0) {
            return None;
        }
        Some(error_positions.len())
    }

    /// S_i = r(alpha^i), first byte is the highest coefficient
    fn calculate_syndrome(&self, received: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|i| {
                let alpha_i = Gf256::exp(i);
                received
                    .iter()
                    .fold(0u8, |acc, &c| Gf256::mul(acc, alpha_i) ^ c)
            })
            .collect()
    }

    /// Berlekamp-Massey; locator coefficients lowest degree first
    fn find_error_locator(&self, syndrome: &[u8]) -> Option<(Vec<u8>, usize)> {
        let mut sigma = vec![1u8];
        let mut prev = vec![1u8];
        let mut errors = 0usize;
        let mut shift = 1usize;
        let mut prev_discrepancy = 1u8;

        for k in 0..syndrome.len() {
            let mut discrepancy = syndrome[k];
            for i in 1..=errors.min(sigma.len() - 1) {
                discrepancy ^= Gf256::mul(sigma[i], syndrome[k - i]);
            }
            if discrepancy == 0 {
                shift += 1;
                continue;
            }

            let scale = Gf256::div(discrepancy, prev_discrepancy)?;
            let snapshot = sigma.clone();
            if sigma.len() < prev.len() + shift {
                sigma.resize(prev.len() + shift, 0);
            }
            for (i, &p) in prev.iter().enumerate() {
                sigma[i + shift] ^= Gf256::mul(scale, p);
            }

            if 2 * errors <= k {
                errors = k + 1 - errors;
                prev = snapshot;
                prev_discrepancy = discrepancy;
                shift = 1;
            } else {
                shift += 1;
            }
        }

        if 2 * errors > self.num_ecc_codewords {
            return None;
        }
        sigma.truncate(errors + 1);
        Some((sigma, errors))
    }

    /// Positions p whose locator X = alpha^(n-1-p) has sigma(X^-1) == 0
    fn find_error_positions(sigma: &[u8], n: usize) -> Vec<usize> {
        (0..n)
            .filter(|&pos| {
                let x_inv = Gf256::exp(255 - (n - 1 - pos) % 255);
                eval_low_first(sigma, x_inv) == 0
            })
            .collect()
    }

    /// Omega = S * sigma mod x^num_ecc_codewords
    fn find_error_evaluator(&self, syndrome: &[u8], sigma: &[u8]) -> Vec<u8> {
        let mut omega = vec![0u8; self.num_ecc_codewords];
        for (i, &s) in syndrome.iter().enumerate() {
            for (j, &c) in sigma.iter().enumerate() {
                if i + j < omega.len() {
                    omega[i + j] ^= Gf256::mul(s, c);
                }
            }
        }
        omega
    }
}

/// Evaluate a polynomial stored lowest degree first
fn eval_low_first(poly: &[u8], x: u8) -> u8 {
    poly.iter().rev().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
}

/// Formal derivative at `x`: only odd-degree terms survive in GF(2^8)
fn eval_derivative(poly: &[u8], x: u8) -> u8 {
    poly.iter()
        .enumerate()
        .skip(1)
        .step_by(2)
        .fold(0u8, |acc, (i, &c)| acc ^ Gf256::mul(c, Gf256::pow(x, i - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::reed_solomon::ReedSolomonEncoder;

    fn rs_encode(data: &[u8], num_ecc: usize) -> Vec<u8> {
        let mut codeword = data.to_vec();
        codeword.extend(ReedSolomonEncoder::new(num_ecc).unwrap().remainder(data));
        codeword
    }

    #[test]
    fn test_rs_encode_decode_no_errors() {
        let data = vec![0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut codeword = rs_encode(&data, 10);
        let decoder = ReedSolomonDecoder::new(10);
        assert_eq!(decoder.decode(&mut codeword), Some(0));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_single_error() {
        let data = vec![0x00; 10];
        let mut codeword = rs_encode(&data, 10);
        codeword[3] ^= 0xAB;

        let decoder = ReedSolomonDecoder::new(10);
        assert_eq!(decoder.decode(&mut codeword), Some(1));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_up_to_capacity() {
        let data: Vec<u8> = (0..16).map(|i| i * 7 + 3).collect();
        let clean = rs_encode(&data, 10);

        let mut codeword = clean.clone();
        for (pos, err) in [(0, 0xFF), (4, 0x42), (7, 0x13), (15, 0x01), (25, 0x80)] {
            codeword[pos] ^= err;
        }
        let decoder = ReedSolomonDecoder::new(10);
        assert_eq!(decoder.decode(&mut codeword), Some(5));
        assert_eq!(codeword, clean);
    }

    #[test]
    fn test_rs_correct_errors_at_end() {
        let data = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        let mut codeword = rs_encode(&data, 8);
        let total = codeword.len();
        codeword[total - 1] ^= 0xFF;
        codeword[total - 2] ^= 0x33;

        let decoder = ReedSolomonDecoder::new(8);
        assert_eq!(decoder.decode(&mut codeword), Some(2));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_too_many_errors() {
        let data: Vec<u8> = (0..20).collect();
        let mut codeword = rs_encode(&data, 6);
        for pos in [1, 5, 9, 13] {
            codeword[pos] ^= 0x5A;
        }
        let decoder = ReedSolomonDecoder::new(6);
        assert_eq!(decoder.decode(&mut codeword), None);
    }
}
