/// BCH codes protecting format info (15,5) and version info (18,6)
use std::ops::RangeInclusive;

/// Errors both codes are guaranteed to correct (minimum distance 7 and 8)
pub const MAX_CORRECTABLE_ERRORS: u32 = 3;

/// A BCH code: data bits followed by check bits, optionally XOR-masked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BchCode {
    data_bits: u32,
    ecc_bits: u32,
    generator: u32,
    xor_mask: u32,
}

/// Format information: 5 data bits, 10 check bits, mask 0x5412
pub const FORMAT_CODE: BchCode = BchCode {
    data_bits: 5,
    ecc_bits: 10,
    generator: 0x537,
    xor_mask: 0x5412,
};

/// Version information: 6 data bits, 12 check bits, unmasked
pub const VERSION_CODE: BchCode = BchCode {
    data_bits: 6,
    ecc_bits: 12,
    generator: 0x1F25,
    xor_mask: 0,
};

impl BchCode {
    /// Codeword length in bits
    pub const fn codeword_bits(&self) -> u32 {
        self.data_bits + self.ecc_bits
    }

    /// Polynomial remainder of `data * x^ecc_bits` modulo the generator
    fn remainder(&self, data: u32) -> u32 {
        let mut rem = data;
        for _ in 0..self.ecc_bits {
            rem = (rem << 1) ^ ((rem >> (self.ecc_bits - 1)) * self.generator);
        }
        rem & ((1 << self.ecc_bits) - 1)
    }

    /// Full codeword for `data`
    pub fn encode(&self, data: u32) -> u32 {
        let data = data & ((1 << self.data_bits) - 1);
        ((data << self.ecc_bits) | self.remainder(data)) ^ self.xor_mask
    }

    /// Whether `codeword` is a valid codeword
    pub fn check(&self, codeword: u32) -> bool {
        codeword >> self.codeword_bits() == 0 && self.encode(self.data_of(codeword)) == codeword
    }

    fn data_of(&self, codeword: u32) -> u32 {
        (codeword ^ self.xor_mask) >> self.ecc_bits
    }

    /// Data value of the valid codeword nearest to `received`
    ///
    /// Only data values in `candidates` are considered. Returns `None` when the
    /// nearest one is more than [`MAX_CORRECTABLE_ERRORS`] bits away. Ties go
    /// to the smaller data value.
    pub fn decode(&self, received: u32, candidates: RangeInclusive<u32>) -> Option<(u32, u32)> {
        let mut best: Option<(u32, u32)> = None;
        for data in candidates {
            let distance = (self.encode(data) ^ received).count_ones();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((data, distance));
            }
        }
        best.filter(|&(_, distance)| distance <= MAX_CORRECTABLE_ERRORS)
    }
}
