//! Segment serialization into the data codeword stream

use crate::error::EncodeError;
use crate::models::segment::alphanumeric_value;
use crate::models::{Mode, Segment, Version};

/// Pad codewords appended alternately after the terminator
pub const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

/// Append-only big-endian bit buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Number of bits written
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bits were written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append the low `count` bits of `value`, most significant first
    pub fn append_bits(&mut self, value: u32, count: usize) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.push((value >> i) & 1 == 1);
        }
    }

    /// Append one bit
    #[inline]
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> (self.len % 8);
            }
        }
        self.len += 1;
    }

    /// Bit at `index`
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| (self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Packed bytes; a partial last byte is zero-filled
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into packed bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Append header and payload of `segment` for a symbol of `version`
pub fn write_segment(
    buffer: &mut BitBuffer,
    segment: &Segment,
    version: Version,
) -> Result<(), EncodeError> {
    let mode = segment.mode();
    let class = version.class();
    let chars = segment.char_count();
    if chars > mode.max_char_count(class) {
        return Err(EncodeError::InternalError(format!(
            "{chars} {mode:?} characters overflow the count indicator of version {}",
            version.number()
        )));
    }
    buffer.append_bits(mode.indicator() as u32, 4);
    buffer.append_bits(chars as u32, mode.char_count_bits(class));

    let data = segment.data();
    match mode {
        Mode::Numeric => {
            for group in data.chunks(3) {
                let mut value = 0u32;
                for &digit in group {
                    if !digit.is_ascii_digit() {
                        return Err(invalid_byte(mode, digit));
                    }
                    value = value * 10 + (digit - b'0') as u32;
                }
                buffer.append_bits(value, group.len() * 3 + 1);
            }
        }
        Mode::Alphanumeric => {
            for pair in data.chunks(2) {
                let mut value = 0u32;
                for &c in pair {
                    let v = alphanumeric_value(c).ok_or_else(|| invalid_byte(mode, c))?;
                    value = value * 45 + v as u32;
                }
                buffer.append_bits(value, if pair.len() == 2 { 11 } else { 6 });
            }
        }
        Mode::Byte => {
            for &byte in data {
                buffer.append_bits(byte as u32, 8);
            }
        }
        Mode::Kanji => {
            for pair in data.chunks(2) {
                let &[hi, lo] = pair else {
                    return Err(EncodeError::InvalidInput(
                        "Kanji segment has an odd byte count".to_string(),
                    ));
                };
                buffer.append_bits(kanji_value(hi, lo).ok_or_else(|| invalid_byte(mode, hi))?, 13);
            }
        }
    }
    Ok(())
}

fn invalid_byte(mode: Mode, byte: u8) -> EncodeError {
    EncodeError::InvalidInput(format!("byte 0x{byte:02X} cannot be encoded in {mode:?} mode"))
}

/// 13-bit Kanji value of a Shift-JIS pair
pub fn kanji_value(hi: u8, lo: u8) -> Option<u32> {
    if !crate::models::segment::is_kanji_pair(hi, lo) {
        return None;
    }
    let code = u16::from_be_bytes([hi, lo]) as u32;
    let offset = if code <= 0x9FFC { 0x8140 } else { 0xC140 };
    let shifted = code - offset;
    Some((shifted >> 8) * 0xC0 + (shifted & 0xFF))
}

/// Serialize `segments` and fill up to `capacity_bits` with terminator and
/// pad codewords, returning the data codewords
pub fn build_data_codewords(
    segments: &[Segment],
    version: Version,
    capacity_bits: usize,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = BitBuffer::with_capacity(capacity_bits);
    for segment in segments {
        write_segment(&mut buffer, segment, version)?;
    }
    if buffer.len() > capacity_bits {
        return Err(EncodeError::InternalError(format!(
            "{} bits exceed the {} bit capacity of version {}",
            buffer.len(),
            capacity_bits,
            version.number()
        )));
    }

    let terminator = (capacity_bits - buffer.len()).min(4);
    buffer.append_bits(0, terminator);
    let to_byte = (8 - buffer.len() % 8) % 8;
    buffer.append_bits(0, to_byte);

    let mut codewords = buffer.into_bytes();
    let target = capacity_bits / 8;
    codewords.extend(PAD_CODEWORDS.iter().cycle().take(target.saturating_sub(codewords.len())));
    Ok(codewords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::tables::data_capacity_bits;
    use crate::models::ECLevel;

    #[test]
    fn test_bit_buffer() {
        let mut buffer = BitBuffer::new();
        assert!(buffer.is_empty());
        buffer.append_bits(0b0010, 4);
        buffer.append_bits(0b000001011, 9);
        assert_eq!(buffer.len(), 13);
        assert_eq!(buffer.as_bytes(), &[0b0010_0000, 0b0101_1000]);
        assert_eq!(buffer.get(2), Some(true));
        assert_eq!(buffer.get(3), Some(false));
        assert_eq!(buffer.get(13), None);
    }

    #[test]
    fn test_hello_world_data_codewords() {
        let segments = [Segment::new(Mode::Alphanumeric, b"HELLO WORLD".to_vec())];
        let capacity = data_capacity_bits(Version::MIN, ECLevel::Q);
        let codewords = build_data_codewords(&segments, Version::MIN, capacity).unwrap();
        assert_eq!(
            codewords,
            vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236]
        );
    }

    #[test]
    fn test_numeric_groups() {
        // "01234567" at 1-M
        let segments = [Segment::new(Mode::Numeric, b"01234567".to_vec())];
        let capacity = data_capacity_bits(Version::MIN, ECLevel::M);
        let codewords = build_data_codewords(&segments, Version::MIN, capacity).unwrap();
        assert_eq!(
            codewords,
            vec![
                0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
                0xEC, 0x11
            ]
        );
    }

    #[test]
    fn test_kanji_value() {
        assert_eq!(kanji_value(0x93, 0x5F), Some(0x0D9F));
        assert_eq!(kanji_value(0xE4, 0xAA), Some(0x1AAA));
        assert_eq!(kanji_value(0x41, 0x42), None);
    }

    #[test]
    fn test_terminator_truncated_when_full() {
        // 17 bytes fill 1-L exactly except for 4 bits: 4 + 8 + 136 = 148 of 152
        let segments = [Segment::new(Mode::Byte, vec![0xFF; 17])];
        let capacity = data_capacity_bits(Version::MIN, ECLevel::L);
        let codewords = build_data_codewords(&segments, Version::MIN, capacity).unwrap();
        assert_eq!(codewords.len(), 19);
        assert_eq!(codewords[18], 0xF0);

        // 151 of 152 bits used: 1-bit terminator, no pad
        let segments = [Segment::new(Mode::Numeric, vec![b'0'; 41])];
        assert_eq!(segments[0].bit_length(Version::MIN), Some(151));
        let codewords = build_data_codewords(&segments, Version::MIN, capacity).unwrap();
        assert_eq!(codewords.len(), 19);
        assert!(!codewords.contains(&0xEC));
    }

    #[test]
    fn test_overflow_is_internal_error() {
        let segments = [Segment::new(Mode::Byte, vec![0; 20])];
        let capacity = data_capacity_bits(Version::MIN, ECLevel::L);
        let err = build_data_codewords(&segments, Version::MIN, capacity).unwrap_err();
        assert!(matches!(err, EncodeError::InternalError(_)));
    }
}
