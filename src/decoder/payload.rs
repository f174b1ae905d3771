use crate::error::DecodeError;
use crate::models::segment::ALPHANUMERIC_TABLE;
use crate::models::{Mode, Segment, Version};

struct BitReader<'a> {
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, idx: 0 }
    }

    fn remaining(&self) -> usize {
        (self.bytes.len() * 8).saturating_sub(self.idx)
    }

    fn read_bits(&mut self, n: usize) -> Result<u32, DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::MalformedPayload(format!(
                "needed {n} bits, {} left",
                self.remaining()
            )));
        }
        let mut val = 0u32;
        for _ in 0..n {
            let bit = (self.bytes[self.idx / 8] >> (7 - self.idx % 8)) & 1;
            val = (val << 1) | bit as u32;
            self.idx += 1;
        }
        Ok(val)
    }
}

/// Parse the segment stream of corrected data codewords
///
/// Stops at the terminator (a zero mode indicator) or when fewer than four
/// bits remain.
pub fn parse_segments(
    data_codewords: &[u8],
    version: Version,
) -> Result<Vec<Segment>, DecodeError> {
    let class = version.class();
    let mut reader = BitReader::new(data_codewords);
    let mut segments = Vec::new();

    while reader.remaining() >= 4 {
        let indicator = reader.read_bits(4)? as u8;
        if indicator == 0 {
            break;
        }
        let mode = Mode::from_indicator(indicator).ok_or_else(|| {
            DecodeError::MalformedPayload(format!("unsupported mode indicator {indicator:04b}"))
        })?;
        let count = reader.read_bits(mode.char_count_bits(class))? as usize;
        let data = match mode {
            Mode::Numeric => read_numeric(&mut reader, count)?,
            Mode::Alphanumeric => read_alphanumeric(&mut reader, count)?,
            Mode::Byte => (0..count)
                .map(|_| reader.read_bits(8).map(|b| b as u8))
                .collect::<Result<Vec<u8>, _>>()?,
            Mode::Kanji => read_kanji(&mut reader, count)?,
        };
        segments.push(Segment::new(mode, data));
    }
    Ok(segments)
}

/// Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits
fn read_numeric(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>, DecodeError> {
    let mut digits = Vec::with_capacity(count);
    let mut remaining = count;
    while remaining > 0 {
        let group = remaining.min(3);
        let value = reader.read_bits(group * 3 + 1)?;
        if value >= 10u32.pow(group as u32) {
            return Err(DecodeError::MalformedPayload(format!(
                "numeric group value {value} has more than {group} digits"
            )));
        }
        let text = format!("{value:0width$}", width = group);
        digits.extend_from_slice(text.as_bytes());
        remaining -= group;
    }
    Ok(digits)
}

fn read_alphanumeric(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>, DecodeError> {
    let lookup = |value: u32| {
        ALPHANUMERIC_TABLE
            .get(value as usize)
            .copied()
            .ok_or_else(|| DecodeError::MalformedPayload(format!("alphanumeric value {value}")))
    };
    let mut chars = Vec::with_capacity(count);
    for _ in 0..count / 2 {
        let value = reader.read_bits(11)?;
        chars.push(lookup(value / 45)?);
        chars.push(lookup(value % 45)?);
    }
    if count % 2 == 1 {
        chars.push(lookup(reader.read_bits(6)?)?);
    }
    Ok(chars)
}

/// 13-bit values back to Shift-JIS byte pairs
fn read_kanji(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let val = reader.read_bits(13)?;
        let mut code = ((val / 0xC0) << 8) | (val % 0xC0);
        if code < 0x1F00 {
            code += 0x8140;
        } else {
            code += 0xC140;
        }
        bytes.push((code >> 8) as u8);
        bytes.push((code & 0xFF) as u8);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::bitstream::build_data_codewords;
    use crate::encoder::tables::data_capacity_bits;
    use crate::models::ECLevel;

    fn round_trip(segments: Vec<Segment>, version: Version) {
        let capacity = data_capacity_bits(version, ECLevel::L);
        let codewords = build_data_codewords(&segments, version, capacity).unwrap();
        assert_eq!(parse_segments(&codewords, version).unwrap(), segments);
    }

    #[test]
    fn test_hello_world_codewords() {
        let codewords = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236];
        let segments = parse_segments(&codewords, Version::MIN).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(Mode::Alphanumeric, b"HELLO WORLD".to_vec())]
        );
    }

    #[test]
    fn test_mixed_segments() {
        round_trip(
            vec![
                Segment::new(Mode::Byte, b"id=".to_vec()),
                Segment::new(Mode::Numeric, b"0042".to_vec()),
                Segment::new(Mode::Alphanumeric, b"$5.00 X".to_vec()),
                Segment::new(Mode::Kanji, vec![0x93, 0x5F, 0xE4, 0xAA]),
            ],
            Version::new(3).unwrap(),
        );
        round_trip(
            vec![Segment::new(Mode::Byte, vec![0xAB; 300])],
            Version::new(15).unwrap(),
        );
    }

    #[test]
    fn test_numeric_group_out_of_range() {
        // Numeric, count 3, then group value 1017
        let codewords = [0b0001_0000, 0b0000_1111, 0b1111_1001, 0];
        assert!(matches!(
            parse_segments(&codewords, Version::MIN),
            Err(DecodeError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_truncated_stream() {
        // Byte mode claiming 10 bytes in a 3-byte stream
        let codewords = [0b0100_0000, 0b1010_0000, 0];
        assert!(matches!(
            parse_segments(&codewords, Version::MIN),
            Err(DecodeError::MalformedPayload(_))
        ));
    }
}
