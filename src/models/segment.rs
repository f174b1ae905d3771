use super::{Version, VersionClass};

/// Alphanumeric character set: 0-9, A-Z, space, $%*+-./:
pub const ALPHANUMERIC_TABLE: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Data encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Digits only, 10 bits per 3 digits
    Numeric,
    /// The 45-symbol alphanumeric set, 11 bits per 2 characters
    Alphanumeric,
    /// Arbitrary bytes, 8 bits each
    Byte,
    /// Shift-JIS double-byte characters, 13 bits each
    Kanji,
}

impl Mode {
    /// All modes, narrowest first
    pub const ALL: [Mode; 4] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte, Mode::Kanji];

    /// 4-bit mode indicator
    pub const fn indicator(&self) -> u8 {
        match self {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
            Mode::Kanji => 0b1000,
        }
    }

    /// Mode for a 4-bit indicator
    pub fn from_indicator(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.indicator() == bits)
    }

    /// Width of the character-count indicator
    pub const fn char_count_bits(&self, class: VersionClass) -> usize {
        const WIDTHS: [[usize; 3]; 4] = [[10, 12, 14], [9, 11, 13], [8, 16, 16], [8, 10, 12]];
        let row = match self {
            Mode::Numeric => 0,
            Mode::Alphanumeric => 1,
            Mode::Byte => 2,
            Mode::Kanji => 3,
        };
        WIDTHS[row][class.index()]
    }

    /// Largest character count the indicator can hold in `class`
    pub const fn max_char_count(&self, class: VersionClass) -> usize {
        (1 << self.char_count_bits(class)) - 1
    }

    /// Bytes consumed per character (2 for Kanji)
    pub const fn bytes_per_char(&self) -> usize {
        match self {
            Mode::Kanji => 2,
            _ => 1,
        }
    }

    /// Payload bits for `chars` characters, excluding the segment header
    pub const fn payload_bits(&self, chars: usize) -> usize {
        match self {
            Mode::Numeric => {
                let tail = match chars % 3 {
                    0 => 0,
                    1 => 4,
                    _ => 7,
                };
                chars / 3 * 10 + tail
            }
            Mode::Alphanumeric => chars / 2 * 11 + (chars % 2) * 6,
            Mode::Byte => chars * 8,
            Mode::Kanji => chars * 13,
        }
    }
}

/// Index of `byte` in the alphanumeric table
pub fn alphanumeric_value(byte: u8) -> Option<u16> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u16),
        b'A'..=b'Z' => Some((byte - b'A') as u16 + 10),
        _ => ALPHANUMERIC_TABLE
            .iter()
            .skip(36)
            .position(|&c| c == byte)
            .map(|p| p as u16 + 36),
    }
}

/// Whether `hi lo` is a Shift-JIS double-byte character encodable in Kanji mode
pub fn is_kanji_pair(hi: u8, lo: u8) -> bool {
    let code = u16::from_be_bytes([hi, lo]);
    let in_range = (0x8140..=0x9FFC).contains(&code) || (0xE040..=0xEBBF).contains(&code);
    in_range && (0x40..=0xFC).contains(&lo) && lo != 0x7F
}

/// A run of input encoded in one mode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    mode: Mode,
    data: Vec<u8>,
}

impl Segment {
    /// Create a segment without validating `data` against `mode`
    pub fn new(mode: Mode, data: Vec<u8>) -> Self {
        Self { mode, data }
    }

    /// Encoding mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Raw input bytes covered by the segment
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Value written to the character-count indicator
    pub fn char_count(&self) -> usize {
        self.data.len() / self.mode.bytes_per_char()
    }

    /// Total bits (header + payload) at `version`, `None` if the character
    /// count does not fit the indicator
    pub fn bit_length(&self, version: Version) -> Option<usize> {
        let class = version.class();
        let chars = self.char_count();
        if chars > self.mode.max_char_count(class) {
            return None;
        }
        Some(4 + self.mode.char_count_bits(class) + self.mode.payload_bits(chars))
    }
}

/// Total bits of `segments` at `version`, `None` if any count overflows
pub fn total_bit_length(segments: &[Segment], version: Version) -> Option<usize> {
    segments
        .iter()
        .try_fold(0usize, |acc, seg| seg.bit_length(version).map(|b| acc + b))
}
