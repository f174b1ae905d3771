use super::BitMatrix;

/// QR code version (1-40, Model 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    /// Smallest symbol, 21x21 modules
    pub const MIN: Version = Version(1);
    /// Largest symbol, 177x177 modules
    pub const MAX: Version = Version(40);

    /// Create a version, `None` outside 1..=40
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= 40 {
            Some(Version(number))
        } else {
            None
        }
    }

    /// Get the version number (1-40)
    pub const fn number(&self) -> u8 {
        self.0
    }

    /// Get the size in modules (width = height)
    pub const fn size(&self) -> usize {
        4 * self.0 as usize + 17
    }

    /// Version whose symbol is `size` modules wide
    pub fn from_size(size: usize) -> Option<Self> {
        if size < 21 || (size - 17) % 4 != 0 {
            return None;
        }
        u8::try_from((size - 17) / 4).ok().and_then(Self::new)
    }

    /// Character-count width class this version belongs to
    pub const fn class(&self) -> VersionClass {
        match self.0 {
            0..=9 => VersionClass::Small,
            10..=26 => VersionClass::Medium,
            _ => VersionClass::Large,
        }
    }

    /// Next larger version, `None` after 40
    pub const fn next(&self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// Iterate over every version from `self` to 40
    pub fn up_to_max(self) -> impl Iterator<Item = Version> {
        (self.0..=40).map(Version)
    }
}

/// Version ranges sharing the same character-count indicator widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionClass {
    /// Versions 1-9
    Small,
    /// Versions 10-26
    Medium,
    /// Versions 27-40
    Large,
}

impl VersionClass {
    /// All classes in ascending order
    pub const ALL: [VersionClass; 3] = [
        VersionClass::Small,
        VersionClass::Medium,
        VersionClass::Large,
    ];

    /// First version of the class
    pub const fn first(&self) -> Version {
        match self {
            VersionClass::Small => Version(1),
            VersionClass::Medium => Version(10),
            VersionClass::Large => Version(27),
        }
    }

    /// Last version of the class
    pub const fn last(&self) -> Version {
        match self {
            VersionClass::Small => Version(9),
            VersionClass::Medium => Version(26),
            VersionClass::Large => Version(40),
        }
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            VersionClass::Small => 0,
            VersionClass::Medium => 1,
            VersionClass::Large => 2,
        }
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L = 0,
    /// Medium (~15% recovery capacity)
    M = 1,
    /// Quartile (~25% recovery capacity)
    Q = 2,
    /// High (~30% recovery capacity)
    H = 3,
}

impl ECLevel {
    /// All levels, weakest first
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    /// Position in the L, M, Q, H ordering (table index)
    pub const fn ordinal(&self) -> usize {
        *self as usize
    }

    /// Two-bit value stored in the format information (L=01, M=00, Q=11, H=10)
    pub const fn format_bits(&self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }

    /// Inverse of [`ECLevel::format_bits`]
    pub const fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaskPattern {
    /// (i + j) % 2 == 0
    Pattern0 = 0,
    /// i % 2 == 0
    Pattern1 = 1,
    /// j % 3 == 0
    Pattern2 = 2,
    /// (i + j) % 3 == 0
    Pattern3 = 3,
    /// (i/2 + j/3) % 2 == 0
    Pattern4 = 4,
    /// (i*j)%2 + (i*j)%3 == 0
    Pattern5 = 5,
    /// ((i*j)%2 + (i*j)%3) % 2 == 0
    Pattern6 = 6,
    /// ((i+j)%2 + (i*j)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// All patterns in ascending id order (the evaluation order)
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern::Pattern0,
        MaskPattern::Pattern1,
        MaskPattern::Pattern2,
        MaskPattern::Pattern3,
        MaskPattern::Pattern4,
        MaskPattern::Pattern5,
        MaskPattern::Pattern6,
        MaskPattern::Pattern7,
    ];

    /// Get mask pattern from its 3-bit id
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    /// The 3-bit id
    pub const fn id(&self) -> u8 {
        *self as u8
    }

    /// Check if module at (i = row, j = column) is flipped by this mask
    #[inline]
    pub fn is_masked(&self, i: usize, j: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (i + j) % 2 == 0,
            MaskPattern::Pattern1 => i % 2 == 0,
            MaskPattern::Pattern2 => j % 3 == 0,
            MaskPattern::Pattern3 => (i + j) % 3 == 0,
            MaskPattern::Pattern4 => (i / 2 + j / 3) % 2 == 0,
            MaskPattern::Pattern5 => ((i * j) % 2 + (i * j) % 3) == 0,
            MaskPattern::Pattern6 => (((i * j) % 2) + ((i * j) % 3)) % 2 == 0,
            MaskPattern::Pattern7 => (((i + j) % 2) + ((i * j) % 3)) % 2 == 0,
        }
    }
}

/// A finished QR symbol
///
/// Immutable once built by the encoder. Rendering is left to the caller, who
/// only needs [`Symbol::size`] and [`Symbol::is_dark`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    version: Version,
    ec_level: ECLevel,
    mask_pattern: MaskPattern,
    modules: BitMatrix,
}

impl Symbol {
    pub(crate) fn new(
        version: Version,
        ec_level: ECLevel,
        mask_pattern: MaskPattern,
        modules: BitMatrix,
    ) -> Self {
        Self {
            version,
            ec_level,
            mask_pattern,
            modules,
        }
    }

    /// Symbol version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Error correction level
    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    /// Mask pattern applied to the data modules
    pub fn mask_pattern(&self) -> MaskPattern {
        self.mask_pattern
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.version.size()
    }

    /// Module at (row, col); `true` = dark. Out of range reads as light.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules.get(col, row)
    }

    /// The module grid
    pub fn modules(&self) -> &BitMatrix {
        &self.modules
    }

    /// Row-major copy with one byte per module (1 = dark, 0 = light)
    pub fn to_module_bytes(&self) -> Vec<u8> {
        let size = self.size();
        let mut out = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                out.push(self.is_dark(row, col) as u8);
            }
        }
        out
    }
}
