use std::sync::OnceLock;

use crate::error::EncodeError;
use crate::models::{MaskPattern, Mode, Version};

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static PARALLEL_MASKS: OnceLock<bool> = OnceLock::new();

pub(crate) fn parallel_masks() -> bool {
    *PARALLEL_MASKS.get_or_init(|| parse_env_bool_u8("QR_PARALLEL_MASKS", true))
}

static PARALLEL_MASK_MIN_VERSION: OnceLock<usize> = OnceLock::new();

/// 41 turns the parallel path off for every version
pub(crate) fn parallel_mask_min_version() -> usize {
    *PARALLEL_MASK_MIN_VERSION
        .get_or_init(|| parse_env_usize("QR_PARALLEL_MASK_MIN_VERSION", 10).clamp(1, 41))
}

/// Per-call encoding options
///
/// All fields are optional; the defaults give fully automatic encoding.
///
/// ```
/// use qrcodeine::{EncodeOptions, Mode};
///
/// let options = EncodeOptions::new().mode(Mode::Numeric).min_version(5);
/// assert_eq!(options.forced_mode(), Some(Mode::Numeric));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
    mode: Option<Mode>,
    min_version: Option<u8>,
    mask: Option<u8>,
    kanji: bool,
}

impl EncodeOptions {
    /// Automatic mode, version and mask
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode the whole input as one segment of `mode`
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Never choose a version below `version` (1-40)
    pub fn min_version(mut self, version: u8) -> Self {
        self.min_version = Some(version);
        self
    }

    /// Use mask pattern `mask` (0-7) instead of evaluating all eight
    pub fn mask(mut self, mask: u8) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Let automatic analysis use Kanji mode for Shift-JIS input
    pub fn kanji(mut self, enabled: bool) -> Self {
        self.kanji = enabled;
        self
    }

    /// Forced mode, if any
    pub fn forced_mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Whether Kanji segments may be produced
    pub fn kanji_enabled(&self) -> bool {
        self.kanji || self.mode == Some(Mode::Kanji)
    }

    /// Validated minimum version (version 1 when unset)
    pub fn validated_min_version(&self) -> Result<Version, EncodeError> {
        match self.min_version {
            None => Ok(Version::MIN),
            Some(n) => Version::new(n).ok_or_else(|| {
                EncodeError::InvalidInput(format!("minimum version {n} is outside 1-40"))
            }),
        }
    }

    /// Validated mask override
    pub fn validated_mask(&self) -> Result<Option<MaskPattern>, EncodeError> {
        self.mask
            .map(|id| {
                MaskPattern::from_bits(id).ok_or_else(|| {
                    EncodeError::InvalidInput(format!("mask pattern {id} is outside 0-7"))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EncodeOptions::new();
        assert_eq!(options.forced_mode(), None);
        assert!(!options.kanji_enabled());
        assert_eq!(options.validated_min_version(), Ok(Version::MIN));
        assert_eq!(options.validated_mask(), Ok(None));
    }

    #[test]
    fn test_builder_validation() {
        let options = EncodeOptions::new().min_version(40).mask(7);
        assert_eq!(options.validated_min_version(), Ok(Version::MAX));
        assert_eq!(options.validated_mask(), Ok(Some(MaskPattern::Pattern7)));

        assert!(matches!(
            EncodeOptions::new().min_version(0).validated_min_version(),
            Err(EncodeError::InvalidInput(_))
        ));
        assert!(matches!(
            EncodeOptions::new().min_version(41).validated_min_version(),
            Err(EncodeError::InvalidInput(_))
        ));
        assert!(matches!(
            EncodeOptions::new().mask(8).validated_mask(),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_forced_kanji_enables_kanji() {
        assert!(EncodeOptions::new().mode(Mode::Kanji).kanji_enabled());
        assert!(EncodeOptions::new().kanji(true).kanji_enabled());
    }

    #[test]
    fn test_env_tunables_in_range() {
        assert!((1..=41).contains(&parallel_mask_min_version()));
        // Cached after the first read
        assert_eq!(parallel_masks(), parallel_masks());
        assert_eq!(parallel_mask_min_version(), parallel_mask_min_version());
    }

    #[test]
    fn test_env_parsing_defaults() {
        assert_eq!(parse_env_usize("QRCODEINE_UNSET_TUNABLE", 7), 7);
        assert!(parse_env_bool_u8("QRCODEINE_UNSET_TUNABLE", true));
        assert!(!parse_env_bool_u8("QRCODEINE_UNSET_TUNABLE", false));
    }
}
