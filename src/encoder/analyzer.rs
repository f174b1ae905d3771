//! Input analysis: split raw bytes into mode segments
//!
//! Automatic analysis runs an exact shortest-path search over byte positions.
//! A state is the mode of the open segment plus, for numeric and alphanumeric,
//! how many characters sit in its unfinished group, because the cost of the
//! next character depends on it (a third digit completes a 10-bit group that
//! the first two paid 7 bits towards).

use log::debug;

use crate::error::EncodeError;
use crate::models::segment::{alphanumeric_value, is_kanji_pair};
use crate::models::{Mode, Segment, VersionClass};

const STATES: usize = 7;

/// Open-segment state of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Numeric(u8),
    Alphanumeric(u8),
    Byte,
    Kanji,
}

impl State {
    const fn index(self) -> usize {
        match self {
            State::Numeric(r) => r as usize,
            State::Alphanumeric(r) => 3 + r as usize,
            State::Byte => 5,
            State::Kanji => 6,
        }
    }

    const fn from_index(index: usize) -> Self {
        match index {
            0..=2 => State::Numeric(index as u8),
            3 | 4 => State::Alphanumeric(index as u8 - 3),
            5 => State::Byte,
            _ => State::Kanji,
        }
    }

    const fn mode(self) -> Mode {
        match self {
            State::Numeric(_) => Mode::Numeric,
            State::Alphanumeric(_) => Mode::Alphanumeric,
            State::Byte => Mode::Byte,
            State::Kanji => Mode::Kanji,
        }
    }

    /// State after appending one character of `mode`, with the bits it costs
    fn advance(from: Option<State>, mode: Mode) -> (State, usize) {
        match (mode, from) {
            (Mode::Numeric, Some(State::Numeric(r))) => {
                (State::Numeric((r + 1) % 3), if r == 0 { 4 } else { 3 })
            }
            (Mode::Numeric, _) => (State::Numeric(1), 4),
            (Mode::Alphanumeric, Some(State::Alphanumeric(r))) => {
                (State::Alphanumeric((r + 1) % 2), if r == 0 { 6 } else { 5 })
            }
            (Mode::Alphanumeric, _) => (State::Alphanumeric(1), 6),
            (Mode::Byte, _) => (State::Byte, 8),
            (Mode::Kanji, _) => (State::Kanji, 13),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Step {
    cost: usize,
    from_pos: usize,
    from_state: Option<State>,
    opens_segment: bool,
}

/// Split `data` into segments for a symbol in `class`
///
/// With `forced` set the whole input becomes one segment of that mode, or
/// `InvalidInput` if any byte cannot be represented. Otherwise the split with
/// the fewest total bits is returned. Kanji is only considered when `kanji`
/// is true.
pub fn analyze(
    data: &[u8],
    class: VersionClass,
    forced: Option<Mode>,
    kanji: bool,
) -> Result<Vec<Segment>, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::InvalidInput("input is empty".to_string()));
    }
    let segments = match forced {
        Some(mode) => vec![forced_segment(data, mode)?],
        None => optimal_segments(data, class, kanji),
    };
    debug!(
        "analyzed {} bytes for {:?} versions: {:?}",
        data.len(),
        class,
        segments
            .iter()
            .map(|s| (s.mode(), s.char_count()))
            .collect::<Vec<_>>()
    );
    Ok(segments)
}

fn forced_segment(data: &[u8], mode: Mode) -> Result<Segment, EncodeError> {
    let invalid =
        |what: &str| EncodeError::InvalidInput(format!("{what} under forced {mode:?} mode"));
    match mode {
        Mode::Numeric => {
            if let Some(pos) = data.iter().position(|b| !b.is_ascii_digit()) {
                return Err(invalid(&format!("non-digit byte 0x{:02X} at {pos}", data[pos])));
            }
        }
        Mode::Alphanumeric => {
            if let Some(pos) = data.iter().position(|&b| alphanumeric_value(b).is_none()) {
                return Err(invalid(&format!(
                    "non-alphanumeric byte 0x{:02X} at {pos}",
                    data[pos]
                )));
            }
        }
        Mode::Byte => {}
        Mode::Kanji => {
            if data.len() % 2 != 0 {
                return Err(invalid("odd byte count"));
            }
            if let Some(pair) = data.chunks_exact(2).position(|p| !is_kanji_pair(p[0], p[1])) {
                return Err(invalid(&format!("non-Kanji pair at {}", pair * 2)));
            }
        }
    }
    Ok(Segment::new(mode, data.to_vec()))
}

/// Modes that can encode the character starting at `pos`, with its byte width
fn candidate_modes(data: &[u8], pos: usize, kanji: bool) -> impl Iterator<Item = (Mode, usize)> {
    let byte = data[pos];
    let numeric = byte.is_ascii_digit().then_some((Mode::Numeric, 1));
    let alphanumeric = alphanumeric_value(byte).map(|_| (Mode::Alphanumeric, 1));
    let kanji_pair = (kanji && data.get(pos + 1).is_some_and(|&lo| is_kanji_pair(byte, lo)))
        .then_some((Mode::Kanji, 2));
    numeric
        .into_iter()
        .chain(alphanumeric)
        .chain(std::iter::once((Mode::Byte, 1)))
        .chain(kanji_pair)
}

fn optimal_segments(data: &[u8], class: VersionClass, kanji: bool) -> Vec<Segment> {
    let n = data.len();
    let mut best: Vec<[Option<Step>; STATES]> = vec![[None; STATES]; n + 1];

    let relax = |best: &mut Vec<[Option<Step>; STATES]>,
                 pos: usize,
                 from: Option<State>,
                 cost: usize| {
        for (mode, width) in candidate_modes(data, pos, kanji) {
            let continues = from.is_some_and(|s| s.mode() == mode);
            let (next, char_bits) = State::advance(if continues { from } else { None }, mode);
            let header = if continues { 0 } else { 4 + mode.char_count_bits(class) };
            let total = cost + char_bits + header;
            let slot = &mut best[pos + width][next.index()];
            if slot.is_none_or(|s| total < s.cost) {
                *slot = Some(Step {
                    cost: total,
                    from_pos: pos,
                    from_state: from,
                    opens_segment: !continues,
                });
            }
        }
    };

    relax(&mut best, 0, None, 0);
    for pos in 1..n {
        for index in 0..STATES {
            if let Some(step) = best[pos][index] {
                relax(&mut best, pos, Some(State::from_index(index)), step.cost);
            }
        }
    }

    // Lowest cost, lowest state index on ties
    let end = best[n]
        .iter()
        .enumerate()
        .filter_map(|(index, step)| step.map(|s| (index, s.cost)))
        .min_by_key(|&(index, cost)| (cost, index));

    // Walk back to collect (start, end, mode) spans
    let mut spans: Vec<(usize, usize, Mode, bool)> = Vec::new();
    let mut cursor = end.map(|(index, _)| (n, State::from_index(index)));
    while let Some((pos, state)) = cursor {
        let Some(step) = best[pos][state.index()] else {
            break;
        };
        spans.push((step.from_pos, pos, state.mode(), step.opens_segment));
        cursor = match step.from_state {
            Some(prev) if step.from_pos > 0 => Some((step.from_pos, prev)),
            _ => None,
        };
    }
    spans.reverse();

    let mut segments: Vec<(Mode, usize, usize)> = Vec::new();
    for (start, stop, mode, opens) in spans {
        match segments.last_mut() {
            Some(last) if !opens => last.2 = stop,
            _ => segments.push((mode, start, stop)),
        }
    }
    segments
        .into_iter()
        .map(|(mode, start, stop)| Segment::new(mode, data[start..stop].to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Version;
    use crate::models::segment::total_bit_length;

    fn auto(data: &[u8]) -> Vec<Segment> {
        analyze(data, VersionClass::Small, None, false).unwrap()
    }

    fn modes(segments: &[Segment]) -> Vec<(Mode, &[u8])> {
        segments.iter().map(|s| (s.mode(), s.data())).collect()
    }

    #[test]
    fn test_single_mode_inputs() {
        let segments = auto(b"HELLO WORLD");
        assert_eq!(modes(&segments), vec![(Mode::Alphanumeric, &b"HELLO WORLD"[..])]);
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(74));

        let segments = auto(b"Hello, World!");
        assert_eq!(modes(&segments), vec![(Mode::Byte, &b"Hello, World!"[..])]);
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(116));

        let segments = auto(b"01234567");
        assert_eq!(modes(&segments), vec![(Mode::Numeric, &b"01234567"[..])]);
    }

    #[test]
    fn test_mixed_numeric_then_alphanumeric() {
        let segments = auto(b"12345678901234567890ABCDE");
        assert_eq!(
            modes(&segments),
            vec![
                (Mode::Numeric, &b"12345678901234567890"[..]),
                (Mode::Alphanumeric, &b"ABCDE"[..]),
            ]
        );
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(122));
    }

    #[test]
    fn test_byte_prefix_then_numeric() {
        let segments = auto(b"a1234567890123");
        assert_eq!(
            modes(&segments),
            vec![(Mode::Byte, &b"a"[..]), (Mode::Numeric, &b"1234567890123"[..])]
        );
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(78));
    }

    #[test]
    fn test_three_modes() {
        let segments = auto(b"ABCDEFGHIJ1234567890123456789abc");
        assert_eq!(
            modes(&segments),
            vec![
                (Mode::Alphanumeric, &b"ABCDEFGHIJ"[..]),
                (Mode::Numeric, &b"1234567890123456789"[..]),
                (Mode::Byte, &b"abc"[..]),
            ]
        );
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(182));
    }

    #[test]
    fn test_short_digit_run_stays_in_byte_mode() {
        // Switching for two digits costs more than it saves
        let segments = auto(b"ab12cd");
        assert_eq!(modes(&segments), vec![(Mode::Byte, &b"ab12cd"[..])]);
    }

    #[test]
    fn test_kanji_only_when_enabled() {
        let data = [0x93, 0x5F, 0xE4, 0xAA];
        let segments = analyze(&data, VersionClass::Small, None, true).unwrap();
        assert_eq!(modes(&segments), vec![(Mode::Kanji, &data[..])]);
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(38));

        let segments = analyze(&data, VersionClass::Small, None, false).unwrap();
        assert_eq!(modes(&segments), vec![(Mode::Byte, &data[..])]);
        assert_eq!(total_bit_length(&segments, Version::MIN), Some(44));
    }

    #[test]
    fn test_segments_cover_input() {
        let data = b"Order #12345: 3x WIDGET-42 @ $19.99 each";
        let segments = auto(data);
        let joined: Vec<u8> = segments.iter().flat_map(|s| s.data().iter().copied()).collect();
        assert_eq!(joined, data.to_vec());
        for pair in segments.windows(2) {
            assert_ne!(pair[0].mode(), pair[1].mode());
        }
    }

    #[test]
    fn test_forced_modes() {
        let segments = analyze(b"0123", VersionClass::Small, Some(Mode::Byte), false).unwrap();
        assert_eq!(modes(&segments), vec![(Mode::Byte, &b"0123"[..])]);

        let err = analyze(b"12A4", VersionClass::Small, Some(Mode::Numeric), false).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));

        let err = analyze(b"abc", VersionClass::Small, Some(Mode::Alphanumeric), false).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));

        let err = analyze(&[0x93, 0x5F, 0xE4], VersionClass::Small, Some(Mode::Kanji), false)
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));

        let err = analyze(b"AB", VersionClass::Small, Some(Mode::Kanji), false).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = analyze(b"", VersionClass::Small, None, false).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));
    }
}
