//! Korean-aware string ordering for tour titles.
//!
//! Primary order groups characters by class: whitespace, punctuation and
//! symbols, digits, Hangul, Han ideographs, Latin letters (case-insensitive),
//! then every other script. Hangul syllables compare by their initial, medial, and final jamo,
//! and a standalone compatibility consonant sorts before every syllable that
//! starts with it. Titles equal at the primary level fall back to case
//! (lowercase first) and finally to code point order.

use std::cmp::Ordering;

const HANGUL_SYLLABLE_FIRST: u32 = 0xAC00;
const HANGUL_SYLLABLE_LAST: u32 = 0xD7A3;
const HANGUL_MEDIAL_COUNT: u32 = 21;
const HANGUL_FINAL_COUNT: u32 = 28;
const HANGUL_INITIAL_COUNT: u32 = 19;

/// Compatibility jamo (U+3131..) that double as syllable initials, in initial order.
const COMPAT_INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Whitespace,
    Symbol,
    Digit,
    Hangul,
    Han,
    Latin,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PrimaryWeight {
    class: CharClass,
    major: u32,
    minor: u32,
    last: u32,
}

impl PrimaryWeight {
    fn simple(class: CharClass, value: u32) -> Self {
        Self {
            class,
            major: value,
            minor: 0,
            last: 0,
        }
    }
}

fn primary_weight(ch: char) -> PrimaryWeight {
    let code = u32::from(ch);

    if ch.is_whitespace() {
        return PrimaryWeight::simple(CharClass::Whitespace, 0);
    }
    if let Some(digit) = ch.to_digit(10) {
        return PrimaryWeight::simple(CharClass::Digit, digit);
    }
    if (HANGUL_SYLLABLE_FIRST..=HANGUL_SYLLABLE_LAST).contains(&code) {
        let index = code - HANGUL_SYLLABLE_FIRST;
        let per_initial = HANGUL_MEDIAL_COUNT * HANGUL_FINAL_COUNT;
        return PrimaryWeight {
            class: CharClass::Hangul,
            major: index / per_initial,
            minor: (index % per_initial) / HANGUL_FINAL_COUNT + 1,
            last: index % HANGUL_FINAL_COUNT,
        };
    }
    if ('\u{3131}'..='\u{318E}').contains(&ch) {
        let initial = COMPAT_INITIALS
            .iter()
            .position(|candidate| *candidate == ch)
            .and_then(|position| u32::try_from(position).ok());
        return match initial {
            Some(initial) => PrimaryWeight::simple(CharClass::Hangul, initial),
            None => PrimaryWeight {
                class: CharClass::Hangul,
                major: HANGUL_INITIAL_COUNT,
                minor: code,
                last: 0,
            },
        };
    }
    if is_han(code) {
        return PrimaryWeight::simple(CharClass::Han, code);
    }
    if ch.is_alphabetic() && code < 0x0250 {
        let folded = ch.to_lowercase().next().unwrap_or(ch);
        return PrimaryWeight::simple(CharClass::Latin, u32::from(folded));
    }
    if ch.is_alphanumeric() {
        return PrimaryWeight::simple(CharClass::Other, code);
    }
    PrimaryWeight::simple(CharClass::Symbol, code)
}

/// CJK unified ideographs, extension A, and compatibility ideographs.
fn is_han(code: u32) -> bool {
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0xF900..=0xFAFF).contains(&code)
}

fn case_weight(ch: char) -> u8 {
    u8::from(ch.is_uppercase())
}

/// Compare two strings under Korean collation rules.
#[must_use]
pub fn compare_korean(left: &str, right: &str) -> Ordering {
    left.chars()
        .map(primary_weight)
        .cmp(right.chars().map(primary_weight))
        .then_with(|| left.chars().map(case_weight).cmp(right.chars().map(case_weight)))
        .then_with(|| left.cmp(right))
}
