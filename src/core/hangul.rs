// src/core/hangul.rs
// Character classes for Korean roster text.

/// First and last precomposed syllables (가..힣).
const SYLLABLE_FIRST: char = '\u{AC00}';
const SYLLABLE_LAST: char = '\u{D7A3}';

#[inline]
pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_FIRST..=SYLLABLE_LAST).contains(&c)
}

pub fn syllable_count(s: &str) -> usize {
    s.chars().filter(|&c| is_syllable(c)).count()
}

pub fn all_syllables(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_syllable)
}

/// "하하하" style strings: one character, repeated.
pub fn is_single_char_repeat(s: &str) -> bool {
    let mut chars = s.chars().filter(|c| !c.is_whitespace());
    match chars.next() {
        Some(first) => {
            let mut n = 1;
            for c in chars {
                if c != first {
                    return false;
                }
                n += 1;
            }
            n >= 2
        }
        None => false,
    }
}
