// src/core/sanitize.rs
use super::hangul;

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Roster key form: normalized whitespace, none inside or around a
/// parenthesised qualifier. `김도현 ( 침산초 )` → `김도현(침산초)`.
pub fn canonical_name(s: &str) -> String {
    normalize_ws(s)
        .replace(" (", "(")
        .replace("( ", "(")
        .replace(" )", ")")
}

/// Non-empty, whitespace-normalized lines of a rendered page.
pub fn board_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_ws)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Split a school qualifier off a roster name.
///
/// `김도윤(성광)` → (`김도윤`, Some(`성광`)), `김동훈 동변초` → (`김동훈`, Some(`동변초`)).
/// A trailing space-separated qualifier must be 2..=4 Hangul syllables.
/// Anything else comes back unsplit.
pub fn split_qualifier(name: &str) -> (&str, Option<&str>) {
    let s = name.trim();

    if s.ends_with(')') {
        if let Some(open) = s.rfind('(') {
            let base = s[..open].trim_end();
            let inner = s[open + 1..s.len() - 1].trim();
            if !base.is_empty() && !inner.is_empty() {
                return (base, Some(inner));
            }
        }
        return (s, None);
    }

    if let Some(sp) = s.rfind(' ') {
        let base = s[..sp].trim_end();
        let tail = &s[sp + 1..];
        let n = tail.chars().count();
        if !base.is_empty() && (2..=4).contains(&n) && hangul::all_syllables(tail) {
            return (base, Some(tail));
        }
    }

    (s, None)
}

/// `(0)`, `(12)` … anywhere in the string. Board counters, never names.
pub fn has_paren_digits(s: &str) -> bool {
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        match after.find(')') {
            Some(close) => {
                let inner = after[..close].trim();
                if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                    return true;
                }
                rest = &after[close + 1..];
            }
            None => return false,
        }
    }
    false
}

/// Drop a numeric tag from the end: `테스트12` → `테스트`.
pub fn strip_digit_suffix(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_digit())
}
