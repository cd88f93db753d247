// src/extract/annotation.rs
// Attendance annotation line: "등원 14:02 하원 17:45", "등원 14:02 하원 -", "등원 - 하원 -".

use chrono::NaiveTime;

use crate::model::ObservedState;

pub const ARRIVAL_TOKEN: &str = "등원";
pub const DEPARTURE_TOKEN: &str = "하원";

/// True for the line under a student name that carries both tokens.
pub fn is_annotation(line: &str) -> bool {
    line.contains(ARRIVAL_TOKEN) && line.contains(DEPARTURE_TOKEN)
}

/// State plus the board time that justified it.
pub fn parse(line: &str) -> (ObservedState, Option<NaiveTime>) {
    if let Some(t) = time_after(line, DEPARTURE_TOKEN) {
        return (ObservedState::CheckedOut, Some(t));
    }
    if let Some(t) = time_after(line, ARRIVAL_TOKEN) {
        return (ObservedState::CheckedIn, Some(t));
    }
    (ObservedState::Unknown, None)
}

/// First `HH:MM` directly after any occurrence of `token`
/// (whitespace and a separating ':' allowed in between).
fn time_after(line: &str, token: &str) -> Option<NaiveTime> {
    line.match_indices(token).find_map(|(i, _)| {
        let rest = line[i + token.len()..].trim_start_matches(|c: char| c.is_whitespace() || c == ':');
        leading_hhmm(rest)
    })
}

fn leading_hhmm(s: &str) -> Option<NaiveTime> {
    let (h, rest) = split_digits(s, 2)?;
    let rest = rest.strip_prefix(':')?;
    let (m, _) = split_digits(rest, 2)?;
    if m.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

/// Up to `max` leading ASCII digits (at least one).
fn split_digits(s: &str, max: usize) -> Option<(&str, &str)> {
    let n = s.bytes().take(max).take_while(u8::is_ascii_digit).count();
    if n == 0 { None } else { Some(s.split_at(n)) }
}
