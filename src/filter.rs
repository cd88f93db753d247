// src/filter.rs
//! Decides whether a fragment of board text is a plausible student name.
//!
//! The predicate is an accept rule and a reject rule over a stop set that is
//! plain data. Hosts extend the stop set through `stop_words_extra`.

use std::collections::HashSet;

use crate::core::{hangul, sanitize};

pub const MIN_CHARS: usize = 2;
pub const MAX_CHARS: usize = 10;

/// Standalone role words. Attached to a name (`신명신원장님`) they are fine.
pub const ROLE_WORDS: &[&str] = &["원장님", "원장", "담임", "선생님"];

/// Day syllables and full day names. Bare `요일` is not a stop word.
pub const CALENDAR_WORDS: &[&str] = &[
    "월", "화", "수", "목", "금", "토", "일",
    "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
];

pub const SYSTEM_WORDS: &[&str] = &[
    "출결", "수납", "등원", "하원", "출석", "결석", "미납", "미등록",
    "전체", "관리", "관리자", "정보수정",
    "로그인", "로그아웃", "로그 인", "로그 아웃",
    "학생", "학생등록", "등록", "시스템", "메뉴", "홈", "대시보드",
    "리포트", "통계", "선택", "확인", "취소", "저장", "닫기", "추가", "삭제", "수정",
];

/// Tails that turn a system word into a status phrase (`미납처리`, `출결현황`).
pub const STATUS_SUFFIXES: &[&str] = &[
    "처리", "완료", "내역", "현황", "목록", "대기", "예정", "보기", "관리", "조회", "설정",
];

#[derive(Clone, Debug)]
pub struct NameFilter {
    stop: HashSet<String>,
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

impl NameFilter {
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop = ROLE_WORDS
            .iter()
            .chain(CALENDAR_WORDS)
            .chain(SYSTEM_WORDS)
            .map(|w| w.to_string())
            .chain(
                extra
                    .into_iter()
                    .map(|w| sanitize::normalize_ws(w.as_ref()))
                    .filter(|w| !w.is_empty()),
            )
            .collect();
        Self { stop }
    }

    pub fn is_stop_word(&self, s: &str) -> bool {
        self.stop.contains(s)
    }

    pub fn accepts(&self, raw: &str) -> bool {
        let s = sanitize::normalize_ws(raw);
        !self.rejects(&s) && Self::accept_rule(&s)
    }

    fn rejects(&self, s: &str) -> bool {
        self.is_stop_word(s)
            || sanitize::has_paren_digits(s)
            || s.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
            || s.chars().all(|c| !c.is_alphanumeric())
            || hangul::is_single_char_repeat(s)
            || self.is_status_phrase(s)
            || {
                let (base, _) = sanitize::split_qualifier(s);
                base != s && (self.is_stop_word(base) || self.is_status_phrase(base))
            }
    }

    fn accept_rule(s: &str) -> bool {
        let n = s.chars().count();
        if !(MIN_CHARS..=MAX_CHARS).contains(&n) || hangul::syllable_count(s) < 2 {
            return false;
        }

        let (base, _) = sanitize::split_qualifier(s);
        let residual = sanitize::strip_digit_suffix(base).trim_end();
        hangul::syllable_count(residual) >= 2
            && residual.chars().all(|c| hangul::is_syllable(c) || c == ' ')
    }

    /// A stop word glued to digits or a status tail: `등원2`, `미납처리`.
    fn is_status_phrase(&self, s: &str) -> bool {
        self.stop
            .iter()
            .filter(|w| w.chars().count() >= 2)
            .filter_map(|w| s.strip_prefix(w.as_str()))
            .any(|rest| {
                let rest = rest.trim();
                !rest.is_empty()
                    && (rest.chars().all(|c| c.is_ascii_digit()) || STATUS_SUFFIXES.contains(&rest))
            })
    }
}
