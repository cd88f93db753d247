// src/extract/mod.rs
//! Page Extractor: rendered board text → observations.

pub mod annotation;
pub mod merge;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, trace};

use crate::core::sanitize::{board_lines, canonical_name};
use crate::error::ExtractionFailed;
use crate::filter::NameFilter;
use crate::model::StudentObservation;

pub use merge::merge_observations;

/// Anything that can hand over the board's visible text.
/// The real one drives a browser tab; tests script it.
pub trait BoardView: Send {
    /// Newline-separated visible text. Browser-side waits are bounded by `timeout`.
    fn board_text(&mut self, timeout: Duration) -> Result<String, ExtractionFailed>;
}

/// Serializing handle the poll loop uses to reach a view owned by the host.
/// One request at a time; clones share the same view.
#[derive(Clone)]
pub struct BoardShim {
    inner: Arc<Mutex<Box<dyn BoardView>>>,
}

impl BoardShim {
    pub fn new(view: impl BoardView + 'static) -> Self {
        Self { inner: Arc::new(Mutex::new(Box::new(view))) }
    }

    pub fn board_text(&self, timeout: Duration) -> Result<String, ExtractionFailed> {
        let mut view = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        view.board_text(timeout)
    }
}

pub struct Extractor {
    filter: NameFilter,
    timeout: Duration,
}

impl Extractor {
    pub fn new(filter: NameFilter, timeout: Duration) -> Self {
        Self { filter, timeout }
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    /// Scrape the live board once.
    pub fn extract(&self, board: &BoardShim) -> Result<Vec<StudentObservation>, ExtractionFailed> {
        let text = board.board_text(self.timeout)?;
        self.parse(&text, Local::now())
    }

    /// Pair each annotation line with the line above it.
    ///
    /// Fails with `EmptyPage` when the text has no annotation lines at all.
    /// Annotations whose name line is rejected simply yield nothing.
    pub fn parse(
        &self,
        text: &str,
        now: DateTime<Local>,
    ) -> Result<Vec<StudentObservation>, ExtractionFailed> {
        let lines = board_lines(text);
        if lines.is_empty() {
            return Err(ExtractionFailed::empty_page("no visible text"));
        }

        let mut annotations = 0usize;
        let mut raw = Vec::new();

        for pair in lines.windows(2) {
            let (cand, note) = (&pair[0], &pair[1]);
            if !annotation::is_annotation(note) {
                continue;
            }
            annotations += 1;

            // Two stacked annotations: the upper one is not a name.
            if annotation::is_annotation(cand) {
                continue;
            }
            if !self.filter.accepts(cand) {
                trace!("Extract: rejected candidate {cand:?}");
                continue;
            }

            let (state, board_time) = annotation::parse(note);
            raw.push(
                StudentObservation::new(canonical_name(cand), state, now).with_board_time(board_time),
            );
        }

        if annotations == 0 {
            return Err(ExtractionFailed::empty_page(format!(
                "{} lines, none with attendance tokens",
                lines.len()
            )));
        }

        let merged = merge_observations(raw);
        debug!("Extract: annotations={annotations} observations={}", merged.len());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::model::ObservedState;

    fn extractor() -> Extractor {
        Extractor::new(NameFilter::default(), Duration::from_secs(10))
    }

    const BOARD: &str = "\
출결 관리
전체 (12)
등원(3)
김현수
등원 14:02 하원 -
이민지
등원 13:10 하원 16:40
원장님
등원 - 하원 -
박서준
등원 - 하원 -
김도현
등원 15:00 하원 -
김도현(침산초)
등원 15:00 하원 -
";

    #[test]
    fn parses_board() {
        let obs = extractor().parse(BOARD, Local::now()).unwrap();
        let got: Vec<(&str, ObservedState)> = obs.iter().map(|o| (o.name.as_str(), o.state)).collect();
        assert_eq!(
            got,
            vec![
                ("김현수", ObservedState::CheckedIn),
                ("이민지", ObservedState::CheckedOut),
                ("박서준", ObservedState::Unknown),
                ("김도현(침산초)", ObservedState::CheckedIn),
            ]
        );
        assert_eq!(obs[1].board_time, chrono::NaiveTime::from_hms_opt(16, 40, 0));
    }

    #[test]
    fn spaced_qualifier_merges_with_tight_one() {
        let text = "김도현 (침산초)\n등원 15:00 하원 -\n김도현(침산초)\n등원 15:00 하원 16:30\n";
        let obs = extractor().parse(text, Local::now()).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].name, "김도현(침산초)");
        assert_eq!(obs[0].state, ObservedState::CheckedOut);
    }

    #[test]
    fn blank_page_is_empty_page() {
        let err = extractor().parse("  \n\n", Local::now()).unwrap_err();
        assert_eq!(err.reason, FailureReason::EmptyPage);
    }

    #[test]
    fn login_page_is_empty_page() {
        let err = extractor().parse("아이디\n비밀번호\n로그인", Local::now()).unwrap_err();
        assert_eq!(err.reason, FailureReason::EmptyPage);
    }

    #[test]
    fn board_with_no_names_is_ok_and_empty() {
        let obs = extractor().parse("원장님\n등원 - 하원 -", Local::now()).unwrap();
        assert!(obs.is_empty());
    }

    struct Canned(&'static str);
    impl BoardView for Canned {
        fn board_text(&mut self, _t: Duration) -> Result<String, ExtractionFailed> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn extract_through_shim() {
        let shim = BoardShim::new(Canned("김현수\n등원 09:00 하원 -"));
        let obs = extractor().extract(&shim.clone()).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].state, ObservedState::CheckedIn);
    }
}
