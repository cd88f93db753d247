// tests/scenarios.rs
//
// End-to-end ticks: scripted board -> extractor -> store -> notifier.
// Every tick is driven by hand through `run_tick`, so nothing sleeps.
//
mod common;

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use attok_monitor::config::MonitorConfig;
use attok_monitor::error::{ExtractionFailed, FailureReason, NotifyError};
use attok_monitor::filter::NameFilter;
use attok_monitor::model::AttendanceState;
use attok_monitor::notify::{Announcer, ToneCue};
use attok_monitor::poll::TickOutcome;

use common::{page, row, Log, Rig};

fn observed(events: usize, observed: usize) -> TickOutcome {
    TickOutcome::Observed { observed, events, queued: events }
}

#[test]
fn filter_smoke_set() {
    let f = NameFilter::default();
    let inputs = ["김현수", "미납처리", "등원(1)", "김도윤(성광)", "원장님", "신명신원장님", "테스트1", "월", "요일"];
    let accepted: Vec<&str> = inputs.into_iter().filter(|s| f.accepts(s)).collect();
    assert_eq!(accepted, ["김현수", "김도윤(성광)", "신명신원장님", "테스트1", "요일"]);
}

#[test]
fn already_departed_at_startup_is_silent() {
    let cfg = MonitorConfig::default();
    let mut rig = Rig::new(&cfg, vec![page(&[row("홍길동", Some("09:00"), Some("12:30"))])]);

    assert_eq!(rig.poll.run_tick(), observed(0, 1));

    let snap = rig.roster.snapshot();
    assert_eq!(snap.records.len(), 1);
    let r = &snap.records[0];
    assert_eq!(r.name, "홍길동");
    assert_eq!(r.state, AttendanceState::CheckedOut);
    assert!(r.arrival_notified && r.departure_notified);

    assert!(rig.played().is_empty());
}

#[test]
fn arrival_then_departure() {
    let cfg = MonitorConfig::default();
    let mut rig = Rig::new(
        &cfg,
        vec![
            page(&[row("김현수", Some("14:02"), None)]),
            page(&[row("김현수", Some("14:02"), Some("17:45"))]),
        ],
    );

    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    assert_eq!(rig.poll.run_tick(), observed(1, 1));

    let snap = rig.roster.snapshot();
    let r = &snap.records[0];
    assert_eq!(r.state, AttendanceState::CheckedOut);
    assert_eq!(r.arrived_at.map(|t| t.to_string()), Some("14:02:00".into()));
    assert_eq!(r.departed_at.map(|t| t.to_string()), Some("17:45:00".into()));

    assert_eq!(rig.played(), ["tone 800+1000", "김현수 등원", "tone 600", "김현수 하원"]);
}

#[test]
fn same_arrival_on_two_ticks_alerts_once() {
    let cfg = MonitorConfig::default();
    let p = page(&[row("이민지", Some("13:10"), None)]);
    let mut rig = Rig::new(&cfg, vec![p.clone(), p]);

    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    assert_eq!(rig.poll.run_tick(), observed(0, 1));

    assert_eq!(rig.played(), ["tone 800+1000", "이민지 등원"]);
}

#[test]
fn school_qualifier_variants_merge() {
    let cfg = MonitorConfig::default();
    let mut rig = Rig::new(
        &cfg,
        vec![page(&[row("김도현", Some("15:00"), None), row("김도현(침산초)", Some("15:00"), None)])],
    );

    assert_eq!(rig.poll.run_tick(), observed(1, 1));

    let snap = rig.roster.snapshot();
    assert_eq!(snap.records.len(), 1);
    assert_eq!(snap.records[0].name, "김도현(침산초)");
    assert_eq!(rig.played(), ["tone 800+1000", "김도현(침산초) 등원"]);
}

#[test]
fn recovers_after_three_failures() {
    let cfg = MonitorConfig::default();
    let timeout = || Err(ExtractionFailed::new(FailureReason::Timeout, "body never came"));
    let mut rig = Rig::new(
        &cfg,
        vec![timeout(), timeout(), timeout(), page(&[row("박서준", Some("16:20"), None)])],
    );

    let mut waits = Vec::new();
    for _ in 0..3 {
        match rig.poll.run_tick() {
            TickOutcome::Failed { error, retry_in } => {
                assert_eq!(error.reason, FailureReason::Timeout);
                waits.push(retry_in.as_secs());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
    assert_eq!(waits, [30, 30, 60]);
    assert_eq!(rig.poll.backoff().failures(), 3);

    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    assert_eq!(rig.poll.backoff().failures(), 0);
    assert_eq!(rig.poll.backoff().period(), Duration::from_secs(30));

    assert_eq!(rig.played(), ["tone 800+1000", "박서준 등원"]);
}

#[test]
fn burst_plays_in_board_order() {
    let cfg = MonitorConfig::default();
    let names = ["김현수", "이민지", "박서준", "최유진", "정하늘"];
    let rows: Vec<String> = names.iter().map(|n| row(n, Some("14:00"), None)).collect();
    let mut rig = Rig::new(&cfg, vec![page(&rows)]);

    assert_eq!(rig.poll.run_tick(), observed(5, 5));

    let spoken: Vec<String> = rig.played().into_iter().filter(|l| !l.starts_with("tone")).collect();
    let expected: Vec<String> = names.iter().map(|n| format!("{n} 등원")).collect();
    assert_eq!(spoken, expected);
}

/// Records like `Recorder`, but each chime takes a while.
struct SlowChime(Log, Duration);

impl Announcer for SlowChime {
    fn chime(&mut self, _cue: &ToneCue) -> Result<(), NotifyError> {
        thread::sleep(self.1);
        self.0.lock().unwrap().push("tone".into());
        Ok(())
    }
    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Holds every chime until the gate's sender is dropped.
struct Gated(Log, Receiver<()>);

impl Announcer for Gated {
    fn chime(&mut self, _cue: &ToneCue) -> Result<(), NotifyError> {
        let _ = self.1.recv();
        Ok(())
    }
    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[test]
fn burst_larger_than_queue_is_all_spoken() {
    let cfg = MonitorConfig::default();
    let names: Vec<String> = ["김", "이", "박", "최", "정", "강", "조", "윤"]
        .iter()
        .flat_map(|s| ["민준", "서연", "하늘", "지우", "도윤"].map(|g| format!("{s}{g}")))
        .collect();
    let rows: Vec<String> = names.iter().map(|n| row(n, Some("14:00"), None)).collect();
    assert!(names.len() > cfg.queue_capacity);

    let mut rig = Rig::with_announcer(&cfg, vec![page(&rows)], |log| {
        Box::new(SlowChime(log, Duration::from_millis(20)))
    });

    assert_eq!(rig.poll.run_tick(), observed(40, 40));
    let snap = rig.roster.snapshot();
    assert!(snap.records.iter().all(|r| r.arrival_notified));

    let spoken: Vec<String> = rig.played().into_iter().filter(|l| l != "tone").collect();
    let expected: Vec<String> = names.iter().map(|n| format!("{n} 등원")).collect();
    assert_eq!(spoken, expected);
}

#[test]
fn arrival_refused_by_a_stuck_queue_fires_next_tick() {
    let cfg = MonitorConfig::from_toml("tick_seconds = 1\nqueue_capacity = 1").unwrap();
    let names = ["김현수", "이민지", "박서준"];
    let rows: Vec<String> = names.iter().map(|n| row(n, Some("14:00"), None)).collect();
    let (gate, held) = mpsc::channel::<()>();

    let mut rig = Rig::with_announcer(&cfg, vec![page(&rows)], move |log| Box::new(Gated(log, held)));

    // One job held by the worker, one in the queue, the third waits a tick and gives up.
    assert_eq!(
        rig.poll.run_tick(),
        TickOutcome::Observed { observed: 3, events: 3, queued: 2 }
    );
    let snap = rig.roster.snapshot();
    assert_eq!(snap.records.len(), 3);
    let third = snap.records.iter().find(|r| r.name == "박서준").unwrap();
    assert_eq!(third.state, AttendanceState::Absent);
    assert!(!third.arrival_notified);

    drop(gate);
    assert_eq!(rig.poll.run_tick(), observed(1, 3));
    let third = rig.roster.snapshot().records.into_iter().find(|r| r.name == "박서준").unwrap();
    assert_eq!(third.state, AttendanceState::CheckedIn);
    assert!(third.arrival_notified);

    let spoken = rig.played();
    let expected: Vec<String> = names.iter().map(|n| format!("{n} 등원")).collect();
    assert_eq!(spoken, expected);
}

#[test]
fn unknown_rows_and_chrome_create_nothing() {
    let cfg = MonitorConfig::default();
    let mut rig = Rig::new(
        &cfg,
        vec![page(&[row("박서준", None, None), row("원장님", Some("08:00"), None)])],
    );

    assert_eq!(rig.poll.run_tick(), observed(0, 1));
    assert!(rig.roster.snapshot().records.is_empty());
    assert!(rig.played().is_empty());
}

#[test]
fn reentry_suppressed_until_reset() {
    let cfg = MonitorConfig::default();
    let in_page = page(&[row("김현수", Some("14:02"), None)]);
    let mut rig = Rig::new(
        &cfg,
        vec![
            in_page.clone(),
            page(&[row("김현수", Some("14:02"), Some("15:00"))]),
            in_page.clone(),
            in_page,
        ],
    );

    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    // Back on the board as checked in: no second arrival.
    assert_eq!(rig.poll.run_tick(), observed(0, 1));

    rig.roster.reset();
    assert_eq!(rig.poll.run_tick(), observed(1, 1));

    let arrivals = rig.played().iter().filter(|l| l.as_str() == "김현수 등원").count();
    assert_eq!(arrivals, 2);
}

#[test]
fn extra_stop_words_from_config() {
    let cfg = MonitorConfig::from_toml("stop_words_extra = [\"공지사항\"]").unwrap();
    let mut rig = Rig::new(
        &cfg,
        vec![page(&[row("공지사항", Some("09:00"), None), row("김현수", Some("09:05"), None)])],
    );

    assert_eq!(rig.poll.run_tick(), observed(1, 1));
    assert_eq!(rig.played(), ["tone 800+1000", "김현수 등원"]);
}

#[test]
fn login_page_counts_as_failure() {
    let cfg = MonitorConfig::default();
    let mut rig = Rig::new(&cfg, vec![Ok("아이디\n비밀번호\n로그인".into())]);

    match rig.poll.run_tick() {
        TickOutcome::Failed { error, retry_in } => {
            assert_eq!(error.reason, FailureReason::EmptyPage);
            assert_eq!(retry_in, Duration::from_secs(30));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
