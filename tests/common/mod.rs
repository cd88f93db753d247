// tests/common/mod.rs
//
// Scripted board + recording announcer shared by the integration tests.
//
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use attok_monitor::config::MonitorConfig;
use attok_monitor::error::{ExtractionFailed, NotifyError};
use attok_monitor::extract::{BoardShim, BoardView};
use attok_monitor::notify::{Announcer, Notifier, ToneCue};
use attok_monitor::poll::PollLoop;
use attok_monitor::store::SharedRoster;

/// Serves page text in order. Once the script runs out the last entry repeats.
pub struct ScriptedBoard {
    pages: VecDeque<Result<String, ExtractionFailed>>,
    last: Result<String, ExtractionFailed>,
}

impl ScriptedBoard {
    pub fn new(pages: Vec<Result<String, ExtractionFailed>>) -> Self {
        Self { pages: pages.into(), last: Err(ExtractionFailed::empty_page("script exhausted")) }
    }
}

impl BoardView for ScriptedBoard {
    fn board_text(&mut self, _timeout: Duration) -> Result<String, ExtractionFailed> {
        if let Some(p) = self.pages.pop_front() {
            self.last = p;
        }
        self.last.clone()
    }
}

/// One board row: name line + annotation line.
pub fn row(name: &str, arrived: Option<&str>, departed: Option<&str>) -> String {
    format!("{name}\n등원 {} 하원 {}\n", arrived.unwrap_or("-"), departed.unwrap_or("-"))
}

pub fn page(rows: &[String]) -> Result<String, ExtractionFailed> {
    Ok(format!("출결 관리\n전체 ({})\n{}", rows.len(), rows.concat()))
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub struct Recorder(pub Log);

impl Announcer for Recorder {
    fn chime(&mut self, cue: &ToneCue) -> Result<(), NotifyError> {
        let hz: Vec<String> = cue.tones.iter().map(|t| t.freq_hz.to_string()).collect();
        self.0.lock().unwrap().push(format!("tone {}", hz.join("+")));
        Ok(())
    }
    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct Rig {
    pub poll: PollLoop,
    pub roster: SharedRoster,
    pub notifier: Notifier,
    pub log: Log,
}

impl Rig {
    pub fn new(cfg: &MonitorConfig, pages: Vec<Result<String, ExtractionFailed>>) -> Self {
        Self::with_announcer(cfg, pages, |log| Box::new(Recorder(log)))
    }

    /// Same rig, but the notifier plays through whatever `make` builds around the log.
    pub fn with_announcer(
        cfg: &MonitorConfig,
        pages: Vec<Result<String, ExtractionFailed>>,
        make: impl FnOnce(Log) -> Box<dyn Announcer> + Send + 'static,
    ) -> Self {
        let log: Log = Arc::default();
        let l = Arc::clone(&log);
        let notifier = Notifier::spawn(cfg.cues(), cfg.queue_capacity, Box::new(move || make(l)));
        let roster = SharedRoster::new(cfg.name_filter());
        let board = BoardShim::new(ScriptedBoard::new(pages));
        let poll = PollLoop::new(cfg, board, roster.clone(), notifier.handle());
        Self { poll, roster, notifier, log }
    }

    /// Drain the notifier and return everything it played.
    pub fn played(self) -> Vec<String> {
        let Rig { poll, notifier, log, .. } = self;
        drop(poll);
        notifier.shutdown();
        let v = log.lock().unwrap().clone();
        v
    }
}
