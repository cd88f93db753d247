// src/gui/progress.rs
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;

use crate::error::ExtractionFailed;
use crate::poll::LoopExit;
use crate::progress::Progress;

/// Writes the poll loop's progress into the window's status line.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    ticks: usize,
    alerts: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>) -> Self {
        Self { status, ticks: 0, alerts: 0 }
    }

    fn set_status(&self, msg: impl Into<String>) {
        *self.status.lock().unwrap_or_else(|p| p.into_inner()) = msg.into();
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, tick: Duration) {
        self.set_status(format!("Watching (every {}s)", tick.as_secs()));
    }

    fn log(&mut self, msg: &str) {
        self.set_status(msg);
    }

    fn tick_done(&mut self, observed: usize, events: usize) {
        self.ticks += 1;
        self.alerts += events;
        self.set_status(format!(
            "[{}] {observed} on board, {events} new ({} alerts today)",
            Local::now().format("%H:%M:%S"),
            self.alerts
        ));
    }

    fn tick_failed(&mut self, err: &ExtractionFailed, retry_in: Duration) {
        self.set_status(format!(
            "[{}] Scrape failed ({}), retry in {}s",
            Local::now().format("%H:%M:%S"),
            err.reason,
            retry_in.as_secs()
        ));
    }

    fn finish(&mut self, exit: &LoopExit) {
        match exit {
            LoopExit::Stopped => self.set_status(format!("Stopped after {} tick(s)", self.ticks)),
            LoopExit::WindowGone(_) => self.set_status("Browser window closed; monitoring stopped"),
        }
    }
}
