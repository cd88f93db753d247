// src/progress.rs
use std::time::Duration;

use crate::error::ExtractionFailed;
use crate::poll::LoopExit;

/// Status reporting from the poll loop.
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called once when the loop starts, with the configured tick.
    fn begin(&mut self, _tick: Duration) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A scrape succeeded: how many students were on the board, how many alerts were queued.
    fn tick_done(&mut self, _observed: usize, _events: usize) {}

    /// A scrape failed; the loop will try again after `retry_in`.
    fn tick_failed(&mut self, _err: &ExtractionFailed, _retry_in: Duration) {}

    /// Called at the end, whatever the reason.
    fn finish(&mut self, _exit: &LoopExit) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
