// src/poll.rs
//! Poll Loop: scrape on a fixed cadence, feed the store, queue notifications.

use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::error::{ExtractionFailed, NotifyError};
use crate::extract::{BoardShim, Extractor};
use crate::model::AttendanceEvent;
use crate::notify::NotifierHandle;
use crate::progress::Progress;
use crate::store::SharedRoster;

const QUEUE_RETRY: Duration = Duration::from_millis(25);

/// Failure backoff: after `threshold` consecutive failures every further
/// failure doubles the period, up to `cap`. First success resets.
#[derive(Clone, Debug)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    threshold: u32,
    failures: u32,
    period: Duration,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, threshold: u32) -> Self {
        Self { base, cap: cap.max(base), threshold: threshold.max(1), failures: 0, period: base }
    }

    pub fn base(&self) -> Duration { self.base }
    pub fn period(&self) -> Duration { self.period }
    pub fn failures(&self) -> u32 { self.failures }

    /// Returns the wait before the next attempt.
    pub fn on_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.threshold {
            self.period = self.period.saturating_mul(2).min(self.cap);
        }
        self.period
    }

    pub fn on_success(&mut self) {
        if self.failures > 0 {
            info!("Poll: recovered after {} failure(s)", self.failures);
        }
        self.failures = 0;
        self.period = self.base;
    }
}

/// Shared stop flag with an interruptible wait.
#[derive(Clone, Default)]
pub struct StopSignal(Arc<(Mutex<bool>, Condvar)>);

impl StopSignal {
    pub fn new() -> Self { Self::default() }

    pub fn stop(&self) {
        let (flag, cv) = &*self.0;
        *flag.lock().unwrap_or_else(|p| p.into_inner()) = true;
        cv.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.0 .0.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Sleep up to `dur`. Returns true if stopped (before or during the wait).
    pub fn wait(&self, dur: Duration) -> bool {
        let (flag, cv) = &*self.0;
        let guard = flag.lock().unwrap_or_else(|p| p.into_inner());
        let (guard, _) = cv
            .wait_timeout_while(guard, dur, |stopped| !*stopped)
            .unwrap_or_else(|p| p.into_inner());
        *guard
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Observed { observed: usize, events: usize, queued: usize },
    Failed { error: ExtractionFailed, retry_in: Duration },
    WindowGone(ExtractionFailed),
    /// Stop requested part-way through applying observations.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopExit {
    Stopped,
    WindowGone(ExtractionFailed),
}

/// What the loop hands back when it ends.
pub struct Surrendered {
    pub exit: LoopExit,
    pub board: BoardShim,
}

pub struct PollLoop {
    extractor: Extractor,
    board: BoardShim,
    roster: SharedRoster,
    notifier: NotifierHandle,
    backoff: Backoff,
    stop: StopSignal,
}

impl PollLoop {
    pub fn new(cfg: &MonitorConfig, board: BoardShim, roster: SharedRoster, notifier: NotifierHandle) -> Self {
        Self {
            extractor: Extractor::new(cfg.name_filter(), cfg.extract_timeout()),
            board,
            roster,
            notifier,
            backoff: Backoff::new(cfg.tick(), cfg.backoff_cap(), cfg.failure_threshold),
            stop: StopSignal::new(),
        }
    }

    pub fn stop_signal(&self) -> StopSignal { self.stop.clone() }
    pub fn backoff(&self) -> &Backoff { &self.backoff }

    /// One scrape + apply pass. Never sleeps.
    pub fn run_tick(&mut self) -> TickOutcome {
        let observations = match self.extractor.extract(&self.board) {
            Ok(v) => v,
            Err(e) if e.is_fatal() => {
                error!("Poll: {e}");
                return TickOutcome::WindowGone(e);
            }
            Err(e) => {
                let retry_in = self.backoff.on_failure();
                warn!("Poll: {e} (failures={}, retry in {retry_in:?})", self.backoff.failures());
                return TickOutcome::Failed { error: e, retry_in };
            }
        };
        self.backoff.on_success();

        let mut events = 0;
        let mut queued = 0;
        for obs in &observations {
            if self.stop.is_stopped() {
                info!("Poll: stop requested mid-tick");
                return TickOutcome::Stopped;
            }
            // Store lock is released before touching the notifier.
            let Some(ev) = self.roster.apply(obs) else { continue };
            events += 1;

            match self.enqueue_patiently(&ev) {
                Ok(()) | Err(NotifyError::Duplicate(_)) => {
                    self.roster.mark_notified(&ev.name, ev.kind);
                    queued += 1;
                }
                Err(e) => {
                    // Step the record back so a later tick emits it again.
                    self.roster.retract(&ev);
                    warn!("Poll: {} {} not queued ({e}), retrying next tick", ev.name, ev.kind);
                }
            }
        }

        debug!("Poll: tick observed={} events={events} queued={queued}", observations.len());
        TickOutcome::Observed { observed: observations.len(), events, queued }
    }

    /// A full queue is waited out for up to one tick while the worker drains.
    fn enqueue_patiently(&self, ev: &AttendanceEvent) -> Result<(), NotifyError> {
        let deadline = Instant::now().checked_add(self.backoff.base());
        loop {
            match self.notifier.enqueue(ev) {
                Err(NotifyError::QueueFull) if deadline.is_none_or(|d| Instant::now() < d) => {
                    if self.stop.wait(QUEUE_RETRY) {
                        return Err(NotifyError::QueueFull);
                    }
                }
                other => return other,
            }
        }
    }

    /// Tick until stopped or the window goes away.
    pub fn run(mut self, progress: &mut dyn Progress) -> Surrendered {
        info!("Poll: start (tick={:?})", self.backoff.period());
        progress.begin(self.backoff.period());

        let mut last_wait = self.backoff.period();
        let exit = loop {
            if self.stop.is_stopped() {
                break LoopExit::Stopped;
            }
            let wait = match self.run_tick() {
                TickOutcome::Observed { observed, events, .. } => {
                    if last_wait > self.backoff.base() {
                        progress.log("Board back; polling at the normal tick");
                    }
                    progress.tick_done(observed, events);
                    self.backoff.period()
                }
                TickOutcome::Failed { error, retry_in } => {
                    progress.tick_failed(&error, retry_in);
                    if retry_in > last_wait {
                        progress.log(&format!("Backing off: next attempt in {}s", retry_in.as_secs()));
                    }
                    retry_in
                }
                TickOutcome::WindowGone(e) => break LoopExit::WindowGone(e),
                TickOutcome::Stopped => break LoopExit::Stopped,
            };
            last_wait = wait;
            if self.stop.wait(wait) {
                break LoopExit::Stopped;
            }
        };

        info!("Poll: exit {exit:?}");
        progress.finish(&exit);
        Surrendered { exit, board: self.board }
    }

    pub fn spawn(self, mut progress: Box<dyn Progress + Send>) -> io::Result<MonitorHandle> {
        let stop = self.stop.clone();
        let thread = thread::Builder::new()
            .name("poll".into())
            .spawn(move || self.run(progress.as_mut()))?;
        Ok(MonitorHandle { stop, thread })
    }
}

/// Host-side grip on a running loop.
pub struct MonitorHandle {
    stop: StopSignal,
    thread: JoinHandle<Surrendered>,
}

impl MonitorHandle {
    pub fn stop(&self) { self.stop.stop(); }

    pub fn is_finished(&self) -> bool { self.thread.is_finished() }

    /// Waits for the loop; in-flight notifications are unaffected.
    pub fn join(self) -> Option<Surrendered> {
        self.thread.join().map_err(|_| error!("Poll: worker panicked")).ok()
    }
}
