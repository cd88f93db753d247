// src/notify/mod.rs
//! Notifier: turns attendance events into a tone cue plus a spoken line.
//!
//! One worker thread drains a bounded queue, so at most one cue+speech runs
//! at a time and jobs play in enqueue order. Failures are logged and the job
//! is dropped; nothing propagates back to the poll loop.

pub mod announcer;
pub mod speech;
pub mod tone;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::NotifyError;
use crate::model::{AttendanceEvent, EventKind, NotificationJob};

pub use announcer::{platform_announcer, Announcer, SilentAnnouncer};
pub use speech::VoicePreference;
pub use tone::{Cues, ToneCue, ToneSpec};

/// Builds the announcer on the worker thread (audio handles are often `!Send`).
pub type AnnouncerFactory = Box<dyn FnOnce() -> Box<dyn Announcer> + Send>;

enum Msg {
    Job(NotificationJob),
    Shutdown,
}

type PendingSet = Arc<Mutex<HashSet<(EventKind, String)>>>;

#[derive(Debug, Default)]
pub struct NotifierStats {
    played: AtomicUsize,
    failed: AtomicUsize,
}

impl NotifierStats {
    pub fn played(&self) -> usize { self.played.load(Ordering::Relaxed) }
    pub fn failed(&self) -> usize { self.failed.load(Ordering::Relaxed) }
}

/// Cloneable enqueue side.
#[derive(Clone)]
pub struct NotifierHandle {
    tx: SyncSender<Msg>,
    pending: PendingSet,
}

impl NotifierHandle {
    /// Queue a job without blocking. A job identical to one still pending is refused.
    pub fn enqueue(&self, ev: &AttendanceEvent) -> Result<(), NotifyError> {
        let key = (ev.kind, ev.name.clone());
        if !lock(&self.pending).insert(key.clone()) {
            return Err(NotifyError::Duplicate(format!("{} {}", ev.name, ev.kind.word())));
        }

        let job = NotificationJob::from_event(ev);
        match self.tx.try_send(Msg::Job(job)) {
            Ok(()) => {
                debug!("Notify: queued {} {}", ev.name, ev.kind);
                Ok(())
            }
            Err(e) => {
                lock(&self.pending).remove(&key);
                Err(match e {
                    TrySendError::Full(_) => NotifyError::QueueFull,
                    TrySendError::Disconnected(_) => NotifyError::Closed,
                })
            }
        }
    }
}

/// Owner of the worker thread.
pub struct Notifier {
    handle: NotifierHandle,
    stats: Arc<NotifierStats>,
    worker: Option<JoinHandle<()>>,
}

impl Notifier {
    pub fn spawn(cues: Cues, capacity: usize, make_announcer: AnnouncerFactory) -> Self {
        let (tx, rx) = mpsc::sync_channel::<Msg>(capacity.max(1));
        let pending: PendingSet = Arc::default();
        let stats = Arc::new(NotifierStats::default());

        let worker = {
            let pending = Arc::clone(&pending);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("notifier".into())
                .spawn(move || {
                    let mut announcer = make_announcer();
                    drain(rx, &cues, announcer.as_mut(), &pending, &stats);
                })
                .map_err(|e| warn!("Notify: cannot start worker: {e}"))
                .ok()
        };

        info!("Notify: worker up (queue capacity {})", capacity.max(1));
        Self { handle: NotifierHandle { tx, pending }, stats, worker }
    }

    /// Worker with the configured cues and the best announcer this build has.
    pub fn from_config(cfg: &MonitorConfig) -> Self {
        let (pref, rate) = (cfg.voice_preference, cfg.speech_rate);
        Self::spawn(cfg.cues(), cfg.queue_capacity, Box::new(move || platform_announcer(pref, rate)))
    }

    pub fn handle(&self) -> NotifierHandle {
        self.handle.clone()
    }

    pub fn stats(&self) -> Arc<NotifierStats> {
        Arc::clone(&self.stats)
    }

    /// Let every job already queued play out, then stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            // Blocking send: the sentinel lands behind every queued job.
            let _ = self.handle.tx.send(Msg::Shutdown);
            if worker.join().is_err() {
                warn!("Notify: worker panicked");
            }
            info!("Notify: worker stopped (played={} failed={})", self.stats.played(), self.stats.failed());
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drain(
    rx: Receiver<Msg>,
    cues: &Cues,
    announcer: &mut dyn Announcer,
    pending: &PendingSet,
    stats: &NotifierStats,
) {
    for msg in rx {
        let job = match msg {
            Msg::Job(job) => job,
            Msg::Shutdown => break,
        };

        let result = announcer
            .chime(cues.for_kind(job.kind))
            .and_then(|()| announcer.speak(&job.utterance()));

        match result {
            Ok(()) => {
                stats.played.fetch_add(1, Ordering::Relaxed);
                info!("Notify: announced \"{}\"", job.utterance());
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Notify: dropped \"{}\": {e}", job.utterance());
            }
        }
        lock(pending).remove(&(job.kind, job.name));
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}
