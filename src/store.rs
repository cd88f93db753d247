// src/store.rs
//! Roster Store: the authoritative per-student record for the running session.
//!
//! Single writer (the poll loop). Readers take a `snapshot()` copy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::core::sanitize::{canonical_name, split_qualifier};
use crate::detect::{detect, Transition};
use crate::filter::NameFilter;
use crate::model::{AttendanceEvent, AttendanceState, EventKind, StudentObservation, StudentRecord};

enum Slot {
    Existing(String),
    /// Unqualified record that a qualified observation takes over.
    Adopt { from: String },
    New,
}

pub struct RosterStore {
    filter: NameFilter,
    records: HashMap<String, StudentRecord>,
}

impl RosterStore {
    pub fn new(filter: NameFilter) -> Self {
        Self { filter, records: HashMap::new() }
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn get(&self, name: &str) -> Option<&StudentRecord> {
        self.records.get(name)
    }

    /// Feed one observation. Returns an event only on an announced transition.
    /// Re-applying the same observation is a no-op.
    pub fn apply(&mut self, obs: &StudentObservation) -> Option<AttendanceEvent> {
        if !self.filter.accepts(&obs.name) {
            debug!("Store: refused {:?} (name filter)", obs.name);
            return None;
        }
        let name = canonical_name(&obs.name);

        let slot = self.slot_for(&name);
        let current = match &slot {
            Slot::Existing(k) | Slot::Adopt { from: k } => self.records.get(k).cloned(),
            Slot::New => None,
        }
        .unwrap_or_else(|| StudentRecord::absent(name.clone(), obs.observed_at));

        let transition = detect(&current, obs.state);
        if transition == Transition::Ignore {
            return None;
        }

        let key = match slot {
            Slot::Existing(k) => k,
            Slot::Adopt { from } => {
                info!("Store: {from} → {name} (qualified form)");
                self.records.remove(&from);
                name
            }
            Slot::New => name,
        };

        let mut rec = current;
        rec.name = key.clone();
        let event = advance(&mut rec, transition, obs);
        self.records.insert(key, rec);
        event
    }

    /// Record that the notifier accepted the job for this event.
    pub fn mark_notified(&mut self, name: &str, kind: EventKind) -> bool {
        match self.records.get_mut(name) {
            Some(r) => {
                match kind {
                    EventKind::Arrival => r.arrival_notified = true,
                    EventKind::Departure => r.departure_notified = true,
                }
                true
            }
            None => false,
        }
    }

    /// Undo the step that produced `ev` when its announcement could not be
    /// queued, so the next observation emits it again. No-op once notified.
    pub fn retract(&mut self, ev: &AttendanceEvent) -> bool {
        let Some(r) = self.records.get_mut(&ev.name) else { return false };
        match ev.kind {
            EventKind::Arrival if r.state == AttendanceState::CheckedIn && !r.arrival_notified => {
                r.state = AttendanceState::Absent;
                r.arrived_at = None;
            }
            EventKind::Departure if r.state == AttendanceState::CheckedOut && !r.departure_notified => {
                r.state = AttendanceState::CheckedIn;
                r.departed_at = None;
            }
            _ => return false,
        }
        info!("Store: {} {} retracted, will retry", ev.name, ev.kind);
        true
    }

    /// Forget everyone. The only way to re-enable alerts for a student.
    pub fn reset(&mut self) {
        info!("Store: reset ({} records cleared)", self.records.len());
        self.records.clear();
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        let mut records: Vec<StudentRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        RosterSnapshot { taken_at: Local::now(), records }
    }

    fn slot_for(&self, name: &str) -> Slot {
        if self.records.contains_key(name) {
            return Slot::Existing(name.to_string());
        }

        let (base, qual) = split_qualifier(name);
        let variants: Vec<&String> = self
            .records
            .keys()
            .filter(|k| {
                let (b, q) = split_qualifier(k);
                q.is_some() && b == base
            })
            .collect();

        match qual {
            Some(_) if variants.is_empty() && self.records.contains_key(base) => {
                Slot::Adopt { from: base.to_string() }
            }
            None if variants.len() == 1 => Slot::Existing(variants[0].clone()),
            _ => Slot::New,
        }
    }
}

fn advance(rec: &mut StudentRecord, t: Transition, obs: &StudentObservation) -> Option<AttendanceEvent> {
    let to = match t {
        Transition::Ignore => return None,
        Transition::Emit { to, .. } | Transition::Absorb { to } => to,
    };

    rec.state = to;
    rec.last_transition = obs.observed_at;
    match to {
        AttendanceState::CheckedIn => rec.arrived_at = obs.board_time,
        AttendanceState::CheckedOut => rec.departed_at = obs.board_time,
        AttendanceState::Absent => {}
    }

    match t {
        Transition::Emit { kind, .. } => {
            info!("Store: {} {kind}", rec.name);
            Some(AttendanceEvent { kind, name: rec.name.clone(), at: obs.observed_at })
        }
        _ => {
            rec.arrival_notified = true;
            if to == AttendanceState::CheckedOut {
                rec.departure_notified = true;
            }
            info!("Store: {} absorbed → {} (no alert)", rec.name, to.label());
            None
        }
    }
}

/// Read-only copy for hosts.
#[derive(Clone, Debug)]
pub struct RosterSnapshot {
    pub taken_at: DateTime<Local>,
    pub records: Vec<StudentRecord>,
}

impl RosterSnapshot {
    pub fn count(&self, state: AttendanceState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} students: {} in, {} out",
            self.records.len(),
            self.count(AttendanceState::CheckedIn),
            self.count(AttendanceState::CheckedOut),
        )
    }
}

/// Mutex-guarded store shared between the poll loop (writer) and the host (reader).
/// Never held across I/O.
#[derive(Clone)]
pub struct SharedRoster(Arc<Mutex<RosterStore>>);

impl SharedRoster {
    pub fn new(filter: NameFilter) -> Self {
        Self(Arc::new(Mutex::new(RosterStore::new(filter))))
    }

    fn lock(&self) -> MutexGuard<'_, RosterStore> {
        self.0.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn apply(&self, obs: &StudentObservation) -> Option<AttendanceEvent> {
        self.lock().apply(obs)
    }

    pub fn mark_notified(&self, name: &str, kind: EventKind) -> bool {
        self.lock().mark_notified(name, kind)
    }

    pub fn retract(&self, ev: &AttendanceEvent) -> bool {
        self.lock().retract(ev)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        self.lock().snapshot()
    }
}
