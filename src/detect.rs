// src/detect.rs
//! Transition Detector: one record + one observation → what to do.

use crate::model::{AttendanceState, EventKind, ObservedState, StudentRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changes (UNKNOWN, same state, or an attempted downgrade).
    Ignore,
    /// Advance and announce.
    Emit { kind: EventKind, to: AttendanceState },
    /// Advance quietly and mark every notification up to `to` as sent.
    Absorb { to: AttendanceState },
}

pub fn detect(record: &StudentRecord, observed: ObservedState) -> Transition {
    use AttendanceState::*;

    let Some(to) = observed.target() else {
        return Transition::Ignore;
    };

    match (record.state, to) {
        (Absent, CheckedIn) => emit_unless_sent(record, EventKind::Arrival, to),
        (CheckedIn, CheckedOut) => emit_unless_sent(record, EventKind::Departure, to),
        // Left before the monitor started watching.
        (Absent, CheckedOut) => Transition::Absorb { to },
        _ => Transition::Ignore,
    }
}

fn emit_unless_sent(record: &StudentRecord, kind: EventKind, to: AttendanceState) -> Transition {
    if record.notified(kind) {
        Transition::Absorb { to }
    } else {
        Transition::Emit { kind, to }
    }
}
