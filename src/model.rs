// src/model.rs
use std::fmt;

use chrono::{DateTime, Local, NaiveTime};

/// What one scrape saw for a student. `Unknown` is a real value: the row was
/// on the board but its annotation carried no usable time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObservedState {
    Unknown,
    CheckedIn,
    CheckedOut,
}

/// Store-side state. Only ever moves forward along this order until reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttendanceState {
    #[default]
    Absent,
    CheckedIn,
    CheckedOut,
}

impl AttendanceState {
    pub fn label(self) -> &'static str {
        match self {
            AttendanceState::Absent => "absent",
            AttendanceState::CheckedIn => "checked in",
            AttendanceState::CheckedOut => "checked out",
        }
    }
}

impl ObservedState {
    /// Store state this observation points at; `None` for `Unknown`.
    pub fn target(self) -> Option<AttendanceState> {
        match self {
            ObservedState::Unknown => None,
            ObservedState::CheckedIn => Some(AttendanceState::CheckedIn),
            ObservedState::CheckedOut => Some(AttendanceState::CheckedOut),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentObservation {
    pub name: String,
    pub state: ObservedState,
    pub observed_at: DateTime<Local>,
    /// `HH:MM` printed on the board next to the event that set `state`.
    pub board_time: Option<NaiveTime>,
}

impl StudentObservation {
    pub fn new(name: impl Into<String>, state: ObservedState, observed_at: DateTime<Local>) -> Self {
        Self { name: name.into(), state, observed_at, board_time: None }
    }

    pub fn with_board_time(mut self, t: Option<NaiveTime>) -> Self {
        self.board_time = t;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentRecord {
    pub name: String,
    pub state: AttendanceState,
    pub last_transition: DateTime<Local>,
    pub arrival_notified: bool,
    pub departure_notified: bool,
    pub arrived_at: Option<NaiveTime>,
    pub departed_at: Option<NaiveTime>,
}

impl StudentRecord {
    pub fn absent(name: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            name: name.into(),
            state: AttendanceState::Absent,
            last_transition: now,
            arrival_notified: false,
            departure_notified: false,
            arrived_at: None,
            departed_at: None,
        }
    }

    pub fn notified(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Arrival => self.arrival_notified,
            EventKind::Departure => self.departure_notified,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    Departure,
}

impl EventKind {
    /// Word spoken after the name.
    pub fn word(self) -> &'static str {
        match self {
            EventKind::Arrival => "등원",
            EventKind::Departure => "하원",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Arrival => f.write_str("arrival"),
            EventKind::Departure => f.write_str("departure"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceEvent {
    pub kind: EventKind,
    pub name: String,
    pub at: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationJob {
    pub kind: EventKind,
    pub name: String,
    pub enqueued_at: DateTime<Local>,
}

impl NotificationJob {
    pub fn from_event(ev: &AttendanceEvent) -> Self {
        Self { kind: ev.kind, name: ev.name.clone(), enqueued_at: Local::now() }
    }

    /// `"<name> <event-word>"`
    pub fn utterance(&self) -> String {
        format!("{} {}", self.name, self.kind.word())
    }
}
