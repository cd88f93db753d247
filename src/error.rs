// src/error.rs
use std::fmt;

use thiserror::Error;

/// Coarse cause of a failed scrape, surfaced on the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The controlled browser window (or its tab) is gone. Ends the poll loop.
    WindowGone,
    /// The page rendered nothing that looks like the attendance board.
    EmptyPage,
    /// A browser-side wait exceeded the per-call timeout.
    Timeout,
    /// Page not ready, stale element, protocol hiccup. Retried next tick.
    Transient,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::WindowGone => "window-gone",
            FailureReason::EmptyPage => "empty-page",
            FailureReason::Timeout => "timeout",
            FailureReason::Transient => "transient",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("extraction failed ({reason}): {detail}")]
pub struct ExtractionFailed {
    pub reason: FailureReason,
    pub detail: String,
}

impl ExtractionFailed {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self { reason, detail: detail.into() }
    }

    pub fn window_gone(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::WindowGone, detail)
    }

    pub fn empty_page(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::EmptyPage, detail)
    }

    /// Only a vanished window stops the loop; everything else is retried.
    pub fn is_fatal(&self) -> bool {
        self.reason == FailureReason::WindowGone
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification queue is full")]
    QueueFull,

    #[error("identical notification already pending: {0}")]
    Duplicate(String),

    #[error("notifier has shut down")]
    Closed,

    #[error("audio output error: {0}")]
    Audio(String),

    #[error("speech synthesis error: {0}")]
    Speech(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Crate-level error for host-facing entry points.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Extraction(#[from] ExtractionFailed),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
