// src/browser.rs
//! Headful Chrome session. The operator logs in by hand; we only read text.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info, warn};

use crate::error::{Error, ExtractionFailed, FailureReason};
use crate::extract::{BoardShim, BoardView};

/// Chrome drops its websocket after this long without traffic;
/// a long-lived session must outlast any sensible tick.
const IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
const WINDOW_SIZE: (u32, u32) = (1280, 900);

/// Owns the browser process. Keep it on the host side; hand the loop a shim.
pub struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
    url: String,
}

impl BrowserSession {
    /// Launch a visible Chrome window and point it at `url`.
    pub fn open(url: &str) -> Result<Self, Error> {
        let options = LaunchOptions::default_builder()
            .headless(false)
            .window_size(Some(WINDOW_SIZE))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(|e| Error::Browser(format!("launch options: {e}")))?;

        let browser = Browser::new(options).map_err(|e| Error::Browser(format!("launch: {e}")))?;
        let tab = browser.new_tab().map_err(|e| Error::Browser(format!("new tab: {e}")))?;
        tab.navigate_to(url).map_err(|e| Error::Browser(format!("navigate {url}: {e}")))?;

        info!("Browser: opened {url}");
        Ok(Self { browser, tab, url: url.to_string() })
    }

    pub fn url(&self) -> &str { &self.url }

    /// Prefer whichever open tab shows the board host; the operator may
    /// have logged in from a different tab than the one we opened.
    pub fn board_tab(&self) -> Arc<Tab> {
        let host = host_of(&self.url);
        let tabs = self.browser.get_tabs().lock().unwrap_or_else(|p| p.into_inner());
        tabs.iter()
            .find(|t| !host.is_empty() && t.get_url().contains(host))
            .cloned()
            .unwrap_or_else(|| self.tab.clone())
    }

    pub fn board(&self) -> BoardShim {
        BoardShim::new(ChromeBoard::new(self.board_tab()))
    }

    /// False once the window (or the whole browser) has been closed.
    pub fn is_alive(&self) -> bool {
        self.tab.get_target_info().is_ok()
    }
}

/// Reads the board tab's `body` text.
pub struct ChromeBoard {
    tab: Arc<Tab>,
}

impl ChromeBoard {
    pub fn new(tab: Arc<Tab>) -> Self { Self { tab } }

    fn classify(&self, what: &str, msg: String) -> ExtractionFailed {
        if self.tab.get_target_info().is_err() || looks_closed(&msg) {
            return ExtractionFailed::window_gone(format!("{what}: {msg}"));
        }
        let reason = if looks_timeout(&msg) { FailureReason::Timeout } else { FailureReason::Transient };
        warn!("Browser: {what} failed ({reason}): {msg}");
        ExtractionFailed::new(reason, format!("{what}: {msg}"))
    }
}

impl BoardView for ChromeBoard {
    fn board_text(&mut self, timeout: Duration) -> Result<String, ExtractionFailed> {
        let body = self
            .tab
            .wait_for_element_with_custom_timeout("body", timeout)
            .map_err(|e| self.classify("wait body", e.to_string()))?;
        let text = body
            .get_inner_text()
            .map_err(|e| self.classify("inner text", e.to_string()))?;
        debug!("Browser: {} chars of board text", text.len());
        Ok(text)
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', '?', '#']).next().unwrap_or("")
}

fn looks_closed(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    ["closed", "no such target", "target not found", "connection", "disconnected"]
        .iter()
        .any(|k| m.contains(k))
}

fn looks_timeout(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    m.contains("timeout") || m.contains("timed out") || m.contains("never came")
}
