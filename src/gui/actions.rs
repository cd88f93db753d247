// src/gui/actions.rs
//! Button handlers. All run on the UI thread and never block on the network.

use tracing::{error, info, warn};

use crate::extract::BoardShim;
use crate::gui::app::App;
use crate::gui::progress::GuiProgress;
use crate::poll::{LoopExit, PollLoop};

#[cfg(feature = "browser")]
pub fn open_browser(app: &mut App) {
    use crate::browser::BrowserSession;

    if app.session.as_ref().is_some_and(|s| s.is_alive()) {
        app.status("Browser already open");
        return;
    }
    app.status("Launching browser...");
    match BrowserSession::open(&app.config.board_url) {
        Ok(s) => {
            app.status(format!("Log in at {}, then press Start", s.url()));
            app.session = Some(s);
        }
        Err(e) => {
            error!("UI: {e}");
            app.status(format!("Error: {e}"));
        }
    }
}

#[cfg(not(feature = "browser"))]
pub fn open_browser(app: &mut App) {
    app.status("Built without browser support");
}

fn board(app: &App) -> Option<BoardShim> {
    #[cfg(feature = "browser")]
    {
        app.session.as_ref().filter(|s| s.is_alive()).map(|s| s.board())
    }
    #[cfg(not(feature = "browser"))]
    {
        let _ = app;
        None
    }
}

pub fn start(app: &mut App) {
    if app.running() {
        return;
    }
    let Some(board) = board(app) else {
        app.status("Open the browser first");
        return;
    };
    let Some(notifier) = app.notifier.as_ref() else {
        app.status("Notifier is down");
        return;
    };

    let poll = PollLoop::new(&app.config, board, app.roster.clone(), notifier.handle());
    match poll.spawn(Box::new(GuiProgress::new(app.status.clone()))) {
        Ok(h) => {
            info!("UI: monitor started");
            app.monitor = Some(h);
        }
        Err(e) => {
            error!("UI: cannot start poll worker: {e}");
            app.status(format!("Error: {e}"));
        }
    }
}

/// Signals the loop; `reap` collects it once it has wound down.
pub fn stop(app: &mut App) {
    if let Some(m) = &app.monitor {
        info!("UI: stop requested");
        m.stop();
        app.status("Stopping...");
    }
}

pub fn reset_day(app: &mut App) {
    app.roster.reset();
    info!("UI: roster reset");
    app.status("Roster cleared for a new day");
}

/// Join a finished loop and take back what it surrendered.
pub fn reap(app: &mut App) {
    if !app.monitor.as_ref().is_some_and(|m| m.is_finished()) {
        return;
    }
    let Some(handle) = app.monitor.take() else { return };
    match handle.join() {
        Some(done) => {
            drop(done.board);
            if let LoopExit::WindowGone(e) = done.exit {
                warn!("UI: {e}");
                #[cfg(feature = "browser")]
                {
                    app.session = None;
                }
            }
        }
        None => app.status("Monitor crashed; see log"),
    }
}
