// src/gui/app.rs
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui;
use tracing::info;

use crate::config::MonitorConfig;
use crate::notify::Notifier;
use crate::poll::MonitorHandle;
use crate::store::{RosterSnapshot, SharedRoster};

/// How often the window refreshes its snapshot while idle.
const REFRESH: Duration = Duration::from_millis(500);

pub fn run(options: eframe::NativeOptions, config: MonitorConfig) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "Attok Monitor",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(config)))),
    )?;
    Ok(())
}

pub struct App {
    pub config: MonitorConfig,

    // status/progress (poll worker writes here)
    pub status: Arc<Mutex<String>>,

    pub roster: SharedRoster,
    pub snapshot: RosterSnapshot,
    pub notifier: Option<Notifier>,
    pub monitor: Option<MonitorHandle>,

    /// Host owns the browser; the loop only ever sees a shim.
    #[cfg(feature = "browser")]
    pub session: Option<crate::browser::BrowserSession>,
}

impl App {
    pub fn new(config: MonitorConfig) -> Self {
        let roster = SharedRoster::new(config.name_filter());
        let snapshot = roster.snapshot();
        let notifier = Notifier::from_config(&config);

        info!("Init: board={} tick={}s", config.board_url, config.tick_seconds);

        Self {
            config,
            status: Arc::new(Mutex::new("Open the browser and log in".into())),
            roster,
            snapshot,
            notifier: Some(notifier),
            monitor: None,
            #[cfg(feature = "browser")]
            session: None,
        }
    }

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        *self.status.lock().unwrap_or_else(|p| p.into_inner()) = msg.into();
    }

    #[inline]
    pub fn status_text(&self) -> String {
        self.status.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.monitor.is_some()
    }

    #[inline]
    pub fn browser_open(&self) -> bool {
        #[cfg(feature = "browser")]
        {
            self.session.is_some()
        }
        #[cfg(not(feature = "browser"))]
        {
            false
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        super::actions::reap(self);
        self.snapshot = self.roster.snapshot();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            super::components::controls::draw(ui, self);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            super::components::roster_table::draw(ui, &self.snapshot);
        });

        ctx.request_repaint_after(REFRESH);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        super::actions::stop(self);
        if let Some(m) = self.monitor.take() {
            let _ = m.join();
        }
        // Queued announcements play out before the worker exits.
        if let Some(n) = self.notifier.take() {
            n.shutdown();
        }
    }
}
