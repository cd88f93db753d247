// src/cli.rs
//! Terminal host plus two offline tools for checking the filter and parser.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::config::MonitorConfig;
use crate::error::{ConfigError, Error, ExtractionFailed};
use crate::extract::Extractor;
use crate::model::ObservedState;
use crate::poll::LoopExit;
use crate::progress::Progress;
use crate::store::RosterSnapshot;

/// Overrides shared by both binaries. Flags win over the file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML config file (default: ./attok_monitor.toml if present)
    #[arg(long, short = 'c', env = "ATTOK_MONITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds between scrapes
    #[arg(long)]
    pub tick: Option<u64>,

    /// Board URL to open
    #[arg(long)]
    pub url: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let mut cfg = MonitorConfig::load(self.config.as_deref())?;
        if let Some(t) = self.tick {
            cfg.tick_seconds = t;
            // Keep an untouched cap consistent with a longer tick.
            cfg.failure_backoff_cap_seconds = cfg.failure_backoff_cap_seconds.max(t);
        }
        if let Some(u) = &self.url {
            cfg.board_url = u.clone();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
#[command(name = "attok-monitor", version, about = "Watch the attok.co.kr attendance board and announce arrivals and departures")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the board in Chrome, wait for login, then watch it
    Watch,
    /// Print accept/reject for each name
    Filter {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Run the extractor over saved board text
    Parse { file: PathBuf },
}

pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let cfg = cli.config.load()?;

    match cli.command {
        Command::Watch => watch(cfg),
        Command::Filter { names } => {
            let mut out = io::stdout().lock();
            filter_report(&cfg, &names, &mut out)?;
            Ok(())
        }
        Command::Parse { file } => {
            let text = fs::read_to_string(&file)?;
            let mut out = io::stdout().lock();
            parse_report(&cfg, &text, &mut out)?;
            Ok(())
        }
    }
}

pub fn filter_report(cfg: &MonitorConfig, names: &[String], out: &mut impl Write) -> io::Result<()> {
    let filter = cfg.name_filter();
    for n in names {
        let verdict = if filter.accepts(n) { "accept" } else { "reject" };
        writeln!(out, "{verdict}\t{n}")?;
    }
    Ok(())
}

pub fn parse_report(cfg: &MonitorConfig, text: &str, out: &mut impl Write) -> Result<(), Error> {
    let ex = Extractor::new(cfg.name_filter(), cfg.extract_timeout());
    let obs = ex.parse(text, Local::now())?;
    for o in &obs {
        let state = match o.state {
            ObservedState::Unknown => "unknown",
            ObservedState::CheckedIn => "checked-in",
            ObservedState::CheckedOut => "checked-out",
        };
        let time = o.board_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "-".into());
        writeln!(out, "{}\t{state}\t{time}", o.name)?;
    }
    writeln!(out, "{} observation(s)", obs.len())?;
    Ok(())
}

pub fn print_snapshot(snap: &RosterSnapshot, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{} (as of {})", snap.summary(), snap.taken_at.format("%H:%M:%S"))?;
    for r in &snap.records {
        let t = |x: Option<chrono::NaiveTime>| x.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "-".into());
        writeln!(out, "  {:<14} {:<12} {:>5} {:>5}", r.name, r.state.label(), t(r.arrived_at), t(r.departed_at))?;
    }
    Ok(())
}

/// Progress as timestamped stdout lines.
pub struct StdoutProgress;

impl StdoutProgress {
    fn line(msg: &str) {
        println!("[{}] {msg}", Local::now().format("%H:%M:%S"));
    }
}

impl Progress for StdoutProgress {
    fn begin(&mut self, tick: Duration) {
        Self::line(&format!("watching every {}s (s=snapshot, r=reset day, q=quit)", tick.as_secs()));
    }
    fn log(&mut self, msg: &str) {
        Self::line(msg);
    }
    fn tick_done(&mut self, observed: usize, events: usize) {
        if events > 0 {
            Self::line(&format!("{observed} on board, {events} new"));
        }
    }
    fn tick_failed(&mut self, err: &ExtractionFailed, retry_in: Duration) {
        Self::line(&format!("scrape failed ({}), retry in {}s", err.reason, retry_in.as_secs()));
    }
    fn finish(&mut self, exit: &LoopExit) {
        match exit {
            LoopExit::Stopped => Self::line("stopped"),
            LoopExit::WindowGone(e) => Self::line(&format!("browser gone: {}", e.detail)),
        }
    }
}

/// Operator keys while watching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Snapshot,
    Reset,
    Quit,
}

impl Key {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "s" | "S" => Some(Key::Snapshot),
            "r" | "R" => Some(Key::Reset),
            "q" | "Q" => Some(Key::Quit),
            _ => None,
        }
    }
}

#[cfg(feature = "browser")]
fn watch(cfg: MonitorConfig) -> Result<(), Error> {
    use std::io::BufRead;
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::thread;

    use tracing::info;

    use crate::browser::BrowserSession;
    use crate::notify::Notifier;
    use crate::poll::PollLoop;
    use crate::store::SharedRoster;

    crate::log::init(&cfg.log_dir)?;

    let session = BrowserSession::open(&cfg.board_url)?;
    println!("Log in on the board in the Chrome window, then press Enter.");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let roster = SharedRoster::new(cfg.name_filter());
    let notifier = Notifier::from_config(&cfg);
    let monitor = PollLoop::new(&cfg, session.board(), roster.clone(), notifier.handle())
        .spawn(Box::new(StdoutProgress))?;

    // Stdin reader; detached since a blocked read cannot be interrupted.
    let (tx, rx) = mpsc::channel::<Key>();
    thread::Builder::new().name("stdin".into()).spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if let Some(k) = Key::parse(&line) {
                if tx.send(k).is_err() {
                    break;
                }
            }
        }
    })?;

    loop {
        if monitor.is_finished() {
            break;
        }
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(Key::Snapshot) => print_snapshot(&roster.snapshot(), &mut io::stdout().lock())?,
            Ok(Key::Reset) => {
                roster.reset();
                StdoutProgress::line("roster cleared");
            }
            Ok(Key::Quit) => break,
            Err(RecvTimeoutError::Timeout) => {}
            // stdin closed: keep watching until the window goes.
            Err(RecvTimeoutError::Disconnected) => thread::sleep(Duration::from_millis(250)),
        }
    }

    monitor.stop();
    if let Some(done) = monitor.join() {
        info!("CLI: loop ended: {:?}", done.exit);
    }
    notifier.shutdown();
    drop(session);
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn watch(_cfg: MonitorConfig) -> Result<(), Error> {
    Err(Error::Browser("built without the `browser` feature".into()))
}
