// src/log.rs
use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Error;

pub const FILE_PREFIX: &str = "attok-monitor";
pub const KEEP_FILES: usize = 7;
const DEFAULT_FILTER: &str = "attok_monitor=info";

/// Stderr + daily rotating file under `dir`. `RUST_LOG` overrides the filter.
/// A second call (or a subscriber installed elsewhere first) is not an error.
pub fn init(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir)?;

    let file = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_FILES)
        .build(dir)
        .map_err(|e| Error::Logging(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file))
        .try_init();

    if installed.is_ok() {
        tracing::info!("Log: writing to {}", dir.display());
    }
    Ok(())
}
