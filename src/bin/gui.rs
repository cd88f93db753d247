// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use attok_monitor::{cli::ConfigArgs, gui, log};
use clap::Parser;
use eframe::egui::ViewportBuilder;

#[derive(Parser)]
#[command(name = "attok-monitor", version, about = "Attendance monitor window")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
}

fn main() {
    let config = match Args::parse().config.load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(2);
        }
    };
    if let Err(e) = log::init(&config.log_dir) {
        eprintln!("Logging disabled: {e}");
    }

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Attok Monitor")
            .with_inner_size([640.0, 520.0]),
        ..Default::default()
    };

    if let Err(e) = gui::run(options, config) {
        tracing::error!("GUI failed: {e}");
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
