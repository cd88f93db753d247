// src/gui/components/controls.rs

use eframe::egui::{self, widgets::Spinner};

use crate::gui::{actions, app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!app.running(), egui::Button::new("Open browser"))
            .on_hover_text("Launch Chrome on the board; log in there")
            .clicked()
        {
            actions::open_browser(app);
        }

        let green = egui::Color32::from_rgb(40, 160, 70);
        let start = egui::Button::new(egui::RichText::new("Start").color(egui::Color32::BLACK).strong())
            .fill(green);
        if ui.add_enabled(!app.running() && app.browser_open(), start).clicked() {
            actions::start(app);
        }

        if ui.add_enabled(app.running(), egui::Button::new("Stop")).clicked() {
            actions::stop(app);
        }

        ui.separator();

        if ui
            .button("Reset day")
            .on_hover_text("Forget everyone; the next check-in alerts again")
            .clicked()
        {
            actions::reset_day(app);
        }

        if app.running() {
            ui.add(Spinner::new().size(16.0));
        }

        ui.label(app.status_text());
    });

    ui.horizontal(|ui| {
        ui.weak(app.snapshot.summary());
        ui.weak(format!("as of {}", app.snapshot.taken_at.format("%H:%M:%S")));
    });
}
