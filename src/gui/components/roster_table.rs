// src/gui/components/roster_table.rs
//
// Read-only roster view. Rows come straight from a snapshot.

use chrono::NaiveTime;
use eframe::egui::{self, Align, Layout, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};

use crate::model::{AttendanceState, StudentRecord};
use crate::store::RosterSnapshot;

const HEADERS: [&str; 5] = ["Name", "State", "Arrived", "Departed", "Alerts"];
const WIDTHS: [f32; 5] = [180.0, 100.0, 70.0, 70.0, 70.0];

pub fn draw(ui: &mut egui::Ui, snap: &RosterSnapshot) {
    if snap.records.is_empty() {
        ui.centered_and_justified(|ui| ui.weak("No students seen yet"));
        return;
    }

    let mut table = TableBuilder::new(ui).striped(true).min_scrolled_height(0.0);
    for w in WIDTHS {
        table = table.column(Column::initial(w).resizable(true).clip(true).at_least(40.0));
    }

    table
        .header(24.0, |mut header| {
            for h in HEADERS {
                header.col(|ui| {
                    ui.add(egui::Label::new(RichText::new(h).strong()).selectable(false));
                });
            }
        })
        .body(|body| {
            body.rows(20.0, snap.records.len(), |mut row| {
                let Some(rec) = snap.records.get(row.index()) else { return };
                for cell in cells(rec) {
                    row.col(|ui| {
                        ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                        ui.with_layout(Layout::left_to_right(Align::Center), |ui| ui.label(cell));
                    });
                }
            });
        });
}

fn cells(rec: &StudentRecord) -> [RichText; 5] {
    let state = RichText::new(rec.state.label());
    let state = match rec.state {
        AttendanceState::CheckedIn => state.color(egui::Color32::from_rgb(0x64, 0xB4, 0xFF)),
        AttendanceState::CheckedOut => state.color(egui::Color32::from_rgb(0xF0, 0xD2, 0x3C)),
        AttendanceState::Absent => state.weak(),
    };
    [
        RichText::new(&rec.name),
        state,
        RichText::new(hhmm(rec.arrived_at)),
        RichText::new(hhmm(rec.departed_at)),
        RichText::new(flags(rec)),
    ]
}

fn hhmm(t: Option<NaiveTime>) -> String {
    t.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "-".into())
}

fn flags(rec: &StudentRecord) -> String {
    let a = if rec.arrival_notified { "등원" } else { "-" };
    let d = if rec.departure_notified { "하원" } else { "-" };
    format!("{a} {d}")
}
