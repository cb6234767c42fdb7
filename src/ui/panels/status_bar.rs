// HiveTail - ui/panels/status_bar.rs
//
// Bottom bar: tail state, cursor, line count, last update, failures.

use crate::app::state::AppState;
use crate::core::surface::lock_surface;
use crate::ui::theme;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let line_count = lock_surface(&state.surface).len();

    ui.horizontal(|ui| {
        ui.colored_label(
            theme::status_colour(state.tail_active, state.consecutive_failures),
            "\u{25cf}",
        );
        ui.label(state.status_message.as_str());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(at) = state.last_update {
                ui.label(format!("updated {}", at.format("%H:%M:%S")));
                ui.separator();
            }
            if let Some(cursor) = state.cursor {
                ui.label(format!("position {cursor}"));
                ui.separator();
            }
            ui.label(format!("{line_count} lines"));
            if state.debug_mode && !state.warnings.is_empty() {
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("{} warnings", state.warnings.len()))
                        .color(theme::STATUS_RETRYING),
                )
                .on_hover_text(state.warnings.last().map(String::as_str).unwrap_or(""));
            }
        });
    });
}
